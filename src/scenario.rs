use crate::models::missile::MissileProfile;
use crate::models::{Coordinates, MissileAttributes, PhysicalConstants, WaypointInput};
use crate::waypoint_parser::parse_waypoints;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 異常系の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// 数値フロアと燃料クランプで吸収し、警告ログのみ出す（従来互換）
    #[default]
    Permissive,
    /// 容量超過・非正速度・退化区間・燃料枯渇をエラーとして返す
    Strict,
}

/// 先頭ウェイポイントの区間の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstLegPolicy {
    /// 先頭ウェイポイントは素通しとし、その区間を合計に算入しない。
    /// 2番目のウェイポイントは始点から基準速度で計測する。素通しウェイポイントの
    /// 離脱速度は0のため、ウェイポイントが1点のみだと最終区間の所要時間は発散する（従来互換）
    #[default]
    PassThrough,
    /// 素通しの扱いは `PassThrough` と同じだが、素通しウェイポイントの離脱速度（0）を
    /// 現在速度に反映せず基準速度を維持する
    PassThroughBaseSpeed,
    /// 先頭ウェイポイントも始点から計測し、全区間を合計に算入する
    Accounted,
}

/// 軌道計算エンジン設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub constants: PhysicalConstants,
    /// ウェイポイント上限数
    pub waypoint_capacity: usize,
    /// 1区間あたりの経路サンプル点数
    pub samples_per_leg: usize,
    pub mode: ValidationMode,
    pub first_leg_policy: FirstLegPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            constants: PhysicalConstants::default(),
            waypoint_capacity: 10,
            samples_per_leg: 100,
            mode: ValidationMode::Permissive,
            first_leg_policy: FirstLegPolicy::PassThrough,
        }
    }
}

impl EngineConfig {
    /// 設定値の検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.constants.earth_radius_km > 0.0) {
            return Err(ScenarioError::ValidationError("earth_radius_km must be positive".to_string()));
        }
        if !(self.constants.gravity_mps2 > 0.0) {
            return Err(ScenarioError::ValidationError("gravity_mps2 must be positive".to_string()));
        }
        if !self.constants.max_altitude_m.is_finite() {
            return Err(ScenarioError::ValidationError("max_altitude_m must be finite".to_string()));
        }
        if self.waypoint_capacity == 0 {
            return Err(ScenarioError::ValidationError("waypoint_capacity must be at least 1".to_string()));
        }
        if self.samples_per_leg < 2 {
            return Err(ScenarioError::ValidationError("samples_per_leg must be at least 2".to_string()));
        }
        Ok(())
    }
}

/// シナリオメタデータ
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    pub description: String,
}

impl Default for ScenarioMeta {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: "unnamed".to_string(),
            description: String::new(),
        }
    }
}

/// 機体設定
///
/// 重量と速度は必須。物理パラメータは省略時に既定値が適用されます。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VehicleConfig {
    pub weight_kg: f64,
    pub speed_mps: f64,
    #[serde(default)]
    pub max_acceleration_mps2: Option<f64>,
    #[serde(default)]
    pub max_deceleration_mps2: Option<f64>,
    #[serde(default)]
    pub max_turn_rate_deg_s: Option<f64>,
    #[serde(default)]
    pub drag_coefficient: Option<f64>,
    #[serde(default)]
    pub fuel_consumption_normal_kg_s: Option<f64>,
    #[serde(default)]
    pub fuel_consumption_turn_kg_s: Option<f64>,
}

impl VehicleConfig {
    pub fn new(weight_kg: f64, speed_mps: f64) -> Self {
        Self {
            weight_kg,
            speed_mps,
            ..Self::default()
        }
    }

    /// ミサイル属性へ変換（既定値の適用はルート作成時に行う）
    pub fn to_attributes(&self) -> MissileAttributes {
        let mut missile = MissileProfile::from_weight_and_speed(self.weight_kg, self.speed_mps);
        missile.max_acceleration = self.max_acceleration_mps2.unwrap_or(0.0);
        missile.max_deceleration = self.max_deceleration_mps2.unwrap_or(0.0);
        missile.max_turn_rate = self.max_turn_rate_deg_s.unwrap_or(0.0);
        missile.drag_coefficient = self.drag_coefficient.unwrap_or(0.0);
        missile.fuel_consumption_normal = self.fuel_consumption_normal_kg_s.unwrap_or(0.0);
        missile.fuel_consumption_turn = self.fuel_consumption_turn_kg_s.unwrap_or(0.0);
        missile
    }
}

/// 経路設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    pub start: Coordinates,
    pub end: Coordinates,
    pub vehicle: VehicleConfig,
    /// 構造化されたウェイポイント列
    #[serde(default)]
    pub waypoints: Vec<WaypointInput>,
    /// `lat,lon,alt,angle|...` 形式のウェイポイント文字列
    #[serde(default)]
    pub waypoint_string: Option<String>,
}

impl RouteConfig {
    /// 構造化リストの後に文字列分を連結したウェイポイント入力列
    ///
    /// 文字列側は上限 `capacity` に達した時点で解析を打ち切ります。
    pub fn waypoint_inputs(&self, capacity: usize) -> Vec<WaypointInput> {
        let mut inputs = self.waypoints.clone();
        if let Some(text) = &self.waypoint_string {
            let remaining = capacity.saturating_sub(inputs.len());
            inputs.extend(parse_waypoints(text, remaining));
        }
        inputs
    }
}

/// 出力設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("trajectory.json"),
        }
    }
}

/// 完全なシナリオ設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub meta: ScenarioMeta,
    #[serde(default)]
    pub engine: EngineConfig,
    pub route: RouteConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        // ファイル存在チェック
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::IoError(path.to_path_buf(), e))?;

        let config = Self::from_yaml_str(&contents)
            .map_err(|e| match e {
                ScenarioError::ParseError(_, err) => ScenarioError::ParseError(path.to_path_buf(), err),
                other => other,
            })?;

        Ok(config)
    }

    /// YAML文字列からシナリオ設定を読み込み
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = serde_yaml::from_str(contents)
            .map_err(|e| ScenarioError::ParseError(PathBuf::from("<inline>"), e))?;

        config.validate()?;
        Ok(config)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.engine.validate()?;

        if !self.route.start.is_finite() {
            return Err(ScenarioError::ValidationError("start coordinates must be finite".to_string()));
        }
        if !self.route.end.is_finite() {
            return Err(ScenarioError::ValidationError("end coordinates must be finite".to_string()));
        }
        for (index, waypoint) in self.route.waypoints.iter().enumerate() {
            if !waypoint.position.is_finite() || !waypoint.turn_angle.is_finite() {
                return Err(ScenarioError::ValidationError(
                    format!("waypoint {} has non-finite values", index + 1)
                ));
            }
        }

        let vehicle = &self.route.vehicle;
        if !vehicle.weight_kg.is_finite() || !vehicle.speed_mps.is_finite() {
            return Err(ScenarioError::ValidationError("vehicle weight and speed must be finite".to_string()));
        }

        if self.output.path.as_os_str().is_empty() {
            return Err(ScenarioError::ValidationError("output path must not be empty".to_string()));
        }

        Ok(())
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== エンジン設定 ===");
        println!("球体半径: {:.1} km", self.engine.constants.earth_radius_km);
        println!("重力加速度: {:.2} m/s²", self.engine.constants.gravity_mps2);
        println!("最高高度: {:.0} m", self.engine.constants.max_altitude_m);
        println!("ウェイポイント上限: {}点", self.engine.waypoint_capacity);
        println!("区間サンプル数: {}点", self.engine.samples_per_leg);
        println!("検証モード: {:?}", self.engine.mode);
        println!("先頭区間の扱い: {:?}", self.engine.first_leg_policy);
        println!();

        let route = &self.route;
        println!("=== 経路 ===");
        println!("始点: {:.6}, {:.6}, {:.1}", route.start.latitude, route.start.longitude, route.start.altitude);
        println!("終点: {:.6}, {:.6}, {:.1}", route.end.latitude, route.end.longitude, route.end.altitude);
        println!("機体重量: {:.1} kg", route.vehicle.weight_kg);
        println!("巡航速度: {:.1} m/s", route.vehicle.speed_mps);
        let waypoints = route.waypoint_inputs(self.engine.waypoint_capacity);
        println!("ウェイポイント: {}点", waypoints.len());
        for (index, waypoint) in waypoints.iter().enumerate() {
            println!(
                "  {}: {:.6}, {:.6} (旋回角: {:.1}度)",
                index + 1,
                waypoint.position.latitude,
                waypoint.position.longitude,
                waypoint.turn_angle
            );
        }
        println!("出力先: {}", self.output.path.display());
    }
}

/// シナリオ読み込みエラー
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("シナリオファイルが見つかりません: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("ファイル読み込みエラー {}: {}", .0.display(), .1)]
    IoError(PathBuf, #[source] std::io::Error),
    #[error("YAML解析エラー {}: {}", .0.display(), .1)]
    ParseError(PathBuf, #[source] serde_yaml::Error),
    #[error("設定検証エラー: {0}")]
    ValidationError(String),
}

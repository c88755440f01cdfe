//! 計算結果の出力
//!
//! 確定した [`TrajectoryData`] とサンプリング済み経路をJSON文書として書き出し、
//! コンソール向けの要約を整形します。JSONの数値はすべて小数点以下6桁に丸められ、
//! 非有限値は `null` になります。

use crate::models::common::math_utils;
use crate::models::{Coordinates, MissileAttributes, Waypoint};
use crate::trajectory::TrajectoryData;
use serde::{Serialize, Serializer};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// JSON数値の小数桁数
pub const JSON_PRECISION: i32 = 6;

/// 出力エラー
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("出力ファイルを書き込めません {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("JSON変換エラー: {0}")]
    Json(#[from] serde_json::Error),
}

fn fixed<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(math_utils::round_to(*value, JSON_PRECISION))
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordinatesReport {
    #[serde(serialize_with = "fixed")]
    pub latitude: f64,
    #[serde(serialize_with = "fixed")]
    pub longitude: f64,
    #[serde(serialize_with = "fixed")]
    pub altitude: f64,
}

impl From<&Coordinates> for CoordinatesReport {
    fn from(c: &Coordinates) -> Self {
        Self {
            latitude: c.latitude,
            longitude: c.longitude,
            altitude: c.altitude,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissileReport {
    #[serde(serialize_with = "fixed")]
    pub weight: f64,
    #[serde(serialize_with = "fixed")]
    pub speed: f64,
    #[serde(serialize_with = "fixed")]
    pub fuel: f64,
    #[serde(serialize_with = "fixed")]
    pub burn_rate: f64,
    #[serde(serialize_with = "fixed")]
    pub thrust: f64,
    #[serde(serialize_with = "fixed")]
    pub max_acceleration: f64,
    #[serde(serialize_with = "fixed")]
    pub max_deceleration: f64,
    #[serde(serialize_with = "fixed")]
    pub max_turn_rate: f64,
    #[serde(serialize_with = "fixed")]
    pub drag_coefficient: f64,
    #[serde(serialize_with = "fixed")]
    pub fuel_consumption_normal: f64,
    #[serde(serialize_with = "fixed")]
    pub fuel_consumption_turn: f64,
}

impl From<&MissileAttributes> for MissileReport {
    fn from(m: &MissileAttributes) -> Self {
        Self {
            weight: m.weight,
            speed: m.speed,
            fuel: m.fuel,
            burn_rate: m.burn_rate,
            thrust: m.thrust,
            max_acceleration: m.max_acceleration,
            max_deceleration: m.max_deceleration,
            max_turn_rate: m.max_turn_rate,
            drag_coefficient: m.drag_coefficient,
            fuel_consumption_normal: m.fuel_consumption_normal,
            fuel_consumption_turn: m.fuel_consumption_turn,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointReport {
    pub position: CoordinatesReport,
    #[serde(serialize_with = "fixed")]
    pub turn_angle: f64,
    #[serde(serialize_with = "fixed")]
    pub approach_speed: f64,
    #[serde(serialize_with = "fixed")]
    pub departure_speed: f64,
    #[serde(serialize_with = "fixed")]
    pub time_to_reach: f64,
    #[serde(serialize_with = "fixed")]
    pub distance_from_previous: f64,
    #[serde(serialize_with = "fixed")]
    pub bearing_from_previous: f64,
    #[serde(serialize_with = "fixed")]
    pub fuel_consumed: f64,
    #[serde(serialize_with = "fixed")]
    pub g_force: f64,
    pub leg_accounted: bool,
}

impl From<&Waypoint> for WaypointReport {
    fn from(w: &Waypoint) -> Self {
        let e = &w.effect;
        Self {
            position: CoordinatesReport::from(&w.position),
            turn_angle: w.turn_angle,
            approach_speed: e.approach_speed,
            departure_speed: e.departure_speed,
            time_to_reach: e.time_to_reach,
            distance_from_previous: e.distance_from_previous,
            bearing_from_previous: e.bearing_from_previous,
            fuel_consumed: e.fuel_consumed,
            g_force: e.g_force,
            leg_accounted: e.accounted,
        }
    }
}

/// 出力用の軌道レポート
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryReport {
    #[serde(serialize_with = "fixed")]
    pub total_distance: f64,
    #[serde(serialize_with = "fixed")]
    pub total_travel_time: f64,
    #[serde(serialize_with = "fixed")]
    pub initial_bearing: f64,
    #[serde(serialize_with = "fixed")]
    pub current_speed: f64,
    #[serde(serialize_with = "fixed")]
    pub remaining_fuel: f64,
    #[serde(serialize_with = "fixed")]
    pub fuel_deficit: f64,
    pub start: CoordinatesReport,
    pub end: CoordinatesReport,
    pub missile: MissileReport,
    pub waypoints: Vec<WaypointReport>,
    pub path: Vec<CoordinatesReport>,
}

impl TrajectoryReport {
    pub fn new(route: &TrajectoryData, path: &[Coordinates]) -> Self {
        Self {
            total_distance: route.total_distance(),
            total_travel_time: route.total_travel_time(),
            initial_bearing: route.initial_bearing(),
            current_speed: route.current_speed(),
            remaining_fuel: route.remaining_fuel(),
            fuel_deficit: route.fuel_deficit(),
            start: CoordinatesReport::from(&route.start()),
            end: CoordinatesReport::from(&route.end()),
            missile: MissileReport::from(route.missile()),
            waypoints: route.waypoints().iter().map(WaypointReport::from).collect(),
            path: path.iter().map(CoordinatesReport::from).collect(),
        }
    }

    /// JSON文字列へ変換
    pub fn to_json_string(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSONファイルへ書き出し
    ///
    /// 親ディレクトリが存在しない場合は作成します。
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        let path = path.as_ref();
        let io_err = |e| ReportError::Io(path.to_path_buf(), e);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer).map_err(io_err)?;
        writer.flush().map_err(io_err)?;

        info!(
            path = %path.display(),
            waypoints = self.waypoints.len(),
            path_points = self.path.len(),
            "REPORT_WRITTEN: 軌道データを書き出しました"
        );
        Ok(())
    }
}

/// コンソール向け要約を整形
pub fn format_summary(route: &TrajectoryData) -> String {
    let mut out = String::new();
    // Stringへの書き込みは失敗しない
    if let Err(e) = write_summary(&mut out, route) {
        warn!(error = %e, "SUMMARY_FORMAT_FAILED: 要約の整形に失敗しました");
    }
    out
}

fn write_summary(out: &mut String, route: &TrajectoryData) -> std::fmt::Result {
    writeln!(out, "総距離: {:.2} km", route.total_distance())?;
    writeln!(out, "総飛行時間: {:.2} 秒", route.total_travel_time())?;
    writeln!(out, "初期方位角: {:.2} 度", route.initial_bearing())?;
    writeln!(out, "残燃料: {:.2} kg", route.remaining_fuel())?;
    if route.is_fuel_exhausted() {
        writeln!(out, "燃料不足: {:.2} kg", route.fuel_deficit())?;
    }
    writeln!(out, "最終速度: {:.2} m/s", route.current_speed())?;

    writeln!(out)?;
    writeln!(out, "ウェイポイント: {}点", route.waypoint_count())?;
    for (index, wp) in route.waypoints().iter().enumerate() {
        let e = &wp.effect;
        writeln!(out, "ウェイポイント {}:", index + 1)?;
        writeln!(
            out,
            "  位置: {:.6}, {:.6}, {:.6}",
            wp.position.latitude, wp.position.longitude, wp.position.altitude
        )?;
        writeln!(out, "  旋回角: {:.2} 度", wp.turn_angle)?;
        if !e.accounted {
            writeln!(out, "  (素通し: この区間は合計に算入されません)")?;
        }
        writeln!(out, "  進入速度: {:.2} m/s", e.approach_speed)?;
        writeln!(out, "  離脱速度: {:.2} m/s", e.departure_speed)?;
        writeln!(out, "  荷重倍数: {:.2} g", e.g_force)?;
        writeln!(out, "  前地点からの距離: {:.2} km", e.distance_from_previous)?;
        writeln!(out, "  所要時間: {:.2} 秒", e.time_to_reach)?;
        writeln!(out, "  燃料消費: {:.2} kg", e.fuel_consumed)?;
    }
    Ok(())
}

/// コンソールへ要約を表示
pub fn print_summary(route: &TrajectoryData) {
    print!("{}", format_summary(route));
}

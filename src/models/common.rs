use serde::{Deserialize, Serialize};

/// 地理座標を表す構造体
///
/// 緯度・経度は度、高度はメートルで保持します。範囲のクランプは行いません。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,  // deg
    pub longitude: f64, // deg
    pub altitude: f64,  // m
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// 緯度・経度をラジアンで取得
    pub fn lat_lon_rad(&self) -> (f64, f64) {
        (
            math_utils::deg_to_rad(self.latitude),
            math_utils::deg_to_rad(self.longitude),
        )
    }

    /// 全成分が有限値かどうか
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite() && self.altitude.is_finite()
    }
}

/// 物理定数
///
/// 地球半径や重力加速度をエンジンへ設定値として渡すための構造体です。
/// 別の惑星や単位系を扱う場合はここを差し替えます。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// 球体半径（km）
    pub earth_radius_km: f64,
    /// 重力加速度（m/s²）
    pub gravity_mps2: f64,
    /// 経路サンプリング時の最高到達高度（m）
    pub max_altitude_m: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            earth_radius_km: 6371.0,
            gravity_mps2: 9.81,
            max_altitude_m: 10_000.0,
        }
    }
}

/// 数学ユーティリティ関数
pub mod math_utils {
    /// 度をラジアンに変換
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * std::f64::consts::PI / 180.0
    }

    /// ラジアンを度に変換
    pub fn rad_to_deg(radians: f64) -> f64 {
        radians * 180.0 / std::f64::consts::PI
    }

    /// 方位角を0度以上360度未満の範囲に正規化
    pub fn normalize_bearing(angle_deg: f64) -> f64 {
        let normalized = angle_deg.rem_euclid(360.0);
        // rem_euclidは丸め誤差で360.0を返すことがある
        if normalized >= 360.0 { 0.0 } else { normalized }
    }

    /// 小数点以下 `digits` 桁に丸める
    pub fn round_to(value: f64, digits: i32) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let factor = 10f64.powi(digits);
        (value * factor).round() / factor
    }
}

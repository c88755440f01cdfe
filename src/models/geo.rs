//! # 大円幾何
//!
//! 球面上の2点間距離（Haversine）、初期方位角、所要時間、
//! 大円に沿った球面線形補間を提供します。

use crate::error::TrajectoryError;
use crate::models::common::{math_utils, Coordinates, PhysicalConstants};

/// 中心角の正弦がこの値未満の場合は大円を一意に決められない（約0.6m相当）
const DEGENERATE_EPSILON: f64 = 1e-7;

/// 大円幾何計算器
///
/// 球体半径と補間時の最高高度を保持します。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoMath {
    pub radius_km: f64,
    pub max_altitude_m: f64,
}

impl Default for GeoMath {
    fn default() -> Self {
        Self::from_constants(&PhysicalConstants::default())
    }
}

impl GeoMath {
    pub fn new(radius_km: f64, max_altitude_m: f64) -> Self {
        Self {
            radius_km,
            max_altitude_m,
        }
    }

    pub fn from_constants(constants: &PhysicalConstants) -> Self {
        Self::new(constants.earth_radius_km, constants.max_altitude_m)
    }

    /// 2点間の大円距離（km）
    ///
    /// Haversine公式による。対称で、同一点に対しては0を返します。
    pub fn distance(&self, a: &Coordinates, b: &Coordinates) -> f64 {
        self.radius_km * self.angular_distance(a, b)
    }

    /// 2点間の中心角（rad）
    pub fn angular_distance(&self, a: &Coordinates, b: &Coordinates) -> f64 {
        let (lat1, lon1) = a.lat_lon_rad();
        let (lat2, lon2) = b.lat_lon_rad();

        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        // 丸め誤差でhが1を超えるとsqrt(1-h)がNaNになる
        let h = h.clamp(0.0, 1.0);
        2.0 * h.sqrt().atan2((1.0 - h).sqrt())
    }

    /// aからbへの初期方位角（度, [0, 360)）
    ///
    /// aとbが一致する場合の値は保証されません。
    pub fn bearing(&self, a: &Coordinates, b: &Coordinates) -> f64 {
        let (lat1, lon1) = a.lat_lon_rad();
        let (lat2, lon2) = b.lat_lon_rad();
        let dlon = lon2 - lon1;

        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

        math_utils::normalize_bearing(math_utils::rad_to_deg(y.atan2(x)))
    }

    /// 所要時間（秒）
    ///
    /// 速度が正であることは呼び出し側が保証します。
    pub fn travel_time(&self, distance_m: f64, speed_mps: f64) -> f64 {
        distance_m / speed_mps
    }

    /// 大円に沿った中間点
    ///
    /// 緯度経度は球面線形補間、高度は `max_altitude · sin(fraction·π)` の放物線状プロファイルです。
    /// 大円が定義できない場合は `a` をそのまま返します。
    pub fn interpolate(&self, a: &Coordinates, b: &Coordinates, fraction: f64) -> Coordinates {
        self.try_interpolate(a, b, fraction).unwrap_or(*a)
    }

    /// 大円に沿った中間点（退化チェック付き）
    pub fn try_interpolate(
        &self,
        a: &Coordinates,
        b: &Coordinates,
        fraction: f64,
    ) -> Result<Coordinates, TrajectoryError> {
        let d = self.angular_distance(a, b);
        let sin_d = d.sin();
        if d < DEGENERATE_EPSILON || sin_d.abs() < DEGENERATE_EPSILON {
            return Err(TrajectoryError::DegenerateGreatCircle { from: *a, to: *b });
        }

        let (lat1, lon1) = a.lat_lon_rad();
        let (lat2, lon2) = b.lat_lon_rad();

        let wa = ((1.0 - fraction) * d).sin() / sin_d;
        let wb = (fraction * d).sin() / sin_d;

        let x = wa * lat1.cos() * lon1.cos() + wb * lat2.cos() * lon2.cos();
        let y = wa * lat1.cos() * lon1.sin() + wb * lat2.cos() * lon2.sin();
        let z = wa * lat1.sin() + wb * lat2.sin();

        let lat = z.atan2((x * x + y * y).sqrt());
        let lon = y.atan2(x);

        Ok(Coordinates::new(
            math_utils::rad_to_deg(lat),
            math_utils::rad_to_deg(lon),
            self.max_altitude_m * (fraction * std::f64::consts::PI).sin(),
        ))
    }

    /// 2点間で大円が定義できるかどうか
    pub fn is_degenerate(&self, a: &Coordinates, b: &Coordinates) -> bool {
        let d = self.angular_distance(a, b);
        d < DEGENERATE_EPSILON || d.sin().abs() < DEGENERATE_EPSILON
    }
}

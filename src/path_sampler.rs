//! 描画用の経路サンプリング
//!
//! 各区間（始点→WP1, WP1→WP2, …, WPn→終点）を大円に沿って等分割し、
//! 両端を含む `samples_per_leg` 点ずつを生成します。経路の状態は変更しません。

use crate::error::TrajectoryError;
use crate::models::{Coordinates, GeoMath, IRoute};
use crate::scenario::EngineConfig;
use std::convert::Infallible;
use tracing::{debug, warn};

/// 経路サンプラー
#[derive(Debug, Clone, Copy)]
pub struct PathSampler {
    geo: GeoMath,
    samples_per_leg: usize,
}

impl PathSampler {
    pub fn new(geo: GeoMath, samples_per_leg: usize) -> Self {
        Self {
            geo,
            samples_per_leg,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(GeoMath::from_constants(&config.constants), config.samples_per_leg)
    }

    /// 経路全体をサンプリング
    ///
    /// 出力長は `(ウェイポイント数 + 1) · samples_per_leg`。大円が定義できない区間では
    /// 区間始点を繰り返します。出力バッファを確保できない場合は空のベクターを返すため、
    /// 呼び出し側は空の場合を考慮する必要があります。
    pub fn sample_path<R: IRoute>(&self, route: &R) -> Vec<Coordinates> {
        let Ok(points) = self.collect_points(route, |from, to, fraction| {
            Ok::<_, Infallible>(self.geo.interpolate(from, to, fraction))
        });

        debug!(points = points.len(), "PATH_SAMPLED: 経路をサンプリングしました");
        points
    }

    /// 経路全体をサンプリング（退化区間をエラーとする）
    pub fn try_sample_path<R: IRoute>(&self, route: &R) -> Result<Vec<Coordinates>, TrajectoryError> {
        self.collect_points(route, |from, to, fraction| self.geo.try_interpolate(from, to, fraction))
    }

    /// 各区間を `samples_per_leg` 点ずつ補間して連結する
    fn collect_points<R, F, E>(&self, route: &R, mut point_at: F) -> Result<Vec<Coordinates>, E>
    where
        R: IRoute,
        F: FnMut(&Coordinates, &Coordinates, f64) -> Result<Coordinates, E>,
    {
        let legs = route.legs();
        let Some(mut points) = self.allocate(legs.len()) else {
            return Ok(Vec::new());
        };

        for (from, to) in &legs {
            for i in 0..self.samples_per_leg {
                points.push(point_at(from, to, self.fraction(i))?);
            }
        }

        Ok(points)
    }

    fn fraction(&self, i: usize) -> f64 {
        if self.samples_per_leg < 2 {
            return 0.0;
        }
        i as f64 / (self.samples_per_leg - 1) as f64
    }

    fn allocate(&self, leg_count: usize) -> Option<Vec<Coordinates>> {
        let Some(total) = leg_count.checked_mul(self.samples_per_leg) else {
            warn!(leg_count, samples_per_leg = self.samples_per_leg, "PATH_ALLOCATION_FAILED: 点数が桁あふれしました");
            return None;
        };

        let mut points = Vec::new();
        if let Err(e) = points.try_reserve_exact(total) {
            warn!(total, error = %e, "PATH_ALLOCATION_FAILED: 経路点バッファを確保できませんでした");
            return None;
        }
        Some(points)
    }
}

impl Default for PathSampler {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

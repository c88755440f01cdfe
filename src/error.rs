//! 軌道計算エラー
//!
//! 数値フロアで吸収されがちな異常系（非正速度・退化区間・燃料枯渇など）を明示的なエラー種別として表現します。
//! `Permissive` モードではこれらの大半がログ出力のみとなり、`Strict` モードでは呼び出し元へ返されます。

use crate::models::Coordinates;
use thiserror::Error;

/// 軌道計算エラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    /// ウェイポイント数が上限に達している
    #[error("ウェイポイント容量超過: 上限 {capacity} 点に達しています")]
    CapacityExceeded { capacity: usize },

    /// 区間の飛行速度が0以下
    #[error("速度が正ではありません: {speed} m/s ({leg})")]
    NonPositiveSpeed { speed: f64, leg: String },

    /// 2点間の大円が定義できない（同一点または対蹠点）
    #[error("大円が定義できません: {from:?} -> {to:?}")]
    DegenerateGreatCircle { from: Coordinates, to: Coordinates },

    /// 搭載燃料を超える消費
    #[error("燃料枯渇: 必要量 {required:.2} kg に対し搭載量 {available:.2} kg")]
    FuelExhausted { required: f64, available: f64 },

    /// 存在しないウェイポイント番号
    #[error("ウェイポイント番号が範囲外です: {index} (登録数 {count})")]
    WaypointIndexOutOfRange { index: usize, count: usize },
}

use crate::models::common::Coordinates;
use serde::{Deserialize, Serialize};

/// 1区間の計算結果
///
/// 直前の地点からこのウェイポイントへ至る区間と、ウェイポイントでの旋回の効果をまとめたものです。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LegEffect {
    /// 進入速度（m/s）
    pub approach_speed: f64,
    /// 旋回後の離脱速度（m/s）
    pub departure_speed: f64,
    /// 直前地点からの所要時間（s）
    pub time_to_reach: f64,
    /// 直前地点からの距離（km）
    pub distance_from_previous: f64,
    /// 直前地点からの方位角（deg）
    pub bearing_from_previous: f64,
    /// 区間と旋回で消費した燃料（kg）
    pub fuel_consumed: f64,
    /// 旋回時の荷重倍数（g）
    pub g_force: f64,
    /// この区間が合計値に算入されているか
    pub accounted: bool,
}

impl LegEffect {
    /// 合計に算入されない素通し区間（全計算値0）
    pub fn unaccounted() -> Self {
        Self::default()
    }
}

/// ウェイポイント
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Coordinates,
    /// 要求旋回角（deg）
    pub turn_angle: f64,
    /// 計算値（再構築されるまで0）
    pub effect: LegEffect,
}

impl Waypoint {
    pub fn new(position: Coordinates, turn_angle: f64) -> Self {
        Self {
            position,
            turn_angle,
            effect: LegEffect::default(),
        }
    }

    pub fn is_accounted(&self) -> bool {
        self.effect.accounted
    }
}

/// ウェイポイント入力（位置と旋回角の組）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointInput {
    pub position: Coordinates,
    pub turn_angle: f64,
}

impl WaypointInput {
    pub fn new(position: Coordinates, turn_angle: f64) -> Self {
        Self {
            position,
            turn_angle,
        }
    }
}

use serde::{Deserialize, Serialize};
use tracing::debug;

/// 搭載燃料の機体重量比
pub const FUEL_WEIGHT_RATIO: f64 = 0.7;
/// 全燃料を燃焼し切るまでの時間（秒）
pub const FULL_BURN_TIME_S: f64 = 60.0;
/// 推力の機体重量比（N/kg）
pub const THRUST_PER_KG: f64 = 30.0;

/// 物理パラメータの既定値
///
/// 0以下の値が指定されたフィールドのみ、ルート作成時にこれらの値で置き換えられます。
pub mod defaults {
    /// 最大加速度（m/s²）
    pub const MAX_ACCELERATION: f64 = 30.0;
    /// 最大減速度（m/s²）
    pub const MAX_DECELERATION: f64 = 50.0;
    /// 最大旋回レート（deg/s）
    pub const MAX_TURN_RATE: f64 = 20.0;
    /// 抗力係数
    pub const DRAG_COEFFICIENT: f64 = 0.1;
    /// 旋回時燃料消費の通常時に対する倍率
    pub const TURN_CONSUMPTION_FACTOR: f64 = 2.0;
}

/// ミサイル属性
///
/// 機体重量と速度から導出される燃料パラメータと、旋回モデルで使用する物理パラメータを保持します。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MissileAttributes {
    /// 機体重量（kg）
    pub weight: f64,
    /// 巡航速度（m/s）
    pub speed: f64,
    /// 搭載燃料（kg）
    pub fuel: f64,
    /// 燃焼率（kg/s）
    pub burn_rate: f64,
    /// 推力（N）
    pub thrust: f64,
    /// 最大加速度（m/s²）
    pub max_acceleration: f64,
    /// 最大減速度（m/s²）
    pub max_deceleration: f64,
    /// 最大旋回レート（deg/s）
    pub max_turn_rate: f64,
    /// 抗力係数（無次元）
    pub drag_coefficient: f64,
    /// 通常飛行時の燃料消費（kg/s）
    pub fuel_consumption_normal: f64,
    /// 旋回時の燃料消費（kg/s）
    pub fuel_consumption_turn: f64,
}

/// ミサイルプロファイル
///
/// 生の重量・速度からミサイル属性を組み立てるためのファクトリです。
pub struct MissileProfile;

impl MissileProfile {
    /// 重量と速度から属性を導出
    ///
    /// 燃料は重量の70%、燃焼率は60秒で全燃料を消費する値、推力は重量の30倍とします。
    /// 物理パラメータは0のまま残し、ルート作成時の既定値適用に委ねます。
    ///
    /// # 引数
    ///
    /// * `weight` - 機体重量（kg）
    /// * `speed` - 巡航速度（m/s）
    pub fn from_weight_and_speed(weight: f64, speed: f64) -> MissileAttributes {
        let fuel = weight * FUEL_WEIGHT_RATIO;
        MissileAttributes {
            weight,
            speed,
            fuel,
            burn_rate: fuel / FULL_BURN_TIME_S,
            thrust: weight * THRUST_PER_KG,
            ..MissileAttributes::default()
        }
    }
}

impl MissileAttributes {
    /// 0以下の物理パラメータを既定値で置き換えた属性を返す
    ///
    /// 冪等であり、燃料・燃焼率・推力には触れません。
    pub fn with_defaults(mut self) -> Self {
        if self.max_acceleration <= 0.0 {
            self.max_acceleration = defaults::MAX_ACCELERATION;
        }
        if self.max_deceleration <= 0.0 {
            self.max_deceleration = defaults::MAX_DECELERATION;
        }
        if self.max_turn_rate <= 0.0 {
            self.max_turn_rate = defaults::MAX_TURN_RATE;
        }
        if self.drag_coefficient <= 0.0 {
            self.drag_coefficient = defaults::DRAG_COEFFICIENT;
        }
        if self.fuel_consumption_normal <= 0.0 {
            self.fuel_consumption_normal = self.burn_rate;
        }
        if self.fuel_consumption_turn <= 0.0 {
            self.fuel_consumption_turn = self.burn_rate * defaults::TURN_CONSUMPTION_FACTOR;
        }

        debug!(
            weight = self.weight,
            speed = self.speed,
            fuel = self.fuel,
            burn_rate = self.burn_rate,
            max_turn_rate = self.max_turn_rate,
            drag_coefficient = self.drag_coefficient,
            "MISSILE_DEFAULTS_APPLIED: ミサイル属性に既定値を適用しました"
        );

        self
    }

    /// 最大旋回レートで指定角度を旋回するのに要する時間（秒）
    pub fn turn_duration(&self, turn_angle_deg: f64) -> f64 {
        turn_angle_deg.abs() / self.max_turn_rate
    }
}

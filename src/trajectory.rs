//! # Trajectory モジュール
//!
//! 始点・終点・ウェイポイント列からなる経路に対して、区間ごとの距離・所要時間・
//! 旋回による速度低下・燃料消費・荷重倍数を計算し、経路全体の合計値を集計します。
//!
//! ## 一貫性モデル
//!
//! [`TrajectoryData`] は不変のスナップショットです。構造を変える操作はウェイポイントの追加のみで、
//! [`TrajectoryEngine::append_waypoint`] は追加後に全区間を最初から再計算した新しいスナップショットを返します。
//! 差分更新は行わないため、合計値と区間詳細が食い違うことはありません。
//! ウェイポイント数は上限（既定10）で抑えられるので、再計算コストは追加1回あたり O(n) です。
//!
//! ## 再計算の手順
//!
//! 1. 合計値をリセット（距離0、時間0、現在速度=基準速度、残燃料=搭載燃料）
//! 2. 初期方位角 = 始点から最初のウェイポイント（なければ終点）への方位
//! 3. 各ウェイポイントの区間効果を通過順に計算し、算入対象の区間を合計へ加算
//! 4. 最後の地点から終点までの最終区間を、直前の離脱速度（現在速度）で旋回なしに加算
//! 5. 残燃料を0で下限クランプ（不足分は `fuel_deficit` に記録）
//!
//! ## 使用例
//!
//! ```rust
//! use trajcalc::models::{Coordinates, MissileProfile};
//! use trajcalc::scenario::EngineConfig;
//! use trajcalc::trajectory::TrajectoryEngine;
//!
//! let engine = TrajectoryEngine::new(EngineConfig::default());
//! let missile = MissileProfile::from_weight_and_speed(1000.0, 300.0);
//!
//! let route = engine.create_route(
//!     Coordinates::new(0.0, 0.0, 0.0),
//!     Coordinates::new(0.0, 1.0, 0.0),
//!     missile,
//! )?;
//! let route = engine.append_waypoint(&route, Coordinates::new(0.2, 0.5, 0.0), 30.0)?;
//! assert_eq!(route.waypoint_count(), 1);
//! # Ok::<(), trajcalc::error::TrajectoryError>(())
//! ```

use crate::error::TrajectoryError;
use crate::models::common::math_utils;
use crate::models::{
    Coordinates, GeoMath, IRoute, LegEffect, MissileAttributes, Waypoint, WaypointInput,
};
use crate::scenario::{EngineConfig, FirstLegPolicy, ValidationMode};
use tracing::{debug, info, trace, warn};

/// 旋回半径の下限（m）
pub const TURN_RADIUS_FLOOR_M: f64 = 0.1;
/// 旋回後に保持される速度の下限比
pub const MIN_SPEED_RETENTION: f64 = 0.1;

/// 旋回による速度変化
///
/// `speed · cos(|turn_angle| [rad] · drag)` を `0.1 · speed` で下限クランプします。
/// 旋回角0では速度をそのまま返します。
pub fn turn_effect(speed: f64, turn_angle_deg: f64, drag_coefficient: f64) -> f64 {
    if turn_angle_deg == 0.0 {
        return speed;
    }
    let turn_radians = math_utils::deg_to_rad(turn_angle_deg).abs();
    let reduced = speed * (turn_radians * drag_coefficient).cos();
    reduced.max(MIN_SPEED_RETENTION * speed)
}

/// 旋回時の荷重倍数（g）
///
/// `speed² / (turn_radius · gravity)`。旋回半径は 0.1 m で下限クランプします。
pub fn g_force(speed: f64, turn_radius_m: f64, gravity_mps2: f64) -> f64 {
    let radius = turn_radius_m.max(TURN_RADIUS_FLOOR_M);
    (speed * speed) / (radius * gravity_mps2)
}

/// 軌道データ（不変スナップショット）
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryData {
    start: Coordinates,
    end: Coordinates,
    missile: MissileAttributes,
    waypoints: Vec<Waypoint>,
    capacity: usize,

    /// 総距離（km）
    total_distance: f64,
    /// 総所要時間（s）
    total_travel_time: f64,
    /// 初期方位角（deg）
    initial_bearing: f64,
    /// 最終区間の飛行速度（m/s）
    current_speed: f64,
    /// 残燃料（kg, 0以上）
    remaining_fuel: f64,
    /// 搭載量を超えた燃料消費量（kg）
    fuel_deficit: f64,
}

impl TrajectoryData {
    pub fn start(&self) -> Coordinates {
        self.start
    }

    pub fn end(&self) -> Coordinates {
        self.end
    }

    pub fn missile(&self) -> &MissileAttributes {
        &self.missile
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.waypoints.len() >= self.capacity
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn total_travel_time(&self) -> f64 {
        self.total_travel_time
    }

    pub fn initial_bearing(&self) -> f64 {
        self.initial_bearing
    }

    pub fn current_speed(&self) -> f64 {
        self.current_speed
    }

    pub fn remaining_fuel(&self) -> f64 {
        self.remaining_fuel
    }

    pub fn fuel_deficit(&self) -> f64 {
        self.fuel_deficit
    }

    /// 経路途中で燃料が尽きるかどうか
    pub fn is_fuel_exhausted(&self) -> bool {
        self.fuel_deficit > 0.0
    }
}

impl IRoute for TrajectoryData {
    fn get_start(&self) -> Coordinates {
        self.start
    }

    fn get_end(&self) -> Coordinates {
        self.end
    }

    fn get_waypoint_positions(&self) -> Vec<Coordinates> {
        self.waypoints.iter().map(|w| w.position).collect()
    }
}

/// 軌道計算エンジン
///
/// 設定（物理定数・上限数・検証モード・先頭区間の扱い）を保持し、
/// [`TrajectoryData`] の生成と再計算を行います。エンジン自体は状態を持ちません。
#[derive(Debug, Clone)]
pub struct TrajectoryEngine {
    config: EngineConfig,
    geo: GeoMath,
}

impl Default for TrajectoryEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TrajectoryEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            geo: GeoMath::from_constants(&config.constants),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn geo(&self) -> &GeoMath {
        &self.geo
    }

    fn is_strict(&self) -> bool {
        self.config.mode == ValidationMode::Strict
    }

    /// ウェイポイントなしの経路を作成
    ///
    /// ミサイル属性へ既定値を適用し、全体を計算します。
    ///
    /// # エラー
    ///
    /// `Strict` モードでは基準速度が0以下の場合に `NonPositiveSpeed`、
    /// 再計算中の異常は [`TrajectoryEngine::append_waypoint`] と同じ種別を返します。
    pub fn create_route(
        &self,
        start: Coordinates,
        end: Coordinates,
        missile: MissileAttributes,
    ) -> Result<TrajectoryData, TrajectoryError> {
        let missile = missile.with_defaults();

        if self.is_strict() && !(missile.speed > 0.0) {
            return Err(TrajectoryError::NonPositiveSpeed {
                speed: missile.speed,
                leg: "base speed".to_string(),
            });
        }

        let route = TrajectoryData {
            start,
            end,
            missile,
            waypoints: Vec::with_capacity(self.config.waypoint_capacity),
            capacity: self.config.waypoint_capacity,
            total_distance: 0.0,
            total_travel_time: 0.0,
            initial_bearing: 0.0,
            current_speed: missile.speed,
            remaining_fuel: missile.fuel,
            fuel_deficit: 0.0,
        };

        let route = self.rebuild(route)?;

        info!(
            start_latitude = start.latitude,
            start_longitude = start.longitude,
            end_latitude = end.latitude,
            end_longitude = end.longitude,
            weight = missile.weight,
            speed = missile.speed,
            fuel = missile.fuel,
            total_distance = route.total_distance,
            total_travel_time = route.total_travel_time,
            "ROUTE_CREATED: 経路を作成しました"
        );

        Ok(route)
    }

    /// ウェイポイントを追加した新しいスナップショットを返す
    ///
    /// 追加後は全区間を再計算します。元のスナップショットは変更されません。
    ///
    /// # エラー
    ///
    /// * `CapacityExceeded` - 上限に達している（`Strict` のみ。`Permissive` では追加せずに元の内容を返す）
    /// * `NonPositiveSpeed` / `DegenerateGreatCircle` / `FuelExhausted` - 再計算での異常（`Strict` のみ）
    pub fn append_waypoint(
        &self,
        route: &TrajectoryData,
        position: Coordinates,
        turn_angle: f64,
    ) -> Result<TrajectoryData, TrajectoryError> {
        if route.is_full() {
            if self.is_strict() {
                return Err(TrajectoryError::CapacityExceeded {
                    capacity: route.capacity,
                });
            }

            warn!(
                capacity = route.capacity,
                dropped_latitude = position.latitude,
                dropped_longitude = position.longitude,
                turn_angle,
                "WAYPOINT_DROPPED: ウェイポイント上限に達したため追加を無視しました"
            );
            return Ok(route.clone());
        }

        let mut next = route.clone();
        next.waypoints.push(Waypoint::new(position, turn_angle));
        let next = self.rebuild(next)?;

        info!(
            index = next.waypoints.len() - 1,
            latitude = position.latitude,
            longitude = position.longitude,
            altitude = position.altitude,
            turn_angle,
            total_distance = next.total_distance,
            total_travel_time = next.total_travel_time,
            remaining_fuel = next.remaining_fuel,
            "WAYPOINT_APPENDED: ウェイポイントを追加しました"
        );

        Ok(next)
    }

    /// 複数のウェイポイントを順に追加
    pub fn append_waypoints<I>(
        &self,
        route: &TrajectoryData,
        inputs: I,
    ) -> Result<TrajectoryData, TrajectoryError>
    where
        I: IntoIterator<Item = WaypointInput>,
    {
        let mut current = route.clone();
        for input in inputs {
            current = self.append_waypoint(&current, input.position, input.turn_angle)?;
        }
        Ok(current)
    }

    /// 指定ウェイポイントへの区間効果を計算
    ///
    /// 直前の地点（始点または1つ前のウェイポイント）からの距離・方位、進入速度、所要時間、
    /// 旋回後速度、燃料消費、荷重倍数を求めます。1つ前のウェイポイントの効果は計算済みである必要があります。
    ///
    /// `FirstLegPolicy::PassThrough` では先頭ウェイポイントは素通し（全値0、合計に不算入）となり、
    /// 2番目のウェイポイントは始点から基準速度で計測されます。
    pub fn compute_waypoint_effect(
        &self,
        route: &TrajectoryData,
        index: usize,
    ) -> Result<LegEffect, TrajectoryError> {
        let count = route.waypoints.len();
        if index >= count {
            return Err(TrajectoryError::WaypointIndexOutOfRange { index, count });
        }

        let (previous_point, approach_speed) = match (self.config.first_leg_policy, index) {
            (FirstLegPolicy::PassThrough | FirstLegPolicy::PassThroughBaseSpeed, 0) => {
                return Ok(LegEffect::unaccounted());
            }
            (FirstLegPolicy::PassThrough | FirstLegPolicy::PassThroughBaseSpeed, 1)
            | (FirstLegPolicy::Accounted, 0) => {
                (route.start, route.missile.speed)
            }
            _ => {
                let previous = &route.waypoints[index - 1];
                (previous.position, previous.effect.departure_speed)
            }
        };

        let waypoint = &route.waypoints[index];
        let missile = &route.missile;
        let leg = format!("waypoint {}", index + 1);
        self.check_leg(&previous_point, &waypoint.position, approach_speed, &leg)?;

        let distance_km = self.geo.distance(&previous_point, &waypoint.position);
        let time_to_reach = self.geo.travel_time(distance_km * 1000.0, approach_speed);
        let departure_speed =
            turn_effect(approach_speed, waypoint.turn_angle, missile.drag_coefficient);

        let cruise_fuel = time_to_reach * missile.fuel_consumption_normal;
        let turn_fuel = missile.turn_duration(waypoint.turn_angle) * missile.fuel_consumption_turn;

        let turn_radius_m = approach_speed / math_utils::deg_to_rad(missile.max_turn_rate);

        let effect = LegEffect {
            approach_speed,
            departure_speed,
            time_to_reach,
            distance_from_previous: distance_km,
            bearing_from_previous: self.geo.bearing(&previous_point, &waypoint.position),
            fuel_consumed: cruise_fuel + turn_fuel,
            g_force: g_force(approach_speed, turn_radius_m, self.config.constants.gravity_mps2),
            accounted: true,
        };

        trace!(
            index,
            distance_km,
            time_to_reach,
            approach_speed,
            departure_speed,
            fuel_consumed = effect.fuel_consumed,
            g_force = effect.g_force,
            "WAYPOINT_EFFECT: 区間効果を計算しました"
        );

        Ok(effect)
    }

    /// `Strict` モードでの区間検証
    fn check_leg(
        &self,
        from: &Coordinates,
        to: &Coordinates,
        speed: f64,
        leg: &str,
    ) -> Result<(), TrajectoryError> {
        if !self.is_strict() {
            return Ok(());
        }
        if !(speed > 0.0) {
            return Err(TrajectoryError::NonPositiveSpeed {
                speed,
                leg: leg.to_string(),
            });
        }
        if self.geo.is_degenerate(from, to) {
            return Err(TrajectoryError::DegenerateGreatCircle {
                from: *from,
                to: *to,
            });
        }
        Ok(())
    }

    /// 全区間の再計算
    fn rebuild(&self, mut route: TrajectoryData) -> Result<TrajectoryData, TrajectoryError> {
        route.total_distance = 0.0;
        route.total_travel_time = 0.0;
        route.current_speed = route.missile.speed;
        route.remaining_fuel = route.missile.fuel;
        route.fuel_deficit = 0.0;

        let first_target = route
            .waypoints
            .first()
            .map(|w| w.position)
            .unwrap_or(route.end);
        if self.is_strict() && self.geo.is_degenerate(&route.start, &first_target) {
            return Err(TrajectoryError::DegenerateGreatCircle {
                from: route.start,
                to: first_target,
            });
        }
        route.initial_bearing = self.geo.bearing(&route.start, &first_target);

        let mut fuel_used = 0.0;
        for index in 0..route.waypoints.len() {
            let effect = self.compute_waypoint_effect(&route, index)?;
            route.waypoints[index].effect = effect;

            if effect.accounted {
                route.total_distance += effect.distance_from_previous;
                route.total_travel_time += effect.time_to_reach;
                fuel_used += effect.fuel_consumed;
            } else {
                debug!(
                    index,
                    departure_speed = effect.departure_speed,
                    "WAYPOINT_PASS_THROUGH: 先頭ウェイポイントの区間は合計に算入されません"
                );
            }

            // PassThrough では素通しウェイポイントの離脱速度0も現在速度に反映される
            let keeps_speed = !effect.accounted
                && self.config.first_leg_policy == FirstLegPolicy::PassThroughBaseSpeed;
            if !keeps_speed {
                route.current_speed = effect.departure_speed;
            }
        }

        // 最終区間（旋回なし）
        let last_point = route
            .waypoints
            .last()
            .map(|w| w.position)
            .unwrap_or(route.start);
        self.check_leg(&last_point, &route.end, route.current_speed, "final leg")?;

        let final_distance = self.geo.distance(&last_point, &route.end);
        let final_time = self
            .geo
            .travel_time(final_distance * 1000.0, route.current_speed);
        route.total_distance += final_distance;
        route.total_travel_time += final_time;
        fuel_used += final_time * route.missile.fuel_consumption_normal;

        let remaining = route.missile.fuel - fuel_used;
        if remaining < 0.0 {
            if self.is_strict() {
                return Err(TrajectoryError::FuelExhausted {
                    required: fuel_used,
                    available: route.missile.fuel,
                });
            }

            warn!(
                required = fuel_used,
                available = route.missile.fuel,
                deficit = -remaining,
                total_distance = route.total_distance,
                "FUEL_EXHAUSTED: 経路途中で燃料が尽きます（残燃料は0として扱います）"
            );
            route.fuel_deficit = -remaining;
            route.remaining_fuel = 0.0;
        } else {
            route.remaining_fuel = remaining;
        }

        debug!(
            waypoint_count = route.waypoints.len(),
            total_distance = route.total_distance,
            total_travel_time = route.total_travel_time,
            initial_bearing = route.initial_bearing,
            current_speed = route.current_speed,
            remaining_fuel = route.remaining_fuel,
            "ROUTE_REBUILT: 経路全体を再計算しました"
        );

        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MissileProfile;

    fn origin() -> Coordinates {
        Coordinates::new(0.0, 0.0, 0.0)
    }

    fn one_degree_east() -> Coordinates {
        Coordinates::new(0.0, 1.0, 0.0)
    }

    fn standard_missile() -> MissileAttributes {
        MissileProfile::from_weight_and_speed(1000.0, 300.0)
    }

    fn engine_with(mode: ValidationMode, policy: FirstLegPolicy) -> TrajectoryEngine {
        TrajectoryEngine::new(EngineConfig {
            mode,
            first_leg_policy: policy,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_zero_waypoint_route_matches_direct_leg() {
        let engine = TrajectoryEngine::default();
        let start = Coordinates::new(35.0, 139.0, 0.0);
        let end = Coordinates::new(34.8, 139.1, 0.0);
        let route = engine.create_route(start, end, standard_missile()).unwrap();

        let expected_distance = engine.geo().distance(&start, &end);
        assert_eq!(route.total_distance(), expected_distance);
        assert!((route.total_travel_time() - expected_distance * 1000.0 / 300.0).abs() < 1e-9);

        let normal = route.missile().fuel_consumption_normal;
        let expected_fuel = (700.0 - route.total_travel_time() * normal).max(0.0);
        assert!((route.remaining_fuel() - expected_fuel).abs() < 1e-9);
        assert_eq!(route.current_speed(), 300.0);
        assert_eq!(route.initial_bearing(), engine.geo().bearing(&start, &end));
    }

    #[test]
    fn test_one_degree_scenario_exhausts_fuel() {
        let engine = TrajectoryEngine::default();
        let route = engine
            .create_route(origin(), one_degree_east(), standard_missile())
            .unwrap();

        assert!((route.total_distance() - 111.19).abs() < 0.01);
        assert!((route.total_travel_time() - 370.6).abs() < 0.1);
        assert!((route.missile().fuel_consumption_normal - 11.6667).abs() < 1e-3);
        assert_eq!(route.remaining_fuel(), 0.0);
        assert!(route.is_fuel_exhausted());
        assert!((route.fuel_deficit() - (370.65 * 700.0 / 60.0 - 700.0)).abs() < 1.0);
        assert!((route.initial_bearing() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_capacity_permissive_drops_silently() {
        let engine = TrajectoryEngine::default();
        let mut route = engine
            .create_route(origin(), one_degree_east(), standard_missile())
            .unwrap();

        for i in 0..10 {
            route = engine
                .append_waypoint(&route, Coordinates::new(0.01 * i as f64, 0.05 * (i + 1) as f64, 0.0), 5.0)
                .unwrap();
        }
        assert_eq!(route.waypoint_count(), 10);
        assert!(route.is_full());

        let eleventh = Coordinates::new(0.5, 0.95, 0.0);
        let after = engine.append_waypoint(&route, eleventh, 10.0).unwrap();
        assert_eq!(after.waypoint_count(), 10);
        assert!(after.waypoints().iter().all(|w| w.position != eleventh));
        assert_eq!(after, route);
    }

    #[test]
    fn test_capacity_strict_reports_error() {
        let engine = TrajectoryEngine::new(EngineConfig {
            mode: ValidationMode::Strict,
            waypoint_capacity: 2,
            ..EngineConfig::default()
        });
        let start = origin();
        let end = Coordinates::new(0.0, 0.1, 0.0);
        let route = engine.create_route(start, end, standard_missile()).unwrap();
        let route = engine
            .append_waypoints(
                &route,
                vec![
                    WaypointInput::new(Coordinates::new(0.0, 0.03, 0.0), 0.0),
                    WaypointInput::new(Coordinates::new(0.0, 0.06, 0.0), 0.0),
                ],
            )
            .unwrap();

        let result = engine.append_waypoint(&route, Coordinates::new(0.0, 0.08, 0.0), 0.0);
        assert_eq!(result, Err(TrajectoryError::CapacityExceeded { capacity: 2 }));
    }

    #[test]
    fn test_turn_effect_properties() {
        for drag in [0.0, 0.1, 0.5, 1.0, 3.0] {
            assert_eq!(turn_effect(250.0, 0.0, drag), 250.0);
        }
        for angle in [-720.0, -180.0, -90.0, 1.0, 45.0, 90.0, 179.0, 360.0, 1000.0] {
            for drag in [0.01, 0.1, 1.0, 2.5, 10.0] {
                let result = turn_effect(300.0, angle, drag);
                assert!(result >= 0.1 * 300.0, "angle={} drag={} -> {}", angle, drag, result);
                assert!(result <= 300.0);
            }
        }
        // 左右対称
        assert_eq!(turn_effect(300.0, -60.0, 0.3), turn_effect(300.0, 60.0, 0.3));
    }

    #[test]
    fn test_g_force() {
        assert!((g_force(100.0, 1000.0, 9.81) - 10_000.0 / 9810.0).abs() < 1e-12);
        // 旋回半径の下限
        assert_eq!(g_force(10.0, 0.0, 9.81), g_force(10.0, 0.1, 9.81));
        assert!(g_force(10.0, -5.0, 9.81).is_finite());
    }

    #[test]
    fn test_single_waypoint_accounted_turn() {
        let engine = engine_with(ValidationMode::Permissive, FirstLegPolicy::Accounted);
        let route = engine
            .create_route(origin(), one_degree_east(), standard_missile())
            .unwrap();
        let waypoint_pos = Coordinates::new(0.1, 0.5, 0.0);
        let route = engine.append_waypoint(&route, waypoint_pos, 90.0).unwrap();

        let effect = route.waypoints()[0].effect;
        assert!(effect.accounted);
        assert_eq!(effect.approach_speed, 300.0);
        let expected = 300.0 * (std::f64::consts::FRAC_PI_2 * 0.1).cos();
        assert!((effect.departure_speed - expected).abs() < 1e-9);
        assert!((effect.departure_speed / effect.approach_speed - 0.9877).abs() < 1e-4);

        let geo = engine.geo();
        let leg1 = geo.distance(&origin(), &waypoint_pos);
        let leg2 = geo.distance(&waypoint_pos, &one_degree_east());
        assert!((effect.distance_from_previous - leg1).abs() < 1e-12);
        assert!((route.total_distance() - (leg1 + leg2)).abs() < 1e-9);

        let expected_time = leg1 * 1000.0 / 300.0 + leg2 * 1000.0 / expected;
        assert!((route.total_travel_time() - expected_time).abs() < 1e-6);
        assert_eq!(route.current_speed(), effect.departure_speed);

        // 燃料: 巡航 + 旋回(90/20秒 × 2倍燃焼率)
        let burn = 700.0 / 60.0;
        let expected_fuel = effect.time_to_reach * burn + 4.5 * 2.0 * burn;
        assert!((effect.fuel_consumed - expected_fuel).abs() < 1e-9);

        // g = v·ω/g
        let omega = 20f64.to_radians();
        assert!((effect.g_force - 300.0 * omega / 9.81).abs() < 1e-9);
    }

    #[test]
    fn test_pass_through_first_waypoint() {
        let engine = TrajectoryEngine::default();
        let start = origin();
        let end = one_degree_east();
        let wp0 = Coordinates::new(0.3, 0.3, 0.0);
        let wp1 = Coordinates::new(-0.2, 0.6, 0.0);

        let route = engine.create_route(start, end, standard_missile()).unwrap();
        let route = engine.append_waypoint(&route, wp0, 30.0).unwrap();

        let first = route.waypoints()[0];
        assert!(!first.is_accounted());
        assert_eq!(first.effect, LegEffect::unaccounted());
        assert_eq!(first.turn_angle, 30.0);
        assert_eq!(first.position, wp0);
        // 素通しウェイポイントの離脱速度0で最終区間を飛行するため所要時間は発散する
        assert_eq!(route.current_speed(), 0.0);
        assert!(route.total_travel_time().is_infinite());
        assert!(route.is_fuel_exhausted());
        assert_eq!(route.remaining_fuel(), 0.0);
        let geo = engine.geo();
        assert!((route.total_distance() - geo.distance(&wp0, &end)).abs() < 1e-9);
        assert_eq!(route.initial_bearing(), geo.bearing(&start, &wp0));

        let route = engine.append_waypoint(&route, wp1, 45.0).unwrap();
        let second = route.waypoints()[1].effect;
        assert!(second.accounted);
        // 2番目は始点から計測される
        assert!((second.distance_from_previous - geo.distance(&start, &wp1)).abs() < 1e-12);
        assert_eq!(second.approach_speed, 300.0);
        assert_eq!(route.waypoints()[0].effect, LegEffect::unaccounted());

        let expected_total = geo.distance(&start, &wp1) + geo.distance(&wp1, &end);
        assert!((route.total_distance() - expected_total).abs() < 1e-9);
        assert_eq!(route.current_speed(), second.departure_speed);
        assert!(route.total_travel_time().is_finite());
    }

    #[test]
    fn test_pass_through_single_waypoint_strict_final_leg() {
        let engine = engine_with(ValidationMode::Strict, FirstLegPolicy::PassThrough);
        let route = engine
            .create_route(origin(), Coordinates::new(0.0, 0.05, 0.0), standard_missile())
            .unwrap();

        let result = engine.append_waypoint(&route, Coordinates::new(0.01, 0.02, 0.0), 30.0);
        assert_eq!(
            result,
            Err(TrajectoryError::NonPositiveSpeed {
                speed: 0.0,
                leg: "final leg".to_string(),
            })
        );
    }

    #[test]
    fn test_pass_through_base_speed_keeps_speed() {
        let engine = engine_with(ValidationMode::Permissive, FirstLegPolicy::PassThroughBaseSpeed);
        let wp0 = Coordinates::new(0.1, 0.5, 0.0);
        let route = engine
            .create_route(origin(), one_degree_east(), standard_missile())
            .unwrap();
        let route = engine.append_waypoint(&route, wp0, 30.0).unwrap();

        assert!(!route.waypoints()[0].is_accounted());
        assert_eq!(route.current_speed(), 300.0);
        let geo = engine.geo();
        let expected_time = geo.distance(&wp0, &one_degree_east()) * 1000.0 / 300.0;
        assert!((route.total_travel_time() - expected_time).abs() < 1e-9);

        // 2番目以降は PassThrough と同じ計測
        let wp1 = Coordinates::new(-0.1, 0.7, 0.0);
        let route = engine.append_waypoint(&route, wp1, 20.0).unwrap();
        let reference = TrajectoryEngine::default();
        let legacy = reference
            .create_route(origin(), one_degree_east(), standard_missile())
            .unwrap();
        let legacy = reference
            .append_waypoints(
                &legacy,
                [WaypointInput::new(wp0, 30.0), WaypointInput::new(wp1, 20.0)],
            )
            .unwrap();
        assert_eq!(route.waypoints(), legacy.waypoints());
        assert_eq!(route.total_travel_time(), legacy.total_travel_time());
    }

    #[test]
    fn test_accounted_chain_sums_all_legs() {
        let engine = engine_with(ValidationMode::Permissive, FirstLegPolicy::Accounted);
        let points = [
            Coordinates::new(0.2, 0.2, 0.0),
            Coordinates::new(-0.1, 0.5, 0.0),
            Coordinates::new(0.1, 0.8, 0.0),
        ];
        let route = engine
            .create_route(origin(), one_degree_east(), standard_missile())
            .unwrap();
        let route = engine
            .append_waypoints(&route, points.iter().map(|p| WaypointInput::new(*p, 20.0)))
            .unwrap();

        let geo = engine.geo();
        let mut expected = geo.distance(&origin(), &points[0]);
        expected += geo.distance(&points[0], &points[1]);
        expected += geo.distance(&points[1], &points[2]);
        expected += geo.distance(&points[2], &one_degree_east());
        assert!((route.total_distance() - expected).abs() < 1e-9);

        let wps = route.waypoints();
        assert_eq!(wps[1].effect.approach_speed, wps[0].effect.departure_speed);
        assert_eq!(wps[2].effect.approach_speed, wps[1].effect.departure_speed);
        assert!(wps[2].effect.departure_speed < wps[0].effect.departure_speed);
        assert_eq!(route.current_speed(), wps[2].effect.departure_speed);

        let time_sum: f64 = wps.iter().map(|w| w.effect.time_to_reach).sum();
        assert!(route.total_travel_time() > time_sum);
    }

    #[test]
    fn test_append_returns_new_snapshot() {
        let engine = TrajectoryEngine::default();
        let original = engine
            .create_route(origin(), one_degree_east(), standard_missile())
            .unwrap();
        let before = original.clone();
        let appended = engine
            .append_waypoint(&original, Coordinates::new(0.1, 0.4, 0.0), 10.0)
            .unwrap();

        assert_eq!(original, before);
        assert_eq!(original.waypoint_count(), 0);
        assert_eq!(appended.waypoint_count(), 1);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let engine = engine_with(ValidationMode::Permissive, FirstLegPolicy::Accounted);
        let inputs = vec![
            WaypointInput::new(Coordinates::new(0.1, 0.3, 0.0), 15.0),
            WaypointInput::new(Coordinates::new(0.0, 0.6, 0.0), -25.0),
        ];
        let base = engine
            .create_route(origin(), one_degree_east(), standard_missile())
            .unwrap();
        let a = engine.append_waypoints(&base, inputs.clone()).unwrap();
        let b = engine.append_waypoints(&base, inputs).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_compute_waypoint_effect_out_of_range() {
        let engine = TrajectoryEngine::default();
        let route = engine
            .create_route(origin(), one_degree_east(), standard_missile())
            .unwrap();
        assert_eq!(
            engine.compute_waypoint_effect(&route, 0),
            Err(TrajectoryError::WaypointIndexOutOfRange { index: 0, count: 0 })
        );
    }

    #[test]
    fn test_strict_non_positive_speed() {
        let engine = engine_with(ValidationMode::Strict, FirstLegPolicy::PassThrough);
        let missile = MissileProfile::from_weight_and_speed(1000.0, 0.0);
        let result = engine.create_route(origin(), Coordinates::new(0.0, 0.01, 0.0), missile);
        assert!(matches!(result, Err(TrajectoryError::NonPositiveSpeed { .. })));

        // Permissiveでは無限大がそのまま伝播する
        let permissive = TrajectoryEngine::default();
        let route = permissive
            .create_route(origin(), Coordinates::new(0.0, 0.01, 0.0), missile)
            .unwrap();
        assert!(route.total_travel_time().is_infinite());
        assert_eq!(route.remaining_fuel(), 0.0);
    }

    #[test]
    fn test_strict_degenerate_leg() {
        let engine = engine_with(ValidationMode::Strict, FirstLegPolicy::Accounted);
        let start = origin();
        let end = Coordinates::new(0.0, 0.05, 0.0);
        let route = engine.create_route(start, end, standard_missile()).unwrap();

        let result = engine.append_waypoint(&route, start, 10.0);
        assert!(matches!(result, Err(TrajectoryError::DegenerateGreatCircle { .. })));

        let same = engine.create_route(start, start, standard_missile());
        assert!(matches!(same, Err(TrajectoryError::DegenerateGreatCircle { .. })));
    }

    #[test]
    fn test_strict_fuel_exhausted() {
        let engine = engine_with(ValidationMode::Strict, FirstLegPolicy::PassThrough);
        let result = engine.create_route(origin(), one_degree_east(), standard_missile());
        match result {
            Err(TrajectoryError::FuelExhausted { required, available }) => {
                assert_eq!(available, 700.0);
                assert!(required > available);
            }
            other => panic!("expected FuelExhausted, got {:?}", other),
        }

        // 約11kmなら60秒の燃焼時間内に収まる
        let short = engine
            .create_route(origin(), Coordinates::new(0.0, 0.1, 0.0), standard_missile())
            .unwrap();
        assert!(short.remaining_fuel() > 0.0);
        assert!(!short.is_fuel_exhausted());
    }

    #[test]
    fn test_custom_gravity_and_capacity() {
        let mut config = EngineConfig::default();
        config.constants.gravity_mps2 = 1.62;
        config.waypoint_capacity = 3;
        config.first_leg_policy = FirstLegPolicy::Accounted;
        let engine = TrajectoryEngine::new(config);

        let route = engine
            .create_route(origin(), one_degree_east(), standard_missile())
            .unwrap();
        assert_eq!(route.capacity(), 3);
        let route = engine
            .append_waypoint(&route, Coordinates::new(0.1, 0.5, 0.0), 30.0)
            .unwrap();
        let omega = 20f64.to_radians();
        assert!((route.waypoints()[0].effect.g_force - 300.0 * omega / 1.62).abs() < 1e-9);
    }
}

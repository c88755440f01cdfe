use crate::models::common::*;

/// 始点・ウェイポイント・終点からなる経路のインターフェース
pub trait IRoute {
    /// 始点の取得
    fn get_start(&self) -> Coordinates;

    /// 終点の取得
    fn get_end(&self) -> Coordinates;

    /// ウェイポイント位置を通過順に取得
    fn get_waypoint_positions(&self) -> Vec<Coordinates>;

    /// 区間（始点, 終点）の列を通過順に取得
    fn legs(&self) -> Vec<(Coordinates, Coordinates)> {
        let waypoints = self.get_waypoint_positions();
        let mut points = Vec::with_capacity(waypoints.len() + 2);
        points.push(self.get_start());
        points.extend(waypoints);
        points.push(self.get_end());

        points.windows(2).map(|pair| (pair[0], pair[1])).collect()
    }
}

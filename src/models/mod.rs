// 基本的なデータ型と数学ユーティリティ
pub mod common;

// 経路の基本インターフェース（trait）定義
pub mod traits;

// 大円幾何
pub mod geo;

// ミサイル属性とウェイポイント
pub mod missile;
pub mod waypoint;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use geo::GeoMath;
pub use missile::{MissileAttributes, MissileProfile};
pub use waypoint::{LegEffect, Waypoint, WaypointInput};

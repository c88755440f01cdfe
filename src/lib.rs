//! # trajcalc
//!
//! 始点から終点までのミサイル巡航軌道を、任意のウェイポイント列を経由して計算するライブラリです。
//!
//! - [`models`]: 座標・ミサイル属性・ウェイポイントと大円幾何
//! - [`trajectory`]: 区間効果と経路全体の集計（全再計算方式）
//! - [`path_sampler`]: 描画用の経路サンプリング
//! - [`waypoint_parser`]: `lat,lon,alt,angle|...` 形式の解析
//! - [`report`]: JSON出力とコンソール要約
//! - [`scenario`]: YAMLシナリオとエンジン設定
//! - [`logging`]: tracing の初期化

pub mod error;
pub mod logging;
pub mod models;
pub mod path_sampler;
pub mod report;
pub mod scenario;
pub mod trajectory;
pub mod waypoint_parser;

pub use error::TrajectoryError;
pub use path_sampler::PathSampler;
pub use trajectory::{TrajectoryData, TrajectoryEngine};

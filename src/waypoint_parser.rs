//! ウェイポイント文字列の解析
//!
//! 書式: `lat,lon,alt,angle|lat,lon,alt,angle|...`
//!
//! 先頭から順に解析し、4つの数値として読めないレコードに出会った時点、
//! または上限数に達した時点で打ち切ります。それまでに読めた分を返します。

use crate::models::{Coordinates, WaypointInput};
use tracing::{debug, warn};

/// レコード区切り
pub const RECORD_SEPARATOR: char = '|';
/// フィールド区切り
pub const FIELD_SEPARATOR: char = ',';

/// ウェイポイント文字列を解析
///
/// # 引数
///
/// * `input` - ウェイポイント文字列
/// * `capacity` - 読み取る最大件数
///
/// # 戻り値
///
/// 通過順のウェイポイント入力列
pub fn parse_waypoints(input: &str, capacity: usize) -> Vec<WaypointInput> {
    let mut waypoints = Vec::new();
    if input.trim().is_empty() {
        return waypoints;
    }

    for (index, record) in input.split(RECORD_SEPARATOR).enumerate() {
        if waypoints.len() >= capacity {
            debug!(capacity, "WAYPOINT_PARSE_CAPACITY: 上限に達したため解析を終了します");
            break;
        }

        match parse_record(record) {
            Some(waypoint) => waypoints.push(waypoint),
            None => {
                warn!(
                    record_index = index,
                    record = %record,
                    parsed = waypoints.len(),
                    "WAYPOINT_PARSE_STOPPED: 解析できないレコードで打ち切りました"
                );
                break;
            }
        }
    }

    waypoints
}

/// 1レコードを解析（ちょうど4つの数値が必要）
fn parse_record(record: &str) -> Option<WaypointInput> {
    let fields: Vec<f64> = record
        .split(FIELD_SEPARATOR)
        .map(|field| field.trim().parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;

    match fields.as_slice() {
        [lat, lon, alt, angle] => Some(WaypointInput::new(
            Coordinates::new(*lat, *lon, *alt),
            *angle,
        )),
        _ => None,
    }
}

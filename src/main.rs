use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::str::FromStr;
use trajcalc::logging::{init_logging, parse_log_level, LogConfig, LogOutput};
use trajcalc::models::Coordinates;
use trajcalc::path_sampler::PathSampler;
use trajcalc::report::{self, TrajectoryReport};
use trajcalc::scenario::{
    EngineConfig, FirstLegPolicy, OutputConfig, RouteConfig, ScenarioConfig, ScenarioMeta,
    ValidationMode, VehicleConfig,
};
use trajcalc::trajectory::TrajectoryEngine;
use tracing::info;

/// 位置引数（順序どおり）
const POSITIONAL_NUMBERS: [(&str, &str); 8] = [
    ("start_lat", "始点の緯度（度）"),
    ("start_lon", "始点の経度（度）"),
    ("start_alt", "始点の高度（m）"),
    ("end_lat", "終点の緯度（度）"),
    ("end_lon", "終点の経度（度）"),
    ("end_alt", "終点の高度（m）"),
    ("weight", "機体重量（kg）"),
    ("speed", "巡航速度（m/s）"),
];

fn build_cli() -> Command {
    let mut command = Command::new("trajcalc")
        .version("0.1.0")
        .about("ミサイル軌道計算 (Missile Trajectory Calculator)")
        .long_about("始点から終点までの大円軌道を、ウェイポイントを経由して計算します。\n\
                     区間ごとの速度・燃料・荷重倍数と描画用の経路点をJSONで出力します。")
        .allow_negative_numbers(true)
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
                .long_help("経路とエンジン設定を記述したシナリオファイル(.yaml)を指定します。\n\
                           指定した場合、位置引数は不要です。")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .action(ArgAction::SetTrue)
                .help("容量超過・非正速度・退化区間・燃料枯渇をエラーとして扱う")
        )
        .arg(
            Arg::new("account-first-leg")
                .long("account-first-leg")
                .action(ArgAction::SetTrue)
                .help("先頭ウェイポイントの区間も合計に算入する")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("TARGET")
                .default_value("console")
                .help("ログ出力先 (console, file, both)")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)。-v より優先")
        );

    for (index, (name, help)) in POSITIONAL_NUMBERS.iter().enumerate() {
        command = command.arg(
            Arg::new(*name)
                .index(index + 1)
                .value_parser(value_parser!(f64))
                .required_unless_present("scenario")
                .help(*help),
        );
    }

    command
        .arg(
            Arg::new("output")
                .index(POSITIONAL_NUMBERS.len() + 1)
                .value_name("OUTPUT_FILE")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("scenario")
                .help("JSON出力ファイル"),
        )
        .arg(
            Arg::new("waypoints")
                .index(POSITIONAL_NUMBERS.len() + 2)
                .value_name("WAYPOINTS")
                .allow_hyphen_values(true)
                .help("ウェイポイント文字列 (lat,lon,alt,angle|lat,lon,alt,angle|...)"),
        )
}

fn main() {
    let matches = build_cli().get_matches();
    let verbose_level = matches.get_count("verbose");

    let log_config = match build_log_config(&matches, verbose_level) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = init_logging(log_config) {
        eprintln!("警告: ログ初期化に失敗しました: {}", e);
    }

    let result = load_scenario(&matches)
        .and_then(|scenario| run_scenario(scenario, matches.get_flag("info")));

    if let Err(e) = result {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

fn build_log_config(matches: &ArgMatches, verbose_level: u8) -> Result<LogConfig, String> {
    let level = matches
        .get_one::<String>("log-level")
        .map(|s| parse_log_level(s))
        .unwrap_or_else(|| LogConfig::level_from_verbosity(verbose_level));

    let output = matches
        .get_one::<String>("log-output")
        .map(|s| LogOutput::from_str(s))
        .transpose()?
        .unwrap_or(LogOutput::Console);

    Ok(LogConfig {
        level,
        output,
        ..LogConfig::default()
    })
}

/// シナリオファイルまたは位置引数からシナリオを組み立てる
fn load_scenario(matches: &ArgMatches) -> Result<ScenarioConfig, Box<dyn std::error::Error>> {
    let mut scenario = match matches.get_one::<String>("scenario") {
        Some(path) => {
            let scenario = ScenarioConfig::from_file(path)?;
            info!(path = %path, "SCENARIO_LOADED: シナリオファイルを読み込みました");
            scenario
        }
        None => scenario_from_args(matches)?,
    };

    if matches.get_flag("strict") {
        scenario.engine.mode = ValidationMode::Strict;
    }
    if matches.get_flag("account-first-leg") {
        scenario.engine.first_leg_policy = FirstLegPolicy::Accounted;
    }

    Ok(scenario)
}

fn scenario_from_args(matches: &ArgMatches) -> Result<ScenarioConfig, Box<dyn std::error::Error>> {
    let number = |name: &str| -> Result<f64, String> {
        matches
            .get_one::<f64>(name)
            .copied()
            .ok_or_else(|| format!("引数 {} が指定されていません", name))
    };

    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .ok_or("出力ファイルが指定されていません")?;

    let scenario = ScenarioConfig {
        meta: ScenarioMeta {
            name: "command-line".to_string(),
            ..ScenarioMeta::default()
        },
        engine: EngineConfig::default(),
        route: RouteConfig {
            start: Coordinates::new(number("start_lat")?, number("start_lon")?, number("start_alt")?),
            end: Coordinates::new(number("end_lat")?, number("end_lon")?, number("end_alt")?),
            vehicle: VehicleConfig::new(number("weight")?, number("speed")?),
            waypoints: Vec::new(),
            waypoint_string: matches.get_one::<String>("waypoints").cloned(),
        },
        output: OutputConfig { path: output },
    };
    scenario.validate()?;

    Ok(scenario)
}

/// シナリオの実行
fn run_scenario(scenario: ScenarioConfig, info_only: bool) -> Result<(), Box<dyn std::error::Error>> {
    if info_only {
        scenario.print_summary();
        return Ok(());
    }

    let engine = TrajectoryEngine::new(scenario.engine);
    let config = engine.config();
    let route = &scenario.route;

    let trajectory = engine.create_route(route.start, route.end, route.vehicle.to_attributes())?;
    let inputs = route.waypoint_inputs(config.waypoint_capacity);
    let trajectory = engine.append_waypoints(&trajectory, inputs)?;

    report::print_summary(&trajectory);

    let sampler = PathSampler::from_config(config);
    let path = match config.mode {
        ValidationMode::Strict => sampler.try_sample_path(&trajectory)?,
        ValidationMode::Permissive => sampler.sample_path(&trajectory),
    };

    TrajectoryReport::new(&trajectory, &path).write_json(&scenario.output.path)?;
    Ok(())
}

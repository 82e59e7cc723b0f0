use std::env;
use std::path::PathBuf;

use engine::LoopConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;
use village::{VillageConfig, VillageScene};

const CONFIG_ENV_VAR: &str = "VILLAGE_CONFIG";
const SCRIPT_ENV_VAR: &str = "VILLAGE_SCRIPT";
const SEED_ENV_VAR: &str = "VILLAGE_SEED";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: VillageScene,
    pub(crate) summary_json: bool,
}

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    config: Option<PathBuf>,
    script: Option<PathBuf>,
    seed: Option<u64>,
    seconds: Option<f32>,
    realtime: bool,
    summary_json: bool,
}

/// Returns `Ok(None)` when only help was requested.
pub(crate) fn build_app() -> Result<Option<AppWiring>, String> {
    init_tracing();
    info!("=== Village Startup ===");

    let args = env::args().skip(1).collect::<Vec<_>>();
    let Some(options) = parse_args(&args, |key| env::var(key).ok())? else {
        print_usage();
        return Ok(None);
    };

    let config = resolve_config(&options)?;
    info!(
        seed = config.sim.seed,
        target_tps = config.run.target_tps,
        realtime = config.run.realtime,
        max_seconds = ?config.run.max_seconds,
        "village_config"
    );

    let loop_config = LoopConfig {
        target_tps: config.run.target_tps,
        realtime: config.run.realtime,
        max_sim_seconds: config.run.max_seconds,
        input_script: options.script.clone(),
        ..LoopConfig::default()
    };

    Ok(Some(AppWiring {
        config: loop_config,
        scene: VillageScene::new(config.sim, config.run),
        summary_json: options.summary_json,
    }))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn resolve_config(options: &CliOptions) -> Result<VillageConfig, String> {
    let mut config = match &options.config {
        Some(path) => VillageConfig::load(path).map_err(|err| err.to_string())?,
        None => VillageConfig::default(),
    };
    if let Some(seed) = options.seed {
        config.sim.seed = seed;
    }
    if let Some(seconds) = options.seconds {
        config.run.max_seconds = Some(seconds);
    }
    if options.realtime {
        config.run.realtime = true;
    }
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

/// Flags win over their environment fallbacks. `None` means help.
fn parse_args(
    args: &[String],
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<CliOptions>, String> {
    let mut options = CliOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Ok(None),
            "--config" => {
                let value = flag_value(args, index, "--config")?;
                options.config = Some(PathBuf::from(value));
                index += 2;
            }
            "--script" => {
                let value = flag_value(args, index, "--script")?;
                options.script = Some(PathBuf::from(value));
                index += 2;
            }
            "--seed" => {
                let value = flag_value(args, index, "--seed")?;
                options.seed = Some(parse_seed(value, "--seed")?);
                index += 2;
            }
            "--seconds" => {
                let value = flag_value(args, index, "--seconds")?;
                let seconds = value
                    .parse::<f32>()
                    .map_err(|_| format!("invalid --seconds value '{value}' (expected f32)"))?;
                options.seconds = Some(seconds);
                index += 2;
            }
            "--realtime" => {
                options.realtime = true;
                index += 1;
            }
            "--summary-json" => {
                options.summary_json = true;
                index += 1;
            }
            other => return Err(format!("unknown argument '{other}'\n{}", usage_text())),
        }
    }

    if options.config.is_none() {
        options.config = env_lookup(CONFIG_ENV_VAR).map(PathBuf::from);
    }
    if options.script.is_none() {
        options.script = env_lookup(SCRIPT_ENV_VAR).map(PathBuf::from);
    }
    if options.seed.is_none() {
        if let Some(raw) = env_lookup(SEED_ENV_VAR) {
            options.seed = Some(parse_seed(&raw, SEED_ENV_VAR)?);
        }
    }
    Ok(Some(options))
}

fn flag_value<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, String> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn parse_seed(value: &str, source: &str) -> Result<u64, String> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid {source} value '{value}' (expected u64)"))
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "usage: village [options]",
        "  --config <path>     JSON config file (env VILLAGE_CONFIG)",
        "  --script <path>     input script to replay (env VILLAGE_SCRIPT)",
        "  --seed <u64>        invasion RNG seed (env VILLAGE_SEED)",
        "  --seconds <f32>     stop after this much simulated time",
        "  --realtime          pace ticks against the wall clock",
        "  --summary-json      print the run summary as JSON on exit",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parses_all_flags() {
        let options = parse_args(
            &args(&[
                "--config",
                "village.json",
                "--script",
                "run.txt",
                "--seed",
                "42",
                "--seconds",
                "12.5",
                "--realtime",
                "--summary-json",
            ]),
            no_env,
        )
        .expect("parse")
        .expect("options");
        assert_eq!(
            options,
            CliOptions {
                config: Some(PathBuf::from("village.json")),
                script: Some(PathBuf::from("run.txt")),
                seed: Some(42),
                seconds: Some(12.5),
                realtime: true,
                summary_json: true,
            }
        );
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse_args(&args(&["--seed", "1", "-h"]), no_env), Ok(None));
    }

    #[test]
    fn env_fills_missing_flags_only() {
        let env = HashMap::from([
            (CONFIG_ENV_VAR, "from_env.json"),
            (SEED_ENV_VAR, "9"),
            (SCRIPT_ENV_VAR, "env_script.txt"),
        ]);
        let lookup = |key: &str| env.get(key).map(ToString::to_string);
        let options = parse_args(&args(&["--seed", "3"]), lookup)
            .expect("parse")
            .expect("options");
        assert_eq!(options.config, Some(PathBuf::from("from_env.json")));
        assert_eq!(options.script, Some(PathBuf::from("env_script.txt")));
        assert_eq!(options.seed, Some(3));
    }

    #[test]
    fn rejects_bad_values_and_unknown_flags() {
        assert_eq!(
            parse_args(&args(&["--seed"]), no_env),
            Err("missing value for --seed".to_string())
        );
        assert!(parse_args(&args(&["--seconds", "soon"]), no_env)
            .expect_err("bad seconds")
            .contains("--seconds"));
        assert!(parse_args(&args(&["--fast"]), no_env)
            .expect_err("unknown")
            .starts_with("unknown argument '--fast'"));
        let env = |_: &str| Some("abc".to_string());
        assert!(parse_args(&[], env)
            .expect_err("bad env seed")
            .contains(SEED_ENV_VAR));
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let options = CliOptions {
            seed: Some(77),
            seconds: Some(30.0),
            realtime: true,
            ..CliOptions::default()
        };
        let config = resolve_config(&options).expect("config");
        assert_eq!(config.sim.seed, 77);
        assert_eq!(config.run.max_seconds, Some(30.0));
        assert!(config.run.realtime);
    }

    #[test]
    fn non_positive_seconds_are_rejected() {
        let options = CliOptions {
            seconds: Some(0.0),
            ..CliOptions::default()
        };
        assert!(resolve_config(&options).is_err());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("village.json");
        std::fs::write(&path, r#"{ "sim": { "seed": 5 }, "run": { "target_tps": 30 } }"#)
            .expect("write");
        let options = CliOptions {
            config: Some(path),
            ..CliOptions::default()
        };
        let config = resolve_config(&options).expect("config");
        assert_eq!(config.sim.seed, 5);
        assert_eq!(config.run.target_tps, 30);
    }
}

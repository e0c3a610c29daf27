//! File logging: an application log plus a separate audit log of every
//! mutation (`mongoba::audit` target).

use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

pub const AUDIT_TARGET: &str = "mongoba::audit";
pub const DEFAULT_RETENTION: u32 = 7;
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";

/// `<local data dir>/mongoba/logs`, falling back to `./mongoba_logs`.
#[must_use]
pub fn default_log_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|d| d.join("mongoba").join("logs"))
        .unwrap_or_else(|| PathBuf::from("mongoba_logs"))
}

#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(dir: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder().build(&format!("{}", dir.join(format!("{stem}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    Ok(RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(dir.join(format!("{stem}.log")), Box::new(policy))?)
}

/// Build the log4rs config for `dir` without installing it.
///
/// # Errors
/// Returns an error if the directory or the appenders cannot be created.
pub fn build_config(dir: &Path, level: LevelFilter, retention: u32) -> Result<Config, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let app = rolling(dir, "mongoba", retention)?;
    let audit = rolling(dir, "mongoba_audit", retention)?;
    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(app)))
        .appender(Appender::builder().build("audit", Box::new(audit)))
        .logger(Logger::builder().appender("audit").additive(false).build(AUDIT_TARGET, LevelFilter::Info))
        .build(Root::builder().appender("app").build(level))?;
    Ok(config)
}

/// Configure logging for the process.
/// - dir: base directory for logs; defaults to [`default_log_dir`]
/// - level: off|error|warn|info|debug|trace (default info)
/// - retention: rolled files to keep (default 7)
///
/// # Errors
/// Returns an error if the logger cannot be set up; callers may carry on without it.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<u32>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base = dir.map_or_else(default_log_dir, Path::to_path_buf);
    let config = build_config(&base, parse_level(level), retention.unwrap_or(DEFAULT_RETENTION))?;
    log4rs::init_config(config)?;
    Ok(base)
}

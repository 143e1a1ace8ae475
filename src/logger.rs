//! Process-wide `log` backend.
//!
//! On Lambda each record is written as one JSON object per line, tagged with
//! the function name and a per-instance id so the lines of one warm container
//! can be told apart in CloudWatch. The dev server prints coloured lines.

use chrono::Local;
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::env;
use std::io::{self, Write};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

static WIZARDY_LOGGER: Lazy<WizardyLogger> = Lazy::new(WizardyLogger::default);

/// Identifies this process for as long as the execution environment is reused.
static INSTANCE_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let level = config.level;
    WIZARDY_LOGGER.update_config(config);

    log::set_logger(&*WIZARDY_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(level);
    Ok(())
}

pub fn instance_id() -> &'static str {
    &INSTANCE_ID
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LevelFilter,
    pub format: LogFormat,
    pub colors: bool,
    pub function: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::lambda()
    }
}

impl LoggerConfig {
    pub fn lambda() -> Self {
        Self {
            level: LevelFilter::Info,
            format: LogFormat::Json,
            colors: false,
            function: None,
        }
    }

    pub fn development() -> Self {
        Self {
            level: LevelFilter::Debug,
            format: LogFormat::Pretty,
            colors: true,
            function: None,
        }
    }

    /// The Lambda preset adjusted by `LOG_LEVEL` and `LOG_FORMAT=pretty`.
    pub fn from_env() -> Self {
        let mut config = Self::lambda();
        if let Some(level) = env::var("LOG_LEVEL").ok().and_then(|v| v.trim().parse().ok()) {
            config.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            if format.eq_ignore_ascii_case("pretty") {
                config.format = LogFormat::Pretty;
            }
        }
        config
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn with_function(mut self, name: impl Into<String>) -> Self {
        self.function = Some(name.into());
        self
    }
}

#[derive(Serialize)]
struct JsonLine<'a> {
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    function: Option<&'a str>,
    instance: &'a str,
    target: &'a str,
    message: String,
}

fn level_emoji(level: Level) -> &'static str {
    match level {
        Level::Error => "❌",
        Level::Warn => "⚠️",
        Level::Info => "💡",
        Level::Debug => "🐛",
        Level::Trace => "🔍",
    }
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::Cyan,
    }
}

fn json_line(config: &LoggerConfig, record: &Record) -> String {
    let line = JsonLine {
        level: record.level().as_str(),
        function: config.function.as_deref(),
        instance: instance_id(),
        target: record.target(),
        message: record.args().to_string(),
    };
    serde_json::to_string(&line).unwrap_or_default()
}

fn pretty_line(config: &LoggerConfig, record: &Record, time: &str) -> String {
    let level = format!("{} {:<5}", level_emoji(record.level()), record.level());
    let function = config
        .function
        .as_deref()
        .map(|name| format!("[{}] ", name))
        .unwrap_or_default();

    if config.colors {
        format!(
            "{} {}[{}] {}: {}",
            time.bright_black(),
            function.bright_white().bold(),
            level.color(level_color(record.level())).bold(),
            record.target().bright_blue(),
            record.args()
        )
    } else {
        format!(
            "{} {}[{}] {}: {}",
            time,
            function,
            level,
            record.target(),
            record.args()
        )
    }
}

pub struct WizardyLogger {
    config: RwLock<LoggerConfig>,
}

impl Default for WizardyLogger {
    fn default() -> Self {
        Self {
            config: RwLock::new(LoggerConfig::default()),
        }
    }
}

impl WizardyLogger {
    pub fn update_config(&self, new_config: LoggerConfig) {
        if let Ok(mut config) = self.config.write() {
            *config = new_config;
        }
    }
}

impl log::Log for WizardyLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.read() {
            Ok(config) => metadata.level() <= config.level,
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        let Ok(config) = self.config.read() else {
            return;
        };
        if record.level() > config.level {
            return;
        }

        let line = match config.format {
            LogFormat::Json => json_line(&config, record),
            LogFormat::Pretty => {
                let time = Local::now().format("%H:%M:%S%.3f").to_string();
                pretty_line(&config, record, &time)
            }
        };
        println!("{}", line);
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Logs how long a remote call took once it goes out of scope.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting timer: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  {} completed in {}ms",
            self.name,
            self.elapsed().as_millis()
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

/// Logs which project, region and models a cold instance was configured with.
pub fn log_config_info(config: &crate::config::Config) {
    log::info!("⚙️  Configuration loaded (instance {})", instance_id());
    log::info!(
        "   Project: {}",
        config.vertex.project_id.as_deref().unwrap_or("<unset>")
    );
    log::info!(
        "   Location: {}",
        config.vertex.location.as_deref().unwrap_or("<unset>")
    );
    log::info!(
        "   Credentials: s3://{}/{}",
        config.credentials.bucket,
        config.credentials.object_key
    );
    log::info!(
        "   Models: text={} image={} caption={} vision={}",
        config.models.text_model,
        config.models.image_model,
        config.models.caption_model,
        config.models.vision_model
    );
}

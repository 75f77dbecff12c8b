//! Process configuration merged from defaults, a JSON config file,
//! environment variables, and CLI flags, in that order of precedence.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_WIDTH: u32 = 720;
pub const DEFAULT_HEIGHT: u32 = 480;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::Debug,
            Self::Info => LevelFilter::Info,
            Self::Warn => LevelFilter::Warn,
            Self::Error => LevelFilter::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::InvalidLogLevel(other.to_string())),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "explorer", version, about = "Interactive Mandelbrot/Julia explorer")]
pub struct Cli {
    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<LogLevel>,

    /// Initial window width
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height
    #[arg(long)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub log_level: LogLevel,
    pub width: u32,
    pub height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroDimension { name: "width" });
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroDimension { name: "height" });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    InvalidLogLevel(String),
    InvalidNumber { name: &'static str, value: String },
    ZeroDimension { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {}", err),
            Self::Parse(err) => write!(f, "failed to parse config: {}", err),
            Self::InvalidLogLevel(value) => write!(f, "invalid log level: {}", value),
            Self::InvalidNumber { name, value } => {
                write!(f, "invalid value for {}: {}", name, value)
            }
            Self::ZeroDimension { name } => write!(f, "{} must be non-zero", name),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// Loads configuration using the process environment for overrides.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    load_with_env(cli, |name| std::env::var(name).ok())
}

/// Loads configuration with an injected environment lookup, so callers
/// (and tests) control the override source.
///
/// A missing config file falls back to defaults; any other read or parse
/// failure is an error, as is a merged result that fails validation.
pub fn load_with_env(
    cli: &Cli,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let mut config = match fs::read(&cli.config) {
        Ok(data) => serde_json::from_slice(&data).map_err(ConfigError::Parse)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Config::default(),
        Err(err) => return Err(ConfigError::Io(err)),
    };

    apply_env(&mut config, lookup)?;
    apply_flags(&mut config, cli);
    config.validate()?;

    Ok(config)
}

fn apply_env(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(value) = lookup("LOG_LEVEL") {
        config.log_level = value.parse()?;
    }
    if let Some(value) = lookup("WIDTH") {
        config.width = parse_number("WIDTH", &value)?;
    }
    if let Some(value) = lookup("HEIGHT") {
        config.height = parse_number("HEIGHT", &value)?;
    }
    Ok(())
}

fn apply_flags(config: &mut Config, cli: &Cli) {
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

/*
 *  config.rs
 *
 *  wxoled - weather at a glance
 *	(c) 2025-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::scheduler::{FetchPolicy, Preset};
use crate::weather::{WeatherRequest, DEFAULT_API_BASE, FETCH_TIMEOUT};

pub const DEFAULT_LANG: &str = "de";
const REDACTED: &str = "********";
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 6 * 60 * 60;
pub const DEFAULT_IDLE_SLEEP_SECS: u64 = 10;
pub const DEFAULT_ICON_DIR: &str = "./icons";
pub const DEFAULT_DISPLAY_WIDTH: u32 = 128;
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 64;
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. Every field is optional so layers can be merged;
/// the accessors fill in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub lang: Option<String>,
    pub preset: Option<Preset>,
    pub fetch_interval_secs: Option<u64>,
    pub retry_after_failure_secs: Option<u64>,
    pub idle_sleep_secs: Option<u64>,
    pub icon_dir: Option<PathBuf>,
    /// display-specific geometry & behavior
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    pub driver: Option<DriverKind>, // <- strongly-typed driver selection
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rotate_deg: Option<u16>,
    pub brightness: Option<u8>,     // 0-255
    pub bus: Option<BusConfig>,     // <- i2c wiring
    /// mock driver only: dump every frame here as PBM
    pub frames_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BusConfig {
    I2c {
        bus: String,        // e.g. "/dev/i2c-1"
        address: u8,        // e.g. 0x3C (I2C addresses are 7-bit, stored in u8)
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Ssd1306,
    Mock,
}

impl DisplayConfig {
    pub fn driver(&self) -> DriverKind {
        self.driver.unwrap_or(DriverKind::Ssd1306)
    }

    pub fn width(&self) -> u32 {
        self.width.unwrap_or(DEFAULT_DISPLAY_WIDTH)
    }

    pub fn height(&self) -> u32 {
        self.height.unwrap_or(DEFAULT_DISPLAY_HEIGHT)
    }

    pub fn bus(&self) -> BusConfig {
        self.bus.clone().unwrap_or_else(|| BusConfig::I2c {
            bus: DEFAULT_I2C_BUS.to_string(),
            address: DEFAULT_I2C_ADDRESS,
        })
    }
}

impl Config {
    pub fn preset(&self) -> Preset {
        self.preset.unwrap_or_default()
    }

    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or(DEFAULT_LANG)
    }

    pub fn icon_dir(&self) -> PathBuf {
        self.icon_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_ICON_DIR))
    }

    pub fn idle_sleep(&self) -> Duration {
        Duration::from_secs(self.idle_sleep_secs.unwrap_or(DEFAULT_IDLE_SLEEP_SECS))
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            interval: Duration::from_secs(self.fetch_interval_secs.unwrap_or(DEFAULT_FETCH_INTERVAL_SECS)),
            retry_after_failure: self.retry_after_failure_secs.map(Duration::from_secs),
        }
    }

    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Config {
        let mut cfg = self.clone();
        if cfg.api_key.is_some() {
            cfg.api_key = Some(REDACTED.to_string());
        }
        cfg
    }

    pub fn display(&self) -> DisplayConfig {
        self.display.clone().unwrap_or_default()
    }

    /// Request settings for the weather client; call after [`validate`].
    pub fn weather_request(&self) -> Result<WeatherRequest, ConfigError> {
        let missing = |what: &str| ConfigError::Validation(format!("{what} is required"));
        Ok(WeatherRequest {
            api_base: self.api_base.clone().unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            endpoint: self.preset().endpoint(),
            api_key: self.api_key.clone().ok_or_else(|| missing("api_key"))?,
            latitude: self.latitude.ok_or_else(|| missing("latitude"))?,
            longitude: self.longitude.ok_or_else(|| missing("longitude"))?,
            lang: self.lang().to_string(),
            timeout: FETCH_TIMEOUT,
        })
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML;
/// the weather settings can also come from the environment.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "wxoled", version, about = "Weather and clock on a small OLED")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// OpenWeatherMap API key
    #[arg(long, env = "OWM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long = "lat", env = "WX_LAT", allow_negative_numbers = true)]
    pub latitude: Option<f64>,
    #[arg(long = "lon", env = "WX_LON", allow_negative_numbers = true)]
    pub longitude: Option<f64>,
    /// Language for weather descriptions
    #[arg(long, env = "WX_LANG")]
    pub lang: Option<String>,
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub icons: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,
    /// I2C device, e.g. /dev/i2c-1
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub i2c_bus: Option<String>,
    /// Write every frame as PBM into this directory (mock driver)
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub frames: Option<PathBuf>,
    /// Debug logging
    #[arg(short = 'v', long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,
    /// One fetch and one pass through the screens, then exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub once: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: read YAML, layer the CLI/env values on top, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) environment + CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/wxoled/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/wxoled/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/wxoled.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["wxoled.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

pub fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
pub fn merge(dst: &mut Config, src: Config) {
    if src.api_key.is_some()                  { dst.api_key = src.api_key; }
    if src.api_base.is_some()                 { dst.api_base = src.api_base; }
    if src.latitude.is_some()                 { dst.latitude = src.latitude; }
    if src.longitude.is_some()                { dst.longitude = src.longitude; }
    if src.lang.is_some()                     { dst.lang = src.lang; }
    if src.preset.is_some()                   { dst.preset = src.preset; }
    if src.fetch_interval_secs.is_some()      { dst.fetch_interval_secs = src.fetch_interval_secs; }
    if src.retry_after_failure_secs.is_some() { dst.retry_after_failure_secs = src.retry_after_failure_secs; }
    if src.idle_sleep_secs.is_some()          { dst.idle_sleep_secs = src.idle_sleep_secs; }
    if src.icon_dir.is_some()                 { dst.icon_dir = src.icon_dir; }
    // display
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.driver.is_some()      { dst.driver = src.driver; }
    if src.width.is_some()       { dst.width = src.width; }
    if src.height.is_some()      { dst.height = src.height; }
    if src.rotate_deg.is_some()  { dst.rotate_deg = src.rotate_deg; }
    if src.brightness.is_some()  { dst.brightness = src.brightness; }
    if src.bus.is_some()         { dst.bus = src.bus; }
    if src.frames_dir.is_some()  { dst.frames_dir = src.frames_dir; }
}

pub fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.api_key.is_some()    { cfg.api_key = cli.api_key.clone(); }
    if cli.latitude.is_some()   { cfg.latitude = cli.latitude; }
    if cli.longitude.is_some()  { cfg.longitude = cli.longitude; }
    if cli.lang.is_some()       { cfg.lang = cli.lang.clone(); }
    if cli.preset.is_some()     { cfg.preset = cli.preset; }
    if cli.icons.is_some()      { cfg.icon_dir = cli.icons.clone(); }

    let any_display = cli.driver.is_some() || cli.i2c_bus.is_some() || cli.frames.is_some();
    if any_display && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.driver.is_some()  { display.driver = cli.driver; }
        if cli.frames.is_some()  { display.frames_dir = cli.frames.clone(); }
        if let Some(bus) = cli.i2c_bus.as_ref() {
            let address = match &display.bus {
                Some(BusConfig::I2c { address, .. }) => *address,
                None => DEFAULT_I2C_ADDRESS,
            };
            display.bus = Some(BusConfig::I2c { bus: bus.clone(), address });
        }
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

/// Required fields and ranges, checked before anything touches the panel.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    match cfg.api_key.as_deref().map(str::trim) {
        None | Some("") => return Err(invalid("api_key is required (config, OWM_API_KEY or --api-key)")),
        _ => {}
    }
    match cfg.latitude {
        None => return Err(invalid("latitude is required (config, WX_LAT or --lat)")),
        Some(lat) if !(-90.0..=90.0).contains(&lat) => {
            return Err(invalid(format!("latitude {lat} outside -90..=90")));
        }
        _ => {}
    }
    match cfg.longitude {
        None => return Err(invalid("longitude is required (config, WX_LON or --lon)")),
        Some(lon) if !(-180.0..=180.0).contains(&lon) => {
            return Err(invalid(format!("longitude {lon} outside -180..=180")));
        }
        _ => {}
    }
    if cfg.lang().trim().is_empty() {
        return Err(invalid("lang must not be empty"));
    }
    for (name, value) in [
        ("fetch_interval_secs", cfg.fetch_interval_secs),
        ("retry_after_failure_secs", cfg.retry_after_failure_secs),
        ("idle_sleep_secs", cfg.idle_sleep_secs),
    ] {
        if value == Some(0) {
            return Err(invalid(format!("{name} must be > 0")));
        }
    }
    if let Some(base) = cfg.api_base.as_deref() {
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(invalid(format!("api_base {base:?} must be an http(s) URL")));
        }
    }
    if let Some(display) = cfg.display.as_ref() {
        if display.width() == 0 || display.height() == 0 {
            return Err(invalid("display width/height must be > 0"));
        }
        if let Some(rot) = display.rotate_deg {
            match rot {
                // layouts are landscape only
                0 | 180 => {},
                _ => return Err(invalid("display rotate_deg must be 0|180")),
            }
        }
        if display.frames_dir.is_some() && display.driver() != DriverKind::Mock {
            return Err(invalid("frames capture needs the mock driver"));
        }
    }
    Ok(())
}

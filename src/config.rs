//! Storefront configuration: defaults, JSON file and environment overrides.

use std::path::{Path, PathBuf};

use rapier2d::prelude::Real;
use serde::{Deserialize, Serialize};

use crate::physics::{
    BodyParams, DEFAULT_GRAVITY, FIXED_TIME_STEP, MAX_SUBSTEPS, POINTER_DAMPING, POINTER_STIFFNESS,
};
use crate::viewport::{Breakpoint, DEFAULT_MOBILE_BREAKPOINT};

pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CONFIG";
pub const SEED_ENV: &str = "STOREFRONT_SEED";
pub const DATA_DIR_ENV: &str = "STOREFRONT_DATA_DIR";
pub const DEFAULT_CART_KEY: &str = "coral_cookies_cart";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in m/s^2.
    pub gravity: Real,
    pub cookie: BodyParams,
    pub fixed_timestep: Real,
    pub max_substeps: u32,
    pub pointer_stiffness: Real,
    pub pointer_damping: Real,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            cookie: BodyParams::default(),
            fixed_timestep: FIXED_TIME_STEP,
            max_substeps: MAX_SUBSTEPS,
            pointer_stiffness: POINTER_STIFFNESS,
            pointer_damping: POINTER_DAMPING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub mobile_breakpoint: f32,
    pub cookie_radius_desktop: f32,
    pub cookie_radius_mobile: f32,
    /// Height of the band above the viewport that cookies spawn in.
    pub spawn_band: f32,
    pub resize_debounce_secs: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            cookie_radius_desktop: 48.0,
            cookie_radius_mobile: 32.0,
            spawn_band: 500.0,
            resize_debounce_secs: 0.25,
        }
    }
}

impl LayoutConfig {
    pub fn cookie_radius(&self, breakpoint: Breakpoint) -> f32 {
        match breakpoint {
            Breakpoint::Desktop => self.cookie_radius_desktop,
            Breakpoint::Mobile => self.cookie_radius_mobile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    pub storage_key: String,
    pub notification_secs: f64,
    pub open_delay_secs: f64,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_CART_KEY.to_string(),
            notification_secs: 3.0,
            open_delay_secs: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub rows: usize,
    pub cols: usize,
    pub tile_duration: f32,
    pub cover_stagger: f32,
    pub reveal_stagger: f32,
    pub reveal_delay: f32,
    pub cover_scale: f32,
    pub overshoot: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 8,
            tile_duration: 0.6,
            cover_stagger: 0.4,
            reveal_stagger: 0.3,
            reveal_delay: 0.1,
            cover_scale: 1.5,
            overshoot: 1.2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub physics: PhysicsConfig,
    pub layout: LayoutConfig,
    pub cart: CartConfig,
    pub transition: TransitionConfig,
    pub seed: Option<u64>,
    pub data_dir: Option<PathBuf>,
}

impl StorefrontConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `STOREFRONT_CONFIG`: JSON file; defaults when absent
    /// - `STOREFRONT_SEED`: RNG seed for spawning and scatter
    /// - `STOREFRONT_DATA_DIR`: directory for the cart store
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        if let Ok(raw) = std::env::var(SEED_ENV) {
            config.seed = Some(parse_seed(&raw)?);
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Directory for durable storage: the configured one, else the platform data dir.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("cookie-shelf")
        })
    }
}

fn parse_seed(raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
        var: SEED_ENV,
        value: raw.to_string(),
    })
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// Kind of pin board the database pin is read from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BoardKind {
    /// Hosted board (Posit Connect style content API)
    #[default]
    Connect,
    /// Local folder board, mainly for development and tests
    Folder,
}

impl std::fmt::Display for BoardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for BoardKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "connect" => Ok(Self::Connect),
            "folder" => Ok(Self::Folder),
            _ => Err(format!(
                "Invalid board kind: '{}'. Valid: connect, folder",
                s
            )),
        }
    }
}

/// Static configuration, loaded from TOML at startup
///
/// - server: bind address, port, worker count
/// - pins: pin board and the database pin
/// - lims: Clarity LIMS API used for reagent lots
/// - logging: log level, format and file output
/// - brand: stylesheet branding
/// - deploy: deploy-mode flag and manifest generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pins: PinsConfig,
    #[serde(default)]
    pub lims: LimsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub brand: BrandSettings,
    #[serde(default)]
    pub deploy: DeployConfig,
}

/// Legacy credential variables understood besides the `LIMS__` prefix
pub const LEGACY_ENV_VARS: [&str; 5] = [
    "POSIT_API_KEY",
    "POSIT_SERVER_URL",
    "CLARITY_API_URL",
    "CLARITY_API_USERNAME",
    "CLARITY_API_PASSWORD",
];

impl StaticConfig {
    /// Load configuration from the TOML file and environment
    ///
    /// Priority: legacy credential env > `LIMS__` env > config file > defaults
    /// Example: `LIMS__SERVER__PORT=9999`
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LIMS")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut loaded = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        };

        loaded.apply_legacy_env(|key| std::env::var(key).ok());
        loaded
    }

    /// Overlay the credential variables the hosting platform injects.
    ///
    /// Empty values are ignored so an unset secret never clears a value
    /// coming from the config file.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("POSIT_API_KEY") {
            self.pins.api_key = Some(v);
        }
        if let Some(v) = get("POSIT_SERVER_URL") {
            self.pins.server_url = Some(v);
        }
        if let Some(v) = get("CLARITY_API_URL") {
            self.lims.api_url = v;
        }
        if let Some(v) = get("CLARITY_API_USERNAME") {
            self.lims.username = v;
        }
        if let Some(v) = get("CLARITY_API_PASSWORD") {
            self.lims.password = v;
        }
    }

    /// Sample TOML configuration
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// Write the configuration as TOML
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// Pin board settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinsConfig {
    #[serde(default)]
    pub board: BoardKind,
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Root directory when `board = "folder"`
    #[serde(default = "default_pins_folder")]
    pub folder: String,
    #[serde(default = "default_db_pin")]
    pub db_pin: String,
    /// Pin a specific version instead of following the latest
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "default_pins_timeout")]
    pub timeout_secs: u64,
}

/// Clarity LIMS settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimsConfig {
    #[serde(default = "default_lims_api_url")]
    pub api_url: String,
    /// Base URL of the Clarity web UI, used for work-complete links
    #[serde(default = "default_lims_ui_url")]
    pub ui_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Last used number per naming key (`prep`, `index_A` ...)
    #[serde(default = "default_sequence_numbers")]
    pub sequence_numbers: BTreeMap<String, u32>,
    #[serde(default = "default_status_cache_secs")]
    pub status_cache_secs: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// Branding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandSettings {
    #[serde(default = "default_brand_path")]
    pub path: String,
    #[serde(default = "default_app_title")]
    pub title: String,
}

/// Deployment settings consumed by `limsmeta deploy`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default = "default_mode_file")]
    pub mode_file: String,
    #[serde(default = "default_appmode")]
    pub appmode: String,
    #[serde(default = "default_entrypoint")]
    pub entrypoint: String,
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,
    #[serde(default = "default_cargo_lock")]
    pub cargo_lock: String,
    #[serde(default = "default_lock_output")]
    pub lock_output: String,
    /// Files listed with checksums in the manifest
    #[serde(default = "default_manifest_files")]
    pub files: Vec<String>,
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_pins_folder() -> String {
    "pins".to_string()
}

fn default_db_pin() -> String {
    "vi2172/clarity_lims_sqlite".to_string()
}

fn default_cache_dir() -> String {
    "cache/pins".to_string()
}

fn default_pins_timeout() -> u64 {
    60
}

fn default_lims_api_url() -> String {
    "https://nvi-test.claritylims.com/api/v2".to_string()
}

fn default_lims_ui_url() -> String {
    "https://nvi-prod.claritylims.com/clarity".to_string()
}

pub fn default_sequence_numbers() -> BTreeMap<String, u32> {
    BTreeMap::from([
        ("prep".to_string(), 28),
        ("index_A".to_string(), 62),
        ("index_B".to_string(), 45),
        ("index_C".to_string(), 38),
        ("index_D".to_string(), 41),
    ])
}

fn default_status_cache_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_brand_path() -> String {
    "assets/brand.yml".to_string()
}

fn default_app_title() -> String {
    "LIMS Metadata App".to_string()
}

fn default_mode_file() -> String {
    "deploy_mode.txt".to_string()
}

fn default_appmode() -> String {
    "rust-actix".to_string()
}

fn default_entrypoint() -> String {
    "limsmeta".to_string()
}

fn default_manifest_path() -> String {
    "manifest.json".to_string()
}

fn default_cargo_lock() -> String {
    "Cargo.lock".to_string()
}

fn default_lock_output() -> String {
    "dependencies.txt".to_string()
}

fn default_manifest_files() -> Vec<String> {
    vec![
        "Cargo.toml".to_string(),
        "Cargo.lock".to_string(),
        "dependencies.txt".to_string(),
        "assets/styles.css".to_string(),
        "assets/brand.yml".to_string(),
    ]
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_commit_message() -> String {
    "Update deployment manifest".to_string()
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for PinsConfig {
    fn default() -> Self {
        Self {
            board: BoardKind::default(),
            server_url: None,
            api_key: None,
            folder: default_pins_folder(),
            db_pin: default_db_pin(),
            version: None,
            cache_dir: default_cache_dir(),
            timeout_secs: default_pins_timeout(),
        }
    }
}

impl Default for LimsConfig {
    fn default() -> Self {
        Self {
            api_url: default_lims_api_url(),
            ui_url: default_lims_ui_url(),
            username: String::new(),
            password: String::new(),
            sequence_numbers: default_sequence_numbers(),
            status_cache_secs: default_status_cache_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for BrandSettings {
    fn default() -> Self {
        Self {
            path: default_brand_path(),
            title: default_app_title(),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            mode_file: default_mode_file(),
            appmode: default_appmode(),
            entrypoint: default_entrypoint(),
            manifest_path: default_manifest_path(),
            cargo_lock: default_cargo_lock(),
            lock_output: default_lock_output(),
            files: default_manifest_files(),
            remote: default_remote(),
            commit_message: default_commit_message(),
        }
    }
}

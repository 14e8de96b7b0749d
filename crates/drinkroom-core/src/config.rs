use crate::error::{Result, RoomError};
use crate::order::OrderLimits;
use crate::paths;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub username: String,
    /// bcrypt hash of the password (`drinkroom admin hash-password`).
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Signing key for operator tokens. `DRINKROOM_TOKEN_SECRET` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_secret: Option<String>,
    #[serde(default = "default_ttl_hours")]
    pub token_ttl_hours: u32,
    #[serde(default)]
    pub operators: Vec<OperatorConfig>,
}

fn default_ttl_hours() -> u32 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            token_ttl_hours: default_ttl_hours(),
            operators: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    #[serde(default = "default_region")]
    pub default_region: String,
    /// Minutes east of UTC that define the local calendar day.
    #[serde(default = "default_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub limits: OrderLimits,
}

fn default_region() -> String {
    "大安區".to_string()
}

fn default_offset_minutes() -> i32 {
    480
}

impl Default for Config {
    fn default() -> Self {
        Self::new(default_region())
    }
}

impl Config {
    pub fn new(default_region: impl Into<String>) -> Self {
        Self {
            version: 1,
            default_region: default_region.into(),
            utc_offset_minutes: default_offset_minutes(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            limits: OrderLimits::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(RoomError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// The configured offset as a chrono `FixedOffset`.
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                RoomError::Validation(format!(
                    "utc_offset_minutes {} is out of range",
                    self.utc_offset_minutes
                ))
            })
    }

    pub fn operator(&self, username: &str) -> Option<&OperatorConfig> {
        self.auth.operators.iter().find(|o| o.username == username)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.default_region.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "default_region must not be blank".to_string(),
            });
        }

        if self.offset().is_err() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "utc_offset_minutes {} must be within ±1439",
                    self.utc_offset_minutes
                ),
            });
        }

        if self.auth.operators.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no operators configured; reset and catalog writes are unreachable"
                    .to_string(),
            });
        }

        for op in &self.auth.operators {
            if op.username.trim().is_empty() || op.password_hash.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "operator entries need both username and password_hash".to_string(),
                });
            } else if !op.password_hash.trim().starts_with("$2") {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!(
                        "operator '{}' password_hash is not a bcrypt hash; \
                         regenerate it with `drinkroom admin hash-password`",
                        op.username
                    ),
                });
            }
        }

        if self.auth.token_secret.is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "auth.token_secret not set; set DRINKROOM_TOKEN_SECRET or a random \
                          secret is generated at startup"
                    .to_string(),
            });
        }

        if self.auth.token_ttl_hours == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "auth.token_ttl_hours must be at least 1".to_string(),
            });
        }

        if self.limits.max_toppings == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "limits.max_toppings is 0; orders cannot carry toppings".to_string(),
            });
        }

        warnings
    }
}

//! Application configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment variable and
//! command-line overrides. The configuration file path defaults to `config.yaml` but can be
//! specified via `-f` flag or `FILESVC_CONFIG` environment variable. A missing file is not an
//! error; every field has a default except `upload_dir`, which must be provided somewhere.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `FILESVC_` override YAML values
//! 3. **`--upload-dir`** - Command-line flag, overrides `upload_dir` if given
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `FILESVC_LIMITS__MAX_UPLOAD_SIZE=1048576` sets the `limits.max_upload_size` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use filesvc::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Serving {:?} on {}", config.upload_dir, config.bind_address());
//! # Ok(())
//! # }
//! ```
//!
//! ## Example
//!
//! ```yaml
//! host: 127.0.0.1
//! port: 5000
//! upload_dir: /srv/files
//! limits:
//!   max_upload_size: 10485760
//! uploads:
//!   atomic_writes: true
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::Error;

/// CLI args - the config file, plus a direct override for the upload directory
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "FILESVC_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Directory to list, upload into, and download from.
    /// Takes precedence over the config file and `FILESVC_UPLOAD_DIR`.
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Root directory for listing, upload destination and download source. Required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_dir: Option<PathBuf>,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
    /// Resource limits
    pub limits: LimitsConfig,
    /// How uploads are written to disk
    pub uploads: UploadsConfig,
}

/// Resource limits for protecting the host.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum size in bytes of an uploaded file. The request body may exceed this by
    /// [`MULTIPART_OVERHEAD`] to leave room for multipart boundaries and part headers.
    /// Set to 0 for unlimited (not recommended for production).
    /// Default: 100MB
    pub max_upload_size: usize,
}

/// Headroom allowed on top of `max_upload_size` for the multipart framing around the file
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

impl LimitsConfig {
    /// Request body limit for the upload route, or `None` when uploads are unlimited
    pub fn upload_body_limit(&self) -> Option<usize> {
        match self.max_upload_size {
            0 => None,
            max => Some(max.saturating_add(MULTIPART_OVERHEAD)),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 100 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Write each upload to a hidden staging file and rename it into place once complete.
    /// When false, uploads are written directly to their final path and concurrent readers
    /// may observe a partially written file.
    pub atomic_writes: bool,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self { atomic_writes: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            upload_dir: None,
            enable_otel_export: false,
            limits: LimitsConfig::default(),
            uploads: UploadsConfig::default(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        match &self.upload_dir {
            None => {
                return Err(Error::Internal {
                    operation: "Config validation: upload_dir is not configured. \
                     Please set FILESVC_UPLOAD_DIR, pass --upload-dir, or add upload_dir to the config file."
                        .to_string(),
                });
            }
            Some(dir) if dir.as_os_str().is_empty() => {
                return Err(Error::Internal {
                    operation: "Config validation: upload_dir cannot be empty".to_string(),
                });
            }
            Some(_) => {}
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        let figment = Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values. FILESVC_CONFIG names the file
            // itself and is not a config field.
            .merge(Env::prefixed("FILESVC_").split("__").ignore(&["config"]));

        match &args.upload_dir {
            Some(dir) => figment.merge(Serialized::default("upload_dir", dir)),
            None => figment,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args(config: &str) -> Args {
        Args {
            config: config.to_string(),
            upload_dir: None,
            validate: false,
        }
    }

    #[test]
    fn test_yaml_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
host: 127.0.0.1
port: 8080
upload_dir: /srv/files
limits:
  max_upload_size: 2048
uploads:
  atomic_writes: false
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 8080);
            assert_eq!(config.upload_dir, Some(PathBuf::from("/srv/files")));
            assert_eq!(config.limits.max_upload_size, 2048);
            assert!(!config.uploads.atomic_writes);
            assert_eq!(config.bind_address(), "127.0.0.1:8080");

            Ok(())
        });
    }

    #[test]
    fn test_defaults_when_file_missing() {
        Jail::expect_with(|jail| {
            jail.set_env("FILESVC_UPLOAD_DIR", "/data");

            let config = Config::load(&args("does-not-exist.yaml"))?;

            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 5000);
            assert_eq!(config.upload_dir, Some(PathBuf::from("/data")));
            assert_eq!(config.limits.max_upload_size, 100 * 1024 * 1024);
            assert!(config.uploads.atomic_writes);
            assert!(!config.enable_otel_export);

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
upload_dir: /from/yaml
port: 7000
"#,
            )?;

            jail.set_env("FILESVC_HOST", "127.0.0.1");
            jail.set_env("FILESVC_UPLOAD_DIR", "/from/env");

            let config = Config::load(&args("test.yaml"))?;

            // Env vars should override
            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.upload_dir, Some(PathBuf::from("/from/env")));

            // YAML values should be preserved
            assert_eq!(config.port, 7000);

            Ok(())
        });
    }

    #[test]
    fn test_nested_env_override() {
        Jail::expect_with(|jail| {
            jail.set_env("FILESVC_UPLOAD_DIR", "/data");
            jail.set_env("FILESVC_LIMITS__MAX_UPLOAD_SIZE", "1024");
            jail.set_env("FILESVC_UPLOADS__ATOMIC_WRITES", "false");

            let config = Config::load(&args("config.yaml"))?;

            assert_eq!(config.limits.max_upload_size, 1024);
            assert!(!config.uploads.atomic_writes);

            Ok(())
        });
    }

    #[test]
    fn test_cli_upload_dir_overrides_env_and_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "upload_dir: /from/yaml\n")?;
            jail.set_env("FILESVC_UPLOAD_DIR", "/from/env");

            let args = Args {
                config: "test.yaml".to_string(),
                upload_dir: Some(PathBuf::from("/from/cli")),
                validate: false,
            };

            let config = Config::load(&args)?;
            assert_eq!(config.upload_dir, Some(PathBuf::from("/from/cli")));

            Ok(())
        });
    }

    #[test]
    fn test_config_path_env_var_is_not_a_field() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.yaml", "upload_dir: /data\n")?;
            jail.set_env("FILESVC_CONFIG", "custom.yaml");

            let config = Config::load(&args("custom.yaml"))?;
            assert_eq!(config.upload_dir, Some(PathBuf::from("/data")));

            Ok(())
        });
    }

    #[test]
    fn test_missing_upload_dir_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "port: 8080\n")?;

            let result = Config::load(&args("test.yaml"));
            let err = result.expect_err("upload_dir is required");
            assert!(err.to_string().contains("upload_dir is not configured"));

            Ok(())
        });
    }

    #[test]
    fn test_unknown_field_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
upload_dir: /data
upload_folder: /typo
"#,
            )?;

            assert!(Config::load(&args("test.yaml")).is_err());

            Ok(())
        });
    }

    #[test]
    fn test_config_validation_empty_upload_dir() {
        let config = Config {
            upload_dir: Some(PathBuf::new()),
            ..Default::default()
        };

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_config_validation_valid_config() {
        let config = Config {
            upload_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_upload_body_limit_leaves_room_for_multipart_framing() {
        let limits = LimitsConfig { max_upload_size: 1024 };
        assert_eq!(limits.upload_body_limit(), Some(1024 + MULTIPART_OVERHEAD));

        let unlimited = LimitsConfig { max_upload_size: 0 };
        assert_eq!(unlimited.upload_body_limit(), None);

        let huge = LimitsConfig {
            max_upload_size: usize::MAX,
        };
        assert_eq!(huge.upload_body_limit(), Some(usize::MAX));
    }
}

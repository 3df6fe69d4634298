use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod models;
pub use models::*;

/// Marker used in config files for values that must come from the environment.
pub const SECRET_FROM_ENV: &str = "secret_from_env";

/// Loads the configuration from `config/` below the current working directory
/// (or `COURSEHUB_CONFIG_DIR`), layered with environment overrides.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let config_dir = env::var("COURSEHUB_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));
    load_config_from(&config_dir)
}

/// Layering order: `default`, then `{RUN_ENV}` (both optional files in any format
/// the `config` crate understands), then `COURSEHUB__SECTION__KEY` env vars.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "COURSEHUB".to_string());

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    let builder = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Recursively replaces all "secret_from_env" string values with environment variable values.
/// Fails when any marker has no matching variable, so the marker text never
/// ends up as a signing key.
fn inject_env_secrets(value: &mut Value) -> Result<(), ConfigError> {
    fn walk(path: Vec<String>, obj: &mut Value, missing: &mut Vec<String>) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v, missing);
                }
            }
            Value::String(s) if s == SECRET_FROM_ENV => {
                let env_key = path.join("_").to_uppercase();
                match env::var(&env_key) {
                    Ok(env_val) if !env_val.is_empty() => *obj = Value::String(env_val),
                    _ => {
                        warn!("env var {} not found for secret_from_env", env_key);
                        missing.push(env_key);
                    }
                }
            }
            _ => {}
        }
    }

    let mut missing = Vec::new();
    walk(vec![], value, &mut missing);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Message(format!(
            "missing environment variables for secrets: {}",
            missing.join(", ")
        )))
    }
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    inject_env_secrets(&mut json)?;
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads `.env` (or the file named by `DOTENV_OVERRIDE`) exactly once per process.
/// Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

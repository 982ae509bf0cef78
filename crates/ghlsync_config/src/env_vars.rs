//! Environment variable naming for configuration overrides and secrets.
//!
//! Plain settings follow `GHLSYNC__SECTION__KEY` (handled by the `config` crate).
//! Secrets marked `secret_from_env` in a config file are looked up as
//! `GHLSYNC_SECRET_SECTION_KEY`, falling back to the bare `SECTION_KEY` form
//! (e.g. `GHL_API_TOKEN`).

use serde_json::Value;
use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "GHLSYNC";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "GHLSYNC_SECRET";

/// Marker value that asks for a secret to be injected from the environment
pub const SECRET_MARKER: &str = "secret_from_env";

pub const CONFIG_SEPARATOR: &str = "__";
pub const SECRET_SEPARATOR: &str = "_";

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// `server.port` -> `GHLSYNC__SERVER__PORT`
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// `ghl.api_token` -> `GHLSYNC_SECRET_GHL_API_TOKEN`
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// `ghl.api_token` -> `GHL_API_TOKEN`
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    path.replace('.', SECRET_SEPARATOR).to_uppercase()
}

/// Look up a secret, preferring the prefixed name over the legacy one.
pub fn get_secret_env_var(path: &str) -> Option<String> {
    env::var(secret_path_to_env_var(path))
        .or_else(|_| env::var(legacy_secret_path_to_env_var(path)))
        .ok()
}

/// Replace every `secret_from_env` string in `value` with its environment value.
///
/// Markers with no matching variable are replaced by `null` so optional
/// fields read as unset instead of carrying the marker text.
/// Returns the number of secrets injected.
pub fn inject_env_vars(value: &mut Value) -> usize {
    fn walk(path: &mut Vec<String>, obj: &mut Value) -> usize {
        match obj {
            Value::Object(map) => {
                let mut count = 0;
                for (k, v) in map.iter_mut() {
                    path.push(k.clone());
                    count += walk(path, v);
                    path.pop();
                }
                count
            }
            Value::String(s) if s == SECRET_MARKER => {
                let path_str = path.join(".");
                match get_secret_env_var(&path_str) {
                    Some(env_val) => {
                        *obj = Value::String(env_val);
                        1
                    }
                    None => {
                        warn!(
                            "No environment variable {} (or {}) for secret {}",
                            secret_path_to_env_var(&path_str),
                            legacy_secret_path_to_env_var(&path_str),
                            path_str
                        );
                        *obj = Value::Null;
                        0
                    }
                }
            }
            _ => 0,
        }
    }

    walk(&mut Vec::new(), value)
}

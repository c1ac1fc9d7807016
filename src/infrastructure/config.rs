use crate::domain::policy::EngineConfig;
use crate::infrastructure::error::DaybookError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ENGINE_JSON: &str = "engine.json";
const SCHEMA_VERSION: u64 = 1;

pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(ENGINE_JSON)
}

fn default_file() -> Result<serde_json::Value, DaybookError> {
    let mut value = serde_json::to_value(EngineConfig::default())?;
    if let Some(object) = value.as_object_mut() {
        object.insert("schema".to_string(), serde_json::json!(SCHEMA_VERSION));
    }
    Ok(value)
}

pub fn ensure_default_config(config_dir: &Path) -> Result<PathBuf, DaybookError> {
    fs::create_dir_all(config_dir)?;
    let path = config_path(config_dir);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&default_file()?)?;
        fs::write(&path, format!("{formatted}\n"))?;
        info!(path = %path.display(), "wrote default engine config");
    }
    Ok(path)
}

fn read_config(path: &Path) -> Result<serde_json::Value, DaybookError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| DaybookError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != SCHEMA_VERSION {
        return Err(DaybookError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_config(config_dir: &Path) -> Result<EngineConfig, DaybookError> {
    let path = config_path(config_dir);
    let value = read_config(&path)?;
    let config: EngineConfig = serde_json::from_value(value)
        .map_err(|error| DaybookError::InvalidConfig(format!("{}: {error}", path.display())))?;
    config
        .validate()
        .map_err(|reason| DaybookError::InvalidConfig(format!("{}: {reason}", path.display())))?;
    debug!(path = %path.display(), timezone = %config.timezone, "loaded engine config");
    Ok(config)
}

pub fn save_config(config_dir: &Path, config: &EngineConfig) -> Result<(), DaybookError> {
    config.validate().map_err(DaybookError::InvalidConfig)?;
    fs::create_dir_all(config_dir)?;

    let mut value = serde_json::to_value(config)?;
    let object = value.as_object_mut().ok_or_else(|| {
        DaybookError::InvalidConfig("engine config must serialize to an object".to_string())
    })?;
    object.insert("schema".to_string(), serde_json::json!(SCHEMA_VERSION));

    let formatted = serde_json::to_string_pretty(&value)?;
    fs::write(config_path(config_dir), format!("{formatted}\n"))?;
    Ok(())
}

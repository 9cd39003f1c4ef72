//! Override files: versions decided outside the run.
//!
//! `{ "<configuration>": { "group:name": "version" } }`

use gradle_lock_core::{ConfigurationModuleId, LockError, ModuleId, OverrideMap, Result};
use std::collections::BTreeMap;
use std::path::Path;

pub fn load_overrides(path: &Path) -> Result<OverrideMap> {
    let content = std::fs::read_to_string(path)?;
    let overrides = parse_overrides(&content).map_err(|err| match err {
        LockError::InvalidOverride { key, message } if key.is_empty() => {
            LockError::InvalidOverride {
                key: path.display().to_string(),
                message,
            }
        }
        other => other,
    })?;
    tracing::debug!("Loaded {} overrides from {}", overrides.len(), path.display());
    Ok(overrides)
}

pub fn parse_overrides(content: &str) -> Result<OverrideMap> {
    let raw: BTreeMap<String, BTreeMap<String, String>> =
        serde_json::from_str(content).map_err(|err| LockError::InvalidOverride {
            key: String::new(),
            message: err.to_string(),
        })?;

    let mut overrides = OverrideMap::new();
    for (configuration, modules) in raw {
        for (key, version) in modules {
            let Some(module) = ModuleId::parse(&key) else {
                return Err(LockError::InvalidOverride {
                    key,
                    message: "expected 'group:name'".to_string(),
                });
            };
            if version.trim().is_empty() {
                return Err(LockError::InvalidOverride {
                    key,
                    message: "version is empty".to_string(),
                });
            }
            overrides.insert(ConfigurationModuleId::new(module, &configuration), version);
        }
    }
    Ok(overrides)
}

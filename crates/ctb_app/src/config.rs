use std::fs;
use std::path::Path;
use std::time::Duration;

use ctb_engine::UploadSettings;
use ctb_logging::{ctb_info, ctb_warn};
use serde::Deserialize;

use crate::cli::Cli;

pub const CONFIG_FILENAME: &str = "ctb_agent.ron";

/// On-disk shape of the settings file. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
struct PersistedSettings {
    endpoint: String,
    field_name: String,
    connect_timeout_secs: u64,
    request_timeout_secs: Option<u64>,
    max_response_bytes: u64,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        let defaults = UploadSettings::default();
        Self {
            endpoint: defaults.endpoint,
            field_name: defaults.field_name,
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            request_timeout_secs: defaults.request_timeout.map(|timeout| timeout.as_secs()),
            max_response_bytes: defaults.max_response_bytes,
        }
    }
}

impl From<PersistedSettings> for UploadSettings {
    fn from(persisted: PersistedSettings) -> Self {
        Self {
            endpoint: persisted.endpoint,
            field_name: persisted.field_name,
            connect_timeout: Duration::from_secs(persisted.connect_timeout_secs),
            request_timeout: persisted.request_timeout_secs.map(Duration::from_secs),
            max_response_bytes: persisted.max_response_bytes,
        }
    }
}

/// Loads upload settings from a RON file, falling back to defaults when the
/// file is missing or unusable.
pub(crate) fn load_settings(path: &Path) -> UploadSettings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            ctb_info!("No settings file at {:?}; using defaults", path);
            return UploadSettings::default();
        }
        Err(err) => {
            ctb_warn!("Failed to read settings from {:?}: {}", path, err);
            return UploadSettings::default();
        }
    };

    match ron::from_str::<PersistedSettings>(&content) {
        Ok(persisted) => {
            ctb_info!("Loaded settings from {:?}", path);
            persisted.into()
        }
        Err(err) => {
            ctb_warn!("Failed to parse settings from {:?}: {}", path, err);
            UploadSettings::default()
        }
    }
}

/// Command-line flags win over the settings file.
pub(crate) fn apply_overrides(mut settings: UploadSettings, cli: &Cli) -> UploadSettings {
    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        settings.request_timeout = Some(Duration::from_secs(secs));
    }
    settings
}

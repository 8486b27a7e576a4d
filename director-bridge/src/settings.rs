//! Settings management for Director Bridge
//!
//! Settings live in a small XML file, read once at startup.

use quick_xml::de::from_str;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::master::client::DEFAULT_TIMEOUT_MS;
use crate::master::MasterApiConfig;
use crate::scene::SceneGroups;
use crate::telemetry::LogConfig;

/// Bridge settings stored in `settings.xml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "DirectorBridge")]
pub struct BridgeSettings {
    /// Base URL of the Master API, e.g. `http://lg-head:8080/interactivespaces`
    #[serde(rename = "masterApiUri", default)]
    pub master_api_uri: String,

    /// Live activity group running the Earth viewer
    #[serde(rename = "groupEarth", default)]
    pub group_earth: String,

    /// Live activity group running Street View
    #[serde(rename = "groupStreetview", default)]
    pub group_streetview: String,

    /// Live activity group running the panorama viewer
    #[serde(rename = "groupPanoviewer", default)]
    pub group_panoviewer: String,

    /// Port for the inbound HTTP/WebSocket API (default 8090)
    #[serde(rename = "apiPort", default = "default_api_port")]
    pub api_port: u16,

    /// Timeout for each Master API request in milliseconds
    #[serde(rename = "requestTimeoutMs", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Accept non-200 master responses if the body still parses
    #[serde(rename = "lenientStatus", default)]
    pub lenient_status: bool,

    /// Optional log file path
    #[serde(rename = "logFile", default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,

    /// Emit JSON log lines
    #[serde(rename = "logJson", default)]
    pub log_json: bool,
}

/// Default inbound API port
fn default_api_port() -> u16 {
    8090
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            master_api_uri: String::new(),
            group_earth: String::new(),
            group_streetview: String::new(),
            group_panoviewer: String::new(),
            api_port: default_api_port(),
            request_timeout_ms: default_request_timeout_ms(),
            lenient_status: false,
            log_file: None,
            log_json: false,
        }
    }
}

impl BridgeSettings {
    /// Default settings file location (`<config dir>/DirectorBridge/settings.xml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("DirectorBridge");
            p.push("settings.xml");
            p
        })
    }

    /// Load settings from the given file, or from [`Self::default_path`]
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let path = Self::default_path().ok_or(SettingsError::NoConfigDir)?;
                Self::load_from_file(&path)
            }
        }
    }

    /// Load and validate settings from an XML file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(SettingsError::Io)?;
        Self::from_xml(&contents)
    }

    /// Parse and validate settings from XML text
    pub fn from_xml(xml: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = from_str(xml).map_err(SettingsError::XmlParse)?;
        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    fn normalize(&mut self) {
        for value in [
            &mut self.master_api_uri,
            &mut self.group_earth,
            &mut self.group_streetview,
            &mut self.group_panoviewer,
        ] {
            *value = value.trim().to_string();
        }
        self.request_timeout_ms = self.request_timeout_ms.max(1);
    }

    /// Check that every required value is present
    pub fn validate(&self) -> Result<(), SettingsError> {
        let required = [
            ("masterApiUri", &self.master_api_uri),
            ("groupEarth", &self.group_earth),
            ("groupStreetview", &self.group_streetview),
            ("groupPanoviewer", &self.group_panoviewer),
        ];
        match required.iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(SettingsError::Missing(*field)),
            None => Ok(()),
        }
    }

    pub fn scene_groups(&self) -> SceneGroups {
        SceneGroups {
            earth: self.group_earth.clone(),
            streetview: self.group_streetview.clone(),
            panoviewer: self.group_panoviewer.clone(),
        }
    }

    pub fn master_config(&self) -> MasterApiConfig {
        MasterApiConfig {
            base_url: self.master_api_uri.clone(),
            timeout_ms: self.request_timeout_ms,
            lenient_status: self.lenient_status,
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            file_enabled: self.log_file.is_some(),
            file_path: self.log_file.as_ref().map(PathBuf::from),
            json_format: self.log_json,
            ..LogConfig::default()
        }
    }
}

/// Settings-related errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),
    #[error("XML parse error: {0}")]
    XmlParse(#[source] quick_xml::DeError),
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
    #[error("Could not find config directory")]
    NoConfigDir,
}

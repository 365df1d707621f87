//! Configuration loading, environment overlays and persistence.

use super::Config;
use crate::env::{self, vars};
use crate::error::ConfigError;
use crate::paths;
use crate::secret::SecretString;
use std::fs;
use std::path::Path;
use tracing::debug;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Resolve the effective configuration for a run.
    ///
    /// An explicit path must exist. Without one the default file is used when
    /// present, and built-in defaults otherwise. Environment variables are
    /// applied on top in both cases.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => match Self::load_default() {
                Ok(config) => config,
                Err(ConfigError::NotFound(path)) => {
                    debug!("No config file at {}, using defaults", path.display());
                    Self::default()
                }
                Err(e) => return Err(e),
            },
        };
        config.apply_env();
        Ok(config)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(env::get_var);
    }

    /// Overlay values from an arbitrary variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(vars::WHATSAPP_ACCESS_TOKEN) {
            self.whatsapp.access_token = Some(SecretString::new(token));
        }
        if let Some(id) = lookup(vars::WHATSAPP_PHONE_NUMBER_ID) {
            self.whatsapp.phone_number_id = Some(id);
        }
        if let Some(token) = lookup(vars::WHATSAPP_VERIFY_TOKEN) {
            self.whatsapp.verify_token = Some(SecretString::new(token));
        }
        if let Some(token) = lookup(vars::WADESK_API_TOKEN) {
            self.server.api_token = Some(SecretString::new(token));
        }
        if let Some(url) = lookup(vars::WADESK_DATABASE_URL) {
            self.store.database_url = url;
        }
        if let Some(port) = lookup(vars::WADESK_PORT).and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(json) = lookup(vars::WADESK_LOG_JSON) {
            self.logging.json = matches!(json.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to a JSON5-compatible string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        if self.whatsapp.timeout_secs == 0 {
            errors.push("WhatsApp timeout_secs must be greater than 0".to_string());
        }

        if self.whatsapp.api_base.trim().is_empty() {
            errors.push("WhatsApp api_base must not be empty".to_string());
        }

        let has_token = self
            .whatsapp
            .access_token
            .as_ref()
            .is_some_and(|t| !t.is_empty());
        let has_phone_id = self
            .whatsapp
            .phone_number_id
            .as_ref()
            .is_some_and(|p| !p.is_empty());
        if has_token && !has_phone_id {
            errors.push("WhatsApp access_token is set but phone_number_id is missing".to_string());
        }
        if has_phone_id && !has_token {
            errors.push("WhatsApp phone_number_id is set but access_token is missing".to_string());
        }

        if self.whatsapp.verify_token.as_ref().is_some_and(|t| t.is_empty()) {
            errors.push("WhatsApp verify_token must not be empty when set".to_string());
        }

        if self.server.api_token.as_ref().is_some_and(|t| t.is_empty()) {
            errors.push("Server api_token must not be empty when set".to_string());
        }

        if self.store.database_url.trim().is_empty() {
            errors.push("Store database_url must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}

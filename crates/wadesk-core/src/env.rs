//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable as a u16 (e.g., for ports).
pub fn get_u16(name: &str) -> Option<u16> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Load environment variables from a `.env` file in the working directory.
///
/// Variables already present in the process environment win.
pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = std::path::Path::new(".env");
    if !path.exists() {
        return Ok(());
    }

    let content = std::fs::read_to_string(path)?;
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            env::set_var(key, value);
        }
    }
    Ok(())
}

/// Parse `KEY=value` lines, skipping comments and blank lines.
fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Environment variable names read by wadesk.
pub mod vars {
    /// WhatsApp Cloud API access token.
    pub const WHATSAPP_ACCESS_TOKEN: &str = "WHATSAPP_ACCESS_TOKEN";

    /// WhatsApp Business phone number id used as the sender.
    pub const WHATSAPP_PHONE_NUMBER_ID: &str = "WHATSAPP_PHONE_NUMBER_ID";

    /// Secret echoed by the provider during the webhook handshake.
    pub const WHATSAPP_VERIFY_TOKEN: &str = "WHATSAPP_VERIFY_TOKEN";

    /// Bearer token required on the send endpoints.
    pub const WADESK_API_TOKEN: &str = "WADESK_API_TOKEN";

    /// Database URL override.
    pub const WADESK_DATABASE_URL: &str = "WADESK_DATABASE_URL";

    /// Listen port override.
    pub const WADESK_PORT: &str = "WADESK_PORT";

    /// Config file override.
    pub const WADESK_CONFIG: &str = "WADESK_CONFIG";

    /// Home directory override.
    pub const WADESK_HOME: &str = "WADESK_HOME";

    /// Log filter override.
    pub const WADESK_LOG: &str = "WADESK_LOG";

    /// Emit JSON logs.
    pub const WADESK_LOG_JSON: &str = "WADESK_LOG_JSON";
}

use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api.geekifypeople.geekify.global";
const DEFAULT_CLIENT_SECRET: &str = "secret";
/// Panel the mobile app is registered under at the Bpoint gateway.
pub const DEFAULT_PANEL_ID: u32 = 123;

/// Backend connection settings, sourced from the environment.
///
/// Defaults match the hosted Tradie+ backend so a development build
/// works with no configuration at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub client_secret: String,
    /// Bearer token for authenticated reads (plan catalog).
    pub access_token: Option<String>,
    pub panel_id: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_secret: DEFAULT_CLIENT_SECRET.to_string(),
            access_token: None,
            panel_id: DEFAULT_PANEL_ID,
        }
    }
}

impl BackendConfig {
    /// Reads the configuration from the environment; `.env` files are
    /// honored via dotenvy. Unset or unparseable variables fall back to
    /// the defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            base_url: env::var("TRADIE_API_BASE_URL").unwrap_or(defaults.base_url),
            client_secret: env::var("TRADIE_CLIENT_SECRET").unwrap_or(defaults.client_secret),
            access_token: env::var("TRADIE_ACCESS_TOKEN").ok(),
            panel_id: env::var("TRADIE_PANEL_ID")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.panel_id),
        }
    }
}

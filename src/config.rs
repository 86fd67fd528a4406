//! Fixed endpoints and timing for the agent.
//!
//! None of these are exposed on the command line. Tests build their own
//! [`Settings`] to point the client at a mock server and shrink the intervals.

use std::time::Duration;

/// Depined API origin.
pub const API_BASE_URL: &str = "https://api.depined.org";

/// Path of the connectivity ping endpoint.
pub const WIDGET_CONNECT_PATH: &str = "/api/user/widget-connect";

/// Path of the epoch earnings endpoint.
pub const EPOCH_EARNINGS_PATH: &str = "/api/stats/epoch-earnings";

/// Default file read by the file credential source.
pub const DEFAULT_TOKEN_FILE: &str = "token.txt";

/// Runtime settings shared by the client and the scheduler.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Origin that endpoint paths are appended to.
    pub api_base: String,
    /// Base delay between connectivity pings.
    pub ping_interval: Duration,
    /// Maximum offset added to or subtracted from `ping_interval`.
    pub ping_jitter: Duration,
    /// Period of the heartbeat loop.
    pub heartbeat_interval: Duration,
    /// Period of the browser-state loop.
    pub browser_check_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: API_BASE_URL.to_string(),
            ping_interval: Duration::from_secs(90),
            ping_jitter: Duration::from_secs(5),
            heartbeat_interval: Duration::from_secs(3),
            browser_check_interval: Duration::from_secs(30),
        }
    }
}

impl Settings {
    /// Full URL of the connectivity endpoint.
    pub fn widget_connect_url(&self) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), WIDGET_CONNECT_PATH)
    }

    /// Full URL of the earnings endpoint.
    pub fn epoch_earnings_url(&self) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), EPOCH_EARNINGS_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_endpoints() {
        let settings = Settings::default();
        assert_eq!(
            settings.widget_connect_url(),
            "https://api.depined.org/api/user/widget-connect"
        );
        assert_eq!(
            settings.epoch_earnings_url(),
            "https://api.depined.org/api/stats/epoch-earnings"
        );
        assert_eq!(settings.ping_interval, Duration::from_secs(90));
        assert_eq!(settings.ping_jitter, Duration::from_secs(5));
        assert_eq!(settings.heartbeat_interval, Duration::from_secs(3));
        assert_eq!(settings.browser_check_interval, Duration::from_secs(30));
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let settings = Settings {
            api_base: "http://127.0.0.1:9999/".into(),
            ..Default::default()
        };
        assert_eq!(
            settings.widget_connect_url(),
            "http://127.0.0.1:9999/api/user/widget-connect"
        );
    }
}

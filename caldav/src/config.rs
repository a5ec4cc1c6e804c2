// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// `CalDAV` authentication method.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "type")]
pub enum AuthMethod {
    /// No authentication.
    #[serde(rename = "none")]
    #[default]
    None,
    /// Basic authentication, the scheme most task servers (Nextcloud, Radicale, iCloud) expect.
    #[serde(rename = "basic")]
    Basic {
        /// Username for authentication.
        username: String,
        /// Password or app-specific password.
        password: String,
    },
    /// Bearer token authentication (OAuth).
    #[serde(rename = "bearer")]
    Bearer {
        /// Bearer token.
        token: String,
    },
}

/// `CalDAV` server configuration.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CalDavConfig {
    /// Base URL of the server, e.g. `https://cloud.example.com`.
    pub base_url: String,
    /// Path of the principal's calendar home, e.g. `/remote.php/dav/calendars/alice/`.
    pub calendar_home: String,
    /// Authentication method.
    #[serde(default)]
    pub auth: AuthMethod,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl CalDavConfig {
    /// Creates a configuration without authentication.
    #[must_use]
    pub fn new(base_url: impl Into<String>, calendar_home: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            calendar_home: calendar_home.into(),
            ..Default::default()
        }
    }

    /// Replaces the authentication method.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    /// The calendar home path, always ending with a slash.
    #[must_use]
    pub fn calendar_home_dir(&self) -> String {
        if self.calendar_home.ends_with('/') {
            self.calendar_home.clone()
        } else {
            format!("{}/", self.calendar_home)
        }
    }
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("taskbridge-caldav/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for CalDavConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            calendar_home: String::new(),
            auth: AuthMethod::default(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

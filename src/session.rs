//! Admin session flag and credential checks.
//!
//! The session lives only as long as the process, the terminal analogue of
//! browser session storage: quitting logs the admin out.

use std::collections::HashMap;

use crate::gateway::Gateway;
use crate::settings::{AuthMode, AuthSettings};

pub(crate) const SESSION_KEY: &str = "adminLoggedIn";

/// Ephemeral key/value storage scoped to one run of the program.
#[derive(Debug, Default)]
pub(crate) struct Session {
    values: HashMap<String, String>,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.values.get(SESSION_KEY).is_some_and(|v| v == "true")
    }

    pub(crate) fn set_authenticated(&mut self, value: bool) {
        if value {
            self.values.insert(SESSION_KEY.to_string(), "true".to_string());
        } else {
            self.values.remove(SESSION_KEY);
        }
    }

    #[cfg(test)]
    pub(crate) fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Authenticator {
    /// Plain comparison against configured values. Not a security boundary:
    /// anyone who can read the config can log in.
    Static { username: String, password: String },
    /// Forward the credentials to the store's own auth service.
    Delegated,
}

impl Authenticator {
    pub(crate) fn from_settings(settings: &AuthSettings) -> Self {
        match settings.mode {
            AuthMode::Static => Self::Static {
                username: settings.username.clone(),
                password: settings.password.clone(),
            },
            AuthMode::Delegated => Self::Delegated,
        }
    }

    pub(crate) fn validate_login(&self, gateway: &Gateway, username: &str, password: &str) -> bool {
        match self {
            Self::Static {
                username: expected_user,
                password: expected_pass,
            } => username == expected_user && password == expected_pass,
            Self::Delegated => match gateway.sign_in(username, password) {
                Ok(accepted) => accepted,
                Err(err) => {
                    tracing::warn!(error = %err, "sign-in request failed");
                    false
                }
            },
        }
    }
}

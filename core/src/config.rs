//! Client configuration and credential selection.
//!
//! Overrides from the environment are applied once, as an explicit step
//! before the client is built. Nothing else in the crate reads the process
//! environment.

use std::fmt;

/// Environment variable overriding `Config::base_url`.
pub const ENV_BASE_URL: &str = "GBA_BASE_URL";
/// Environment variable overriding `Config::username`.
pub const ENV_USERNAME: &str = "GBA_USERNAME";
/// Environment variable overriding `Config::password`.
pub const ENV_PASSWORD: &str = "GBA_PASSWORD";
/// Environment variable overriding `Config::token`.
pub const ENV_TOKEN: &str = "GBA_TOKEN";

/// Where the API lives and how to authenticate against it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

/// Credential sent with auth-bearing requests.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    None,
    Password(String),
    Token(String),
}

const REDACTED: &str = "<redacted>";

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .field("token", &self.token.as_ref().map(|_| REDACTED))
            .finish()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::None => write!(f, "None"),
            Credential::Password(_) => write!(f, "Password({REDACTED})"),
            Credential::Token(_) => write!(f, "Token({REDACTED})"),
        }
    }
}

impl Credential {
    pub fn uses_token(&self) -> bool {
        matches!(self, Credential::Token(_))
    }

    /// The value sent as `passOrToken`, if any.
    pub fn secret(&self) -> Option<&str> {
        match self {
            Credential::None => None,
            Credential::Password(secret) | Credential::Token(secret) => Some(secret),
        }
    }
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace fields with values from `lookup`, keyed by the `GBA_*`
    /// variable names. Missing or empty values leave the field untouched.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(base_url) = get(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(username) = get(ENV_USERNAME) {
            self.username = Some(username);
        }
        if let Some(password) = get(ENV_PASSWORD) {
            self.password = Some(password);
        }
        if let Some(token) = get(ENV_TOKEN) {
            self.token = Some(token);
        }
        self
    }

    /// `with_overrides` backed by the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Pick the credential for a request. A token takes precedence over a
    /// password; an empty token counts as absent.
    pub fn credential(&self) -> Credential {
        match (self.token.as_deref(), self.password.as_deref()) {
            (Some(token), _) if !token.is_empty() => Credential::Token(token.to_string()),
            (_, Some(password)) => Credential::Password(password.to_string()),
            _ => Credential::None,
        }
    }
}

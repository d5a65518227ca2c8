//! Static access-token table

use std::collections::HashMap;

/// Maps access tokens to the user id they act for
#[derive(Debug, Clone, Default)]
pub struct AccessTokens {
    users: HashMap<String, String>,
}

impl AccessTokens {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.users.insert(token.into(), user_id.into());
        self
    }

    /// The user behind `token`, if the token is known
    pub fn resolve(&self, token: &str) -> Option<&str> {
        if token.is_empty() {
            return None;
        }
        self.users.get(token).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

//! Application users.

use serde::{Deserialize, Serialize};

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
}

/// New values for a user. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub new_name: Option<String>,
    pub new_email: Option<String>,
}

impl UserUpdate {
    /// Column/value pairs for every provided field.
    pub fn assignments(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(name) = self.new_name.as_ref().filter(|v| !v.is_empty()) {
            out.push(("name", name.clone()));
        }
        if let Some(email) = self.new_email.as_ref().filter(|v| !v.is_empty()) {
            out.push(("email", email.clone()));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }
}

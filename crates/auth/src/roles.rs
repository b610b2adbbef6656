use serde::{Deserialize, Serialize};

/// Role of an authenticated principal.
///
/// Fixed for the lifetime of a request: it comes from verified token claims
/// and is never re-read mid-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A guest who books residences and activities.
    User,
    /// A host who manages listings and answers booking requests.
    Provider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Provider => "provider",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_lowercase_name() {
        assert_eq!(serde_json::to_string(&Role::Provider).unwrap(), "\"provider\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
    }
}

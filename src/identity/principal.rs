use serde::{Deserialize, Serialize};

/// The signed-in user as returned by the auth API. Held in memory only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self { id: id.into(), email: email.into(), first_name: None, last_name: None }
    }

    /// "First Last" when a name is known, otherwise the email.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() { self.email.clone() } else { parts.join(" ") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_names() {
        let u: UserIdentity = serde_json::from_str(r#"{"id":"7","email":"a@b.c","firstName":"Ada","lastName":"Lovelace"}"#).unwrap();
        assert_eq!(u.first_name.as_deref(), Some("Ada"));
        assert_eq!(u.display_name(), "Ada Lovelace");
        assert_eq!(UserIdentity::new("1", "x@y.com").display_name(), "x@y.com");
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of audit entries requested when the caller does not say
pub const DEFAULT_AUDIT_LIMIT: u32 = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    #[serde(default)]
    pub entries: Vec<AuditEntry>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: String,
    #[serde(default)]
    pub username: Option<String>,
    pub action_type: String,
    #[serde(default)]
    pub details: Option<Value>,
}

impl AuditEntry {
    /// Actor name; entries without a user were written by the service itself
    pub fn actor(&self) -> &str {
        self.username.as_deref().unwrap_or("System")
    }

    /// Details as `(key, value)` pairs.
    ///
    /// The service stores details either as a JSON object or as a string
    /// holding encoded JSON. Anything that is not an object becomes a single
    /// pair with an empty key.
    pub fn detail_pairs(&self) -> Vec<(String, String)> {
        let details = match &self.details {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
                Ok(parsed) => parsed,
                Err(_) => return vec![(String::new(), s.clone())],
            },
            Some(other) => other.clone(),
        };

        match details {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k, v.to_string()))
                .collect(),
            Value::String(s) => vec![(String::new(), s)],
            other => vec![(String::new(), other.to_string())],
        }
    }

    /// One-line rendering of `detail_pairs`
    pub fn details_display(&self) -> String {
        let pairs = self.detail_pairs();
        if pairs.is_empty() {
            return "No details".to_string();
        }
        pairs
            .into_iter()
            .map(|(k, v)| if k.is_empty() { v } else { format!("{}: {}", k, v) })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

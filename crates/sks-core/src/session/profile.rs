//! Normalized user profile and the field-alias normalization rule.
//!
//! The server has shipped identity payloads under several historical field
//! spellings. Each logical field has an ordered alias list; the first alias
//! whose value is present (non-null) wins, and the result is then validated.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Access tier of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Player,
    Staff,
    Boss,
    /// Any role the server introduces that this client does not know about.
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Player => "player",
            Role::Staff => "staff",
            Role::Boss => "boss",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "player" => Role::Player,
            "staff" => Role::Staff,
            "boss" => Role::Boss,
            _ => Role::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical identity record held by the session store.
///
/// Persisted under the `userInfo` key with `snake_case` field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub ref_id: Option<String>,
}

/// Accepted spellings for the user id, in priority order.
pub const USER_ID_ALIASES: &[&str] = &["user_id", "User_ID", "userId"];
/// Accepted spellings for the username, in priority order.
pub const USERNAME_ALIASES: &[&str] = &["username", "Username", "user_name", "UserName"];
/// Accepted spellings for the role, in priority order.
pub const ROLE_ALIASES: &[&str] = &["role", "Role"];
/// Accepted spellings for the role-specific reference id, in priority order.
pub const REF_ID_ALIASES: &[&str] = &["ref_id", "Ref_ID", "refId"];

/// Returns the value of the first alias present with a non-null value.
fn pick<'a>(raw: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| raw.get(*alias).filter(|v| !v.is_null()))
}

/// Id-like values: non-empty strings or non-zero numbers.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f.abs() > 0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Name-like values: non-empty strings only.
fn name_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Maps a raw server identity payload onto [`UserProfile`].
///
/// Returns `None` when the payload is not an object or when the id, username
/// or role is missing, empty, or of the wrong shape. A missing or unusable
/// `ref_id` never rejects the payload.
pub fn normalize_profile(raw: &Value) -> Option<UserProfile> {
    let raw = raw.as_object()?;

    let user_id = pick(raw, USER_ID_ALIASES).and_then(id_text)?;
    let username = pick(raw, USERNAME_ALIASES).and_then(name_text)?;
    let role = pick(raw, ROLE_ALIASES).and_then(name_text)?;
    let ref_id = pick(raw, REF_ID_ALIASES).and_then(id_text);

    Some(UserProfile {
        user_id,
        username,
        role: Role::from(role),
        ref_id,
    })
}

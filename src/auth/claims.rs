use serde::{Deserialize, Serialize};

/// JWT payload minted at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64, // owning user
    pub iat: i64,     // issued at (unix timestamp)
    pub exp: i64,     // expires at (unix timestamp)
}

/// Payload of an incoming token. `user_id` stays untyped until checked so a
/// missing or non-numeric claim can be told apart from a bad signature.
#[derive(Debug, Deserialize)]
pub(crate) struct IncomingClaims {
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
}

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

/// The signed-in user. Identity is derived locally from the JWT payload;
/// the token is never verified client-side, only decoded for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) username: String,
}

impl User {
    /// Build a user right after login, where the typed username is known
    /// and wins over anything in the token.
    pub(crate) fn from_login(token: &str, username: &str) -> Option<Self> {
        let payload = decode_payload(token)?;
        Some(Self::from_parts(&payload, username))
    }

    /// Build a user from a stored token at startup. The username falls
    /// back to the `sub` claim since no login input exists yet.
    pub(crate) fn from_stored_token(token: &str) -> Option<Self> {
        let payload = decode_payload(token)?;
        let username = claim_string(&payload, "username")
            .or_else(|| claim_string(&payload, "sub"))
            .unwrap_or_else(|| "unknown".to_string());
        Some(Self::from_parts(&payload, &username))
    }

    fn from_parts(payload: &Value, username: &str) -> Self {
        let id = claim_string(payload, "id")
            .or_else(|| claim_string(payload, "sub"))
            .unwrap_or_else(|| "unknown".to_string());
        let name = claim_string(payload, "name").unwrap_or_else(|| {
            username
                .split('@')
                .next()
                .unwrap_or(username)
                .to_string()
        });
        Self {
            id,
            name,
            username: username.to_string(),
        }
    }
}

/// Decode the payload segment of a JWT without verifying the signature.
/// Returns None for anything that is not three dot-separated segments of
/// url-safe base64 wrapping a JSON object.
fn decode_payload(token: &str) -> Option<Value> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// String claim lookup tolerant of numeric ids.
fn claim_string(payload: &Value, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

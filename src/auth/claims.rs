use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload used for authentication. The subject is the username; the
/// caller's identity is always resolved from here, never from request bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // username
    pub email: String, // user email
    pub jti: Uuid,     // per-token uniqueness
    pub iss: String,   // issuer
    pub aud: String,   // audience
    pub exp: usize,    // expires at (unix timestamp)
}

use serde::{Deserialize, Serialize};

use super::identity::Identity;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PhoneSendRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct PhoneVerifyRequest {
    pub phone: String,
    pub code: String,
}

/// Response carrying the identity established by a sign-in operation
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub identity: Identity,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self { identity }
    }
}

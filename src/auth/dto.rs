use serde::{Deserialize, Serialize};

/// Request body for signup. Fields are optional so that a missing value
/// surfaces as a 422 with a useful message rather than a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Returned by signup and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: i64,
    pub token: String,
}

use serde::Deserialize;

use crate::patch::nullable;

/// Body of `PUT /profile`. Only these four fields are ever written.
/// `email` and `avatar_url` may be cleared with an explicit `null`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar_url: Option<Option<String>>,
    pub bio: Option<String>,
}

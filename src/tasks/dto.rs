use serde::Deserialize;

use crate::{coerce::lenient_bool, patch::nullable};

#[derive(Debug, Default, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub urgency: Option<i32>,
    pub due_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub urgency: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub done: Option<bool>,
}

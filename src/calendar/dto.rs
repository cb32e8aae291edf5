use serde::Deserialize;

use crate::coerce::lenient_bool;

/// Inclusive day range, both ends `YYYY-MM-DD`.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub note: Option<String>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub all_day: Option<bool>,
    pub color: Option<String>,
}

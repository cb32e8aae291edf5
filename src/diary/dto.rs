use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct DiaryQuery {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateEntryRequest {
    /// Entry day, `YYYY-MM-DD`; today (UTC) when absent.
    pub date: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
}

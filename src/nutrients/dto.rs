use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use super::services::{Current, Ratios};
use crate::{coerce, patch::nullable};

#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

/// Ratios as sent by clients; anything missing counts as 0.
#[derive(Debug, Default, Deserialize)]
pub struct RatiosInput {
    pub veg: Option<f64>,
    pub carb: Option<f64>,
    pub protein: Option<f64>,
}

impl From<RatiosInput> for Ratios {
    fn from(r: RatiosInput) -> Self {
        Ratios {
            veg: r.veg.unwrap_or(0.0),
            carb: r.carb.unwrap_or(0.0),
            protein: r.protein.unwrap_or(0.0),
        }
    }
}

/// Older clients send `{"goal": {...}}` to `PUT /nutrients`.
#[derive(Debug, Default, Deserialize)]
pub struct LegacyPutRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub goal: Option<Option<RatiosInput>>,
}

impl LegacyPutRequest {
    /// `None` when the body has no `goal` key; `"goal": null` counts as `{}`.
    pub fn into_goal(self) -> Option<RatiosInput> {
        self.goal.map(Option::unwrap_or_default)
    }
}

#[derive(Debug, Serialize)]
pub struct GoalView {
    #[serde(flatten)]
    pub ratios: Ratios,
    #[serde(serialize_with = "coerce::timestamp_opt::serialize")]
    pub updated_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Serialize)]
pub struct NutrientsResponse {
    pub current: Current,
    pub goal: GoalView,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub date: Option<String>,
    pub limit: Option<i64>,
}

/// Either `food_id` (+ optional `amount_g`, default 100) or raw macro grams.
#[derive(Debug, Default, Deserialize)]
pub struct CreateHistoryRequest {
    pub food_id: Option<i64>,
    pub amount_g: Option<f64>,
    pub name: Option<String>,
    pub veg_g: Option<f64>,
    pub carb_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub eaten_at: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateHistoryRequest {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    pub veg_g: Option<f64>,
    pub carb_g: Option<f64>,
    pub protein_g: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub amount_g: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub note: Option<Option<String>>,
    pub eaten_at: Option<String>,
}

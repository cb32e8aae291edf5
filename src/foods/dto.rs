use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Macro grams are per `per_unit_g` grams of the food.
#[derive(Debug, Default, Deserialize)]
pub struct CreateFoodRequest {
    pub name: Option<String>,
    pub veg_g: Option<f64>,
    pub carb_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub per_unit_g: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFoodRequest {
    pub name: Option<String>,
    pub veg_g: Option<f64>,
    pub carb_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub per_unit_g: Option<f64>,
}

//! Pure nutrient arithmetic: per-day shares and food scaling.

use serde::Serialize;
use sqlx::FromRow;
use time::Date;

use crate::coerce;
use crate::foods::repo::FoodItem;

/// Target split used until the user saves their own.
pub const DEFAULT_GOAL: Ratios = Ratios {
    veg: 0.48,
    carb: 0.30,
    protein: 0.22,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ratios {
    pub veg: f64,
    pub carb: f64,
    pub protein: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct MacroGrams {
    pub veg_g: f64,
    pub carb_g: f64,
    pub protein_g: f64,
}

impl MacroGrams {
    pub fn total(&self) -> f64 {
        self.veg_g + self.carb_g + self.protein_g
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grams {
    pub veg_g: f64,
    pub carb_g: f64,
    pub protein_g: f64,
    pub total_g: f64,
}

/// What the user actually ate on `date`, as shares of the day's total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Current {
    #[serde(flatten)]
    pub shares: Ratios,
    pub grams: Grams,
    #[serde(serialize_with = "coerce::date::serialize")]
    pub date: Date,
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

pub fn current(sums: MacroGrams, date: Date) -> Current {
    let total = sums.total();
    if total > 0.0 {
        Current {
            shares: Ratios {
                veg: round4(sums.veg_g / total),
                carb: round4(sums.carb_g / total),
                protein: round4(sums.protein_g / total),
            },
            grams: Grams {
                veg_g: sums.veg_g,
                carb_g: sums.carb_g,
                protein_g: sums.protein_g,
                total_g: total,
            },
            date,
        }
    } else {
        Current {
            shares: Ratios {
                veg: 0.0,
                carb: 0.0,
                protein: 0.0,
            },
            grams: Grams {
                veg_g: 0.0,
                carb_g: 0.0,
                protein_g: 0.0,
                total_g: 0.0,
            },
            date,
        }
    }
}

/// Macros in `amount_g` grams of `food`, whose values are per `per_unit_g`.
pub fn scale(food: &FoodItem, amount_g: f64) -> MacroGrams {
    let factor = amount_g / food.per_unit_g;
    MacroGrams {
        veg_g: food.veg_g * factor,
        carb_g: food.carb_g * factor,
        protein_g: food.protein_g * factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn food(veg_g: f64, carb_g: f64, protein_g: f64, per_unit_g: f64) -> FoodItem {
        FoodItem {
            id: 1,
            user_id: 1,
            name: "lentils".into(),
            veg_g,
            carb_g,
            protein_g,
            per_unit_g,
            created_at: datetime!(2024-01-01 00:00:00),
        }
    }

    #[test]
    fn shares_follow_gram_split() {
        let sums = MacroGrams {
            veg_g: 48.0,
            carb_g: 30.0,
            protein_g: 22.0,
        };
        let c = current(sums, date!(2024 - 05 - 01));
        assert_eq!(c.shares, Ratios { veg: 0.48, carb: 0.3, protein: 0.22 });
        assert_eq!(c.grams.total_g, 100.0);
        assert_eq!(c.grams.veg_g, 48.0);
    }

    #[test]
    fn shares_round_to_four_places() {
        let sums = MacroGrams {
            veg_g: 1.0,
            carb_g: 1.0,
            protein_g: 1.0,
        };
        let c = current(sums, date!(2024 - 05 - 01));
        assert_eq!(c.shares.veg, 0.3333);
        assert_eq!(c.shares.protein, 0.3333);
    }

    #[test]
    fn empty_day_is_all_zero() {
        let c = current(MacroGrams::default(), date!(2024 - 05 - 01));
        assert_eq!(c.shares, Ratios { veg: 0.0, carb: 0.0, protein: 0.0 });
        assert_eq!(c.grams.total_g, 0.0);
        assert_eq!(c.grams.protein_g, 0.0);
    }

    #[test]
    fn current_serializes_flat_shares() {
        let c = current(
            MacroGrams {
                veg_g: 2.0,
                carb_g: 2.0,
                protein_g: 0.0,
            },
            date!(2024 - 05 - 01),
        );
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["veg"], 0.5);
        assert_eq!(v["carb"], 0.5);
        assert_eq!(v["protein"], 0.0);
        assert_eq!(v["grams"]["total_g"], 4.0);
        assert_eq!(v["date"], "2024-05-01");
    }

    #[test]
    fn scaling_by_amount() {
        let m = scale(&food(10.0, 4.0, 6.0, 50.0), 100.0);
        assert_eq!(m.veg_g, 20.0);
        assert_eq!(m.carb_g, 8.0);
        assert_eq!(m.protein_g, 12.0);
    }

    #[test]
    fn default_goal_values() {
        assert_eq!(DEFAULT_GOAL.veg, 0.48);
        assert_eq!(DEFAULT_GOAL.carb, 0.30);
        assert_eq!(DEFAULT_GOAL.protein, 0.22);
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Cut,
    Bulk,
    Maintain,
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::Cut, Goal::Bulk, Goal::Maintain];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cut" => Some(Self::Cut),
            "bulk" => Some(Self::Bulk),
            "maintain" => Some(Self::Maintain),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Cut => "cut",
            Self::Bulk => "bulk",
            Self::Maintain => "maintain",
        }
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodType {
    Veg,
    Vegan,
    #[default]
    Nonveg,
}

impl FoodType {
    /// Anything unrecognised, including a missing value, resolves to `Nonveg`.
    pub fn from_optional_str(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "veg" || v == "vegetarian" => Self::Veg,
            Some(v) if v == "vegan" => Self::Vegan,
            _ => Self::Nonveg,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Veg => "veg",
            Self::Vegan => "vegan",
            Self::Nonveg => "nonveg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    Sedentary,
    Active,
}

impl ActivityLevel {
    /// UI levels (light, moderate, very_active, ...) all collapse to `Active`.
    pub fn normalize(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("sedentary") {
            Self::Sedentary
        } else {
            Self::Active
        }
    }

    /// Label as known to the activity encoder.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Sedentary => "Sedentary",
            Self::Active => "Active",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub gender: String,
    pub activity: ActivityLevel,
    pub goal: Goal,
    pub food_type: FoodType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessPlan {
    pub title: String,
    pub diet_strategy: String,
    pub example_meals: Vec<String>,
    pub workout_strategy: String,
    pub workout_split: Vec<String>,
    pub explanation: String,
    pub confidence: f64,
    pub model_type: String,
}

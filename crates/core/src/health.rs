use serde::{Deserialize, Serialize};

use crate::models::Goal;

/// Body mass index from kilograms and centimetres.
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Young,
    Adult,
    Senior,
}

impl AgeGroup {
    pub fn from_age(age: u32) -> Self {
        if age >= 40 {
            Self::Senior
        } else if age >= 26 {
            Self::Adult
        } else {
            Self::Young
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Young => "young",
            Self::Adult => "adult",
            Self::Senior => "senior",
        }
    }

    pub fn recovery_note(self) -> &'static str {
        match self {
            Self::Senior => "Reduced joint stress and added mobility work.",
            Self::Adult => "Structured progression with proper recovery cycles.",
            Self::Young => "Higher intensity progression suitable.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiBand {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiBand {
    // Checked top-down: 30, then 25, then the underweight floor.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi >= 30.0 {
            Self::Obese
        } else if bmi >= 25.0 {
            Self::Overweight
        } else if bmi < 18.5 {
            Self::Underweight
        } else {
            Self::Normal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Obese => "Obese range",
            Self::Overweight => "Overweight range",
            Self::Underweight => "Underweight range",
            Self::Normal => "Normal range",
        }
    }

    pub fn intensity_note(self) -> &'static str {
        match self {
            Self::Obese => "Higher cardio frequency due to elevated BMI.",
            Self::Overweight => "Moderate calorie control and structured fat management.",
            Self::Underweight => "Increased calorie surplus for muscle gain.",
            Self::Normal => "Balanced calorie and structured hypertrophy approach.",
        }
    }
}

pub fn activity_label(activity: &str) -> &'static str {
    match activity.trim().to_lowercase().as_str() {
        "very active" | "active" => "High activity pattern detected.",
        "sedentary" => "Low activity level detected.",
        _ => "Moderate activity pattern detected.",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub bmi: f64,
    pub age_group: AgeGroup,
    pub bmi_band: BmiBand,
    pub activity_label: String,
}

impl HealthMetrics {
    pub fn derive(age: u32, bmi: f64, activity: &str) -> Self {
        Self {
            bmi,
            age_group: AgeGroup::from_age(age),
            bmi_band: BmiBand::from_bmi(bmi),
            activity_label: activity_label(activity).to_string(),
        }
    }
}

/// Mifflin-St Jeor resting energy in kcal/day. Anything other than "male"
/// takes the female offset.
pub fn basal_metabolic_rate(weight_kg: f64, height_cm: f64, age: u32, gender: &str) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64;
    if gender.trim().eq_ignore_ascii_case("male") {
        base + 5.0
    } else {
        base - 161.0
    }
}

/// Multiplier for the raw activity level, before it is collapsed to
/// Active/Sedentary. Unknown levels count as sedentary.
pub fn activity_multiplier(activity: &str) -> f64 {
    match activity.trim().to_lowercase().replace(' ', "_").as_str() {
        "light" => 1.375,
        "moderate" => 1.55,
        "active" => 1.725,
        "very_active" => 1.9,
        _ => 1.2,
    }
}

pub fn total_daily_energy_expenditure(bmr: f64, activity: &str) -> f64 {
    bmr * activity_multiplier(activity)
}

/// Daily kcal target: 500 under maintenance to cut, 400 over to bulk.
pub fn calorie_target(tdee: f64, goal: Goal) -> i64 {
    let target = match goal {
        Goal::Cut => tdee - 500.0,
        Goal::Bulk => tdee + 400.0,
        Goal::Maintain => tdee,
    };
    target.round() as i64
}

/// Advice against a goal that fights the current BMI band. `None` means the
/// goal is fine.
pub fn goal_warning(bmi: f64, goal: Goal) -> Option<&'static str> {
    match (goal, BmiBand::from_bmi(bmi)) {
        (Goal::Bulk, BmiBand::Obese) => Some(
            "Bulking is not recommended at your current BMI (Obese). Consider maintaining or cutting first.",
        ),
        (Goal::Cut, BmiBand::Underweight) => Some(
            "Cutting is not recommended at your current BMI (Underweight). Consider maintaining or bulking first.",
        ),
        _ => None,
    }
}

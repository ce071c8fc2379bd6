use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlanError;
use crate::models::{ActivityLevel, FoodType, Goal, Profile};

/// Raw `/predict` body. Fields stay loosely typed so that shape problems are
/// reported as validation errors instead of generic deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub weight: Option<Value>,
    #[serde(default)]
    pub height: Option<Value>,
    #[serde(default)]
    pub goal: Option<Value>,
    #[serde(default)]
    pub gender: Option<Value>,
    #[serde(default)]
    pub activity: Option<Value>,
    #[serde(default)]
    pub food_type: Option<Value>,
}

impl ProfileRequest {
    pub fn into_profile(self) -> Result<Profile, PlanError> {
        let age = parse_age(self.age.as_ref())?;
        let weight_kg = parse_positive("weight", self.weight.as_ref())?;
        let height_cm = parse_positive("height", self.height.as_ref())?;
        let gender = capitalize(&required_text("gender", self.gender.as_ref())?);
        let activity = ActivityLevel::normalize(&required_text("activity", self.activity.as_ref())?);

        let raw_goal = required_text("goal", self.goal.as_ref())?;
        let goal = Goal::parse(&raw_goal).ok_or(PlanError::InvalidGoal(raw_goal))?;

        let food_type = match self.food_type.as_ref() {
            Some(Value::String(value)) => FoodType::from_optional_str(Some(value)),
            _ => FoodType::default(),
        };

        Ok(Profile {
            age,
            weight_kg,
            height_cm,
            gender,
            activity,
            goal,
            food_type,
        })
    }
}

fn parse_age(value: Option<&Value>) -> Result<u32, PlanError> {
    let value = value.ok_or_else(|| PlanError::validation("age", "missing"))?;
    let parsed = match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
                .map(|v| v as u64)
        }),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|age| u32::try_from(age).ok())
        .ok_or_else(|| {
            PlanError::validation("age", format!("expected a non-negative integer, got {value}"))
        })
}

fn parse_positive(field: &'static str, value: Option<&Value>) -> Result<f64, PlanError> {
    let value = value.ok_or_else(|| PlanError::validation(field, "missing"))?;
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(number) => positive_measure(field, number),
        None => Err(PlanError::validation(
            field,
            format!("expected a positive number, got {value}"),
        )),
    }
}

/// Checks a body measurement already in numeric form (weight or height).
pub fn positive_measure(field: &'static str, value: f64) -> Result<f64, PlanError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PlanError::validation(
            field,
            format!("expected a positive number, got {value}"),
        ))
    }
}

fn required_text(field: &'static str, value: Option<&Value>) -> Result<String, PlanError> {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(other) => Err(PlanError::validation(
            field,
            format!("expected a non-empty string, got {other}"),
        )),
        None => Err(PlanError::validation(field, "missing")),
    }
}

/// Upper-cases the first character and lower-cases the rest ("mALE" -> "Male").
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

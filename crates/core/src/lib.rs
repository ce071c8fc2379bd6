pub mod error;
pub mod health;
pub mod models;
pub mod planner;
pub mod profile;

pub use error::PlanError;
pub use health::{
    activity_label, activity_multiplier, basal_metabolic_rate, body_mass_index, calorie_target,
    goal_warning, total_daily_energy_expenditure, AgeGroup, BmiBand, HealthMetrics,
};
pub use models::*;
pub use planner::{generate_plan, meal_pool, workout_split, PlanInput, MEALS_PER_PLAN, MODEL_TYPE};
pub use profile::{positive_measure, ProfileRequest};

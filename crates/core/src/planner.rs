use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::PlanError;
use crate::health::HealthMetrics;
use crate::models::{FitnessPlan, FoodType, Goal};

pub const MEALS_PER_PLAN: usize = 4;
pub const MODEL_TYPE: &str = "KNN Classification";

const WORKOUT_STRATEGIES: [&str; 5] = [
    "Push/Pull/Legs split",
    "Upper/Lower hypertrophy split",
    "Full body strength program",
    "HIIT + resistance combination",
    "Heavy compound lift focus",
];

const MEAL_POOLS: &[(Goal, FoodType, &[&str])] = &[
    (
        Goal::Cut,
        FoodType::Nonveg,
        &[
            "Grilled chicken salad with olive oil",
            "Egg whites with spinach",
            "Baked salmon with broccoli",
            "Greek yogurt with chia seeds",
            "Lean turkey lettuce wraps",
            "Protein smoothie (low carb)",
            "Cottage cheese with almonds",
        ],
    ),
    (
        Goal::Cut,
        FoodType::Veg,
        &[
            "Paneer tikka salad with mint chutney",
            "Moong dal chilla with spinach",
            "Greek yogurt with chia seeds",
            "Cottage cheese with almonds",
            "Grilled vegetable and chickpea bowl",
            "Egg-free protein smoothie (low carb)",
            "Sprouts salad with lemon dressing",
        ],
    ),
    (
        Goal::Cut,
        FoodType::Vegan,
        &[
            "Tofu scramble with spinach",
            "Lentil soup with steamed greens",
            "Chickpea salad with olive oil",
            "Pea protein smoothie (low carb)",
            "Tempeh lettuce wraps",
            "Zucchini noodles with tomato sauce",
            "Edamame with roasted vegetables",
        ],
    ),
    (
        Goal::Bulk,
        FoodType::Nonveg,
        &[
            "Chicken rice bowl with avocado",
            "Oats with peanut butter and banana",
            "Steak with sweet potatoes",
            "Whole egg omelette with toast",
            "Protein shake with oats and milk",
            "Salmon with quinoa",
            "Greek yogurt with granola",
        ],
    ),
    (
        Goal::Bulk,
        FoodType::Veg,
        &[
            "Paneer rice bowl with avocado",
            "Oats with peanut butter and banana",
            "Rajma chawal with ghee",
            "Whole milk smoothie with dates and nuts",
            "Cheese and vegetable whole wheat wrap",
            "Quinoa with chickpeas and yogurt",
            "Greek yogurt with granola",
        ],
    ),
    (
        Goal::Bulk,
        FoodType::Vegan,
        &[
            "Tofu rice bowl with avocado",
            "Oats with peanut butter and banana",
            "Lentil pasta with marinara",
            "Soy milk protein shake with oats",
            "Tempeh quinoa bowl",
            "Black bean burrito with brown rice",
            "Chickpea curry with whole wheat roti",
        ],
    ),
    (
        Goal::Maintain,
        FoodType::Nonveg,
        &[
            "Balanced chicken plate with rice and veggies",
            "Omelette with whole grain toast",
            "Fish tacos with beans",
            "Protein smoothie with fruits",
            "Lean beef with brown rice",
            "Yogurt with nuts",
            "Tofu stir fry",
        ],
    ),
    (
        Goal::Maintain,
        FoodType::Veg,
        &[
            "Dal, rice and mixed vegetable plate",
            "Vegetable omelette with whole grain toast",
            "Paneer stir fry with brown rice",
            "Protein smoothie with fruits",
            "Bean and cheese tacos",
            "Yogurt with nuts",
            "Tofu stir fry",
        ],
    ),
    (
        Goal::Maintain,
        FoodType::Vegan,
        &[
            "Buddha bowl with quinoa and hummus",
            "Tofu stir fry",
            "Bean tacos with salsa",
            "Soy yogurt with nuts",
            "Lentil and brown rice plate",
            "Fruit smoothie with pea protein",
            "Chickpea and spinach curry",
        ],
    ),
];

/// Everything the templater needs about one routed request.
#[derive(Debug, Clone)]
pub struct PlanInput<'a> {
    pub plan_key: &'a str,
    pub age: u32,
    pub bmi: f64,
    pub activity: &'a str,
    pub goal: Goal,
    pub confidence: f64,
    pub food_type: FoodType,
}

pub fn meal_pool(goal: Goal, food_type: FoodType) -> &'static [&'static str] {
    MEAL_POOLS
        .iter()
        .find(|(pool_goal, pool_food, _)| *pool_goal == goal && *pool_food == food_type)
        .map(|(_, _, pool)| *pool)
        .unwrap_or(&[])
}

pub fn workout_split(goal: Goal) -> [&'static str; 5] {
    match goal {
        Goal::Cut => [
            "Day 1: Full Body + Cardio",
            "Day 2: HIIT Conditioning",
            "Day 3: Upper Body Strength",
            "Day 4: Cardio Endurance",
            "Day 5: Lower Body + Core",
        ],
        Goal::Bulk => [
            "Day 1: Chest & Triceps",
            "Day 2: Back & Biceps",
            "Day 3: Rest",
            "Day 4: Legs (Heavy)",
            "Day 5: Shoulders & Arms",
        ],
        Goal::Maintain => [
            "Day 1: Upper Body",
            "Day 2: Lower Body",
            "Day 3: Cardio / Sport",
            "Day 4: Upper Hypertrophy",
            "Day 5: Lower Hypertrophy",
        ],
    }
}

/// Draws `MEALS_PER_PLAN` distinct meals without replacement.
pub fn sample_meals<R>(pool_name: &str, pool: &[&str], rng: &mut R) -> Result<Vec<String>, PlanError>
where
    R: Rng + ?Sized,
{
    if pool.len() < MEALS_PER_PLAN {
        return Err(PlanError::InvalidPool {
            pool: pool_name.to_string(),
            available: pool.len(),
            required: MEALS_PER_PLAN,
        });
    }

    Ok(pool
        .choose_multiple(rng, MEALS_PER_PLAN)
        .map(|meal| meal.to_string())
        .collect())
}

pub fn generate_plan<R>(input: &PlanInput<'_>, rng: &mut R) -> Result<FitnessPlan, PlanError>
where
    R: Rng + ?Sized,
{
    if !(0.0..=1.0).contains(&input.confidence) {
        return Err(PlanError::validation(
            "confidence",
            format!("{} is outside [0, 1]", input.confidence),
        ));
    }

    let metrics = HealthMetrics::derive(input.age, input.bmi, input.activity);
    let intensity_note = metrics.bmi_band.intensity_note();
    let recovery_note = metrics.age_group.recovery_note();

    let pool_name = format!("{}/{}", input.goal.as_code(), input.food_type.as_code());
    let example_meals = sample_meals(&pool_name, meal_pool(input.goal, input.food_type), rng)?;

    let strategy = WORKOUT_STRATEGIES
        .choose(rng)
        .copied()
        .unwrap_or(WORKOUT_STRATEGIES[0]);

    let base_title = input.plan_key.replace('_', " ");
    let cluster_note = format!("Model assigned user to strategy cluster '{}'.", base_title);

    let explanation = format!(
        "KNN classifier routed request to '{}' expert model. {} BMI classification: {}. Age group: {}. {} Adaptive tuning applied: {} {}",
        input.goal.as_code().to_uppercase(),
        cluster_note,
        metrics.bmi_band.label(),
        metrics.age_group.as_code(),
        metrics.activity_label,
        intensity_note,
        recovery_note,
    );

    Ok(FitnessPlan {
        title: format!("{} (AI Personalized)", base_title),
        diet_strategy: format!(
            "{} Maintain high protein intake. Adjust calories according to {}.",
            intensity_note,
            input.goal.as_code()
        ),
        example_meals,
        workout_strategy: format!("{}. {}", strategy, recovery_note),
        workout_split: workout_split(input.goal)
            .iter()
            .map(|day| day.to_string())
            .collect(),
        explanation,
        confidence: round_percentage(input.confidence),
        model_type: MODEL_TYPE.to_string(),
    })
}

/// Probability in [0, 1] to a percentage with two decimals.
pub fn round_percentage(probability: f64) -> f64 {
    (probability * 100.0 * 100.0).round() / 100.0
}

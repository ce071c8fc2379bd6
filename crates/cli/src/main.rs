use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fitplan_core::{
    basal_metabolic_rate, body_mass_index, calorie_target, generate_plan, goal_warning,
    positive_measure, total_daily_energy_expenditure, FitnessPlan, FoodType, Goal, HealthMetrics,
    PlanInput, ProfileRequest,
};
use fitplan_ml::load_registry;
use fitplan_observability::{init_tracing, AppMetrics};
use fitplan_router::PlanRouter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

#[derive(Debug, Parser)]
#[command(name = "fitplan")]
#[command(about = "FitPlan recommendation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the full pipeline against a model artifact directory.
    Predict {
        #[arg(long, env = "FITPLAN_MODEL_DIR", default_value = "models")]
        model_dir: PathBuf,
        #[arg(long)]
        age: u32,
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        height: f64,
        #[arg(long)]
        gender: String,
        #[arg(long, default_value = "active")]
        activity: String,
        #[arg(long)]
        goal: String,
        #[arg(long)]
        food_type: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Render a plan for a known plan key without any model.
    Plan {
        #[arg(long)]
        plan_key: String,
        #[arg(long)]
        age: u32,
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        height: f64,
        #[arg(long, default_value = "active")]
        activity: String,
        #[arg(long)]
        goal: String,
        #[arg(long)]
        food_type: Option<String>,
        #[arg(long, default_value_t = 1.0)]
        confidence: f64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print BMI, brackets and daily energy figures for a profile.
    Metrics {
        #[arg(long)]
        age: u32,
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        height: f64,
        #[arg(long)]
        gender: String,
        #[arg(long, default_value = "active")]
        activity: String,
        /// Adds the calorie target and a BMI check for this goal.
        #[arg(long)]
        goal: Option<String>,
    },
}

fn main() -> Result<()> {
    init_tracing("fitplan_cli");
    let cli = Cli::parse();

    match cli.command {
        Command::Predict {
            model_dir,
            age,
            weight,
            height,
            gender,
            activity,
            goal,
            food_type,
            seed,
        } => {
            let registry = load_registry(&model_dir)?;
            let router = PlanRouter::new(Arc::new(registry), AppMetrics::shared());
            let request: ProfileRequest = serde_json::from_value(json!({
                "age": age,
                "weight": weight,
                "height": height,
                "gender": gender,
                "activity": activity,
                "goal": goal,
                "food_type": food_type,
            }))?;

            let plan = router.recommend_with_rng(request, &mut rng_for(seed))?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Plan {
            plan_key,
            age,
            weight,
            height,
            activity,
            goal,
            food_type,
            confidence,
            seed,
        } => {
            let plan = render_plan(
                &plan_key,
                age,
                weight,
                height,
                &activity,
                &goal,
                food_type.as_deref(),
                confidence,
                seed,
            )?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Metrics {
            age,
            weight,
            height,
            gender,
            activity,
            goal,
        } => {
            let report = metrics_report(age, weight, height, &gender, &activity, goal.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn render_plan(
    plan_key: &str,
    age: u32,
    weight: f64,
    height: f64,
    activity: &str,
    goal: &str,
    food_type: Option<&str>,
    confidence: f64,
    seed: Option<u64>,
) -> Result<FitnessPlan> {
    let goal = Goal::parse(goal).context("invalid --goal value")?;
    let weight = positive_measure("weight", weight).context("invalid --weight value")?;
    let height = positive_measure("height", height).context("invalid --height value")?;

    let input = PlanInput {
        plan_key,
        age,
        bmi: body_mass_index(weight, height),
        activity,
        goal,
        confidence,
        food_type: FoodType::from_optional_str(food_type),
    };
    Ok(generate_plan(&input, &mut rng_for(seed))?)
}

fn metrics_report(
    age: u32,
    weight: f64,
    height: f64,
    gender: &str,
    activity: &str,
    goal: Option<&str>,
) -> Result<Value> {
    let weight = positive_measure("weight", weight).context("invalid --weight value")?;
    let height = positive_measure("height", height).context("invalid --height value")?;
    let goal = goal
        .map(|raw| Goal::parse(raw).context("invalid --goal value"))
        .transpose()?;

    let metrics = HealthMetrics::derive(age, body_mass_index(weight, height), activity);
    let bmr = basal_metabolic_rate(weight, height, age, gender);
    let tdee = total_daily_energy_expenditure(bmr, activity);

    let mut report = json!({
        "bmi": metrics.bmi,
        "bmi_label": metrics.bmi_band.label(),
        "age_group": metrics.age_group,
        "activity_label": metrics.activity_label,
        "intensity_note": metrics.bmi_band.intensity_note(),
        "recovery_note": metrics.age_group.recovery_note(),
        "bmr": bmr.round() as i64,
        "tdee": tdee.round() as i64,
    });
    if let Some(goal) = goal {
        report["goal"] = json!(goal);
        report["calorie_target"] = json!(calorie_target(tdee, goal));
        report["goal_warning"] = json!(goal_warning(metrics.bmi, goal));
    }
    Ok(report)
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_rejects_non_positive_measurements() {
        let err = render_plan("cut_lean", 30, -70.0, 175.0, "active", "cut", None, 1.0, Some(1))
            .unwrap_err();
        assert!(format!("{err:#}").contains("invalid --weight value"));

        let err = render_plan("cut_lean", 30, 70.0, 0.0, "active", "cut", None, 1.0, Some(1))
            .unwrap_err();
        assert!(format!("{err:#}").contains("invalid --height value"));
    }

    #[test]
    fn plan_renders_for_a_valid_profile() {
        let plan = render_plan("cut_lean", 30, 70.0, 175.0, "active", "cut", Some("veg"), 0.5, Some(7))
            .unwrap();
        assert_eq!(plan.title, "cut lean (AI Personalized)");
        assert_eq!(plan.confidence, 50.0);
    }

    #[test]
    fn metrics_rejects_non_positive_measurements() {
        assert!(metrics_report(30, 0.0, 175.0, "male", "active", None).is_err());
        assert!(metrics_report(30, 70.0, -175.0, "male", "active", None).is_err());
    }

    #[test]
    fn metrics_reports_energy_figures_and_goal_check() {
        let report = metrics_report(30, 70.0, 175.0, "male", "moderate", Some("bulk")).unwrap();
        assert_eq!(report["bmi_label"], "Normal range");
        assert_eq!(report["bmr"], 1649);
        assert_eq!(report["tdee"], 2556);
        assert_eq!(report["goal"], "bulk");
        assert_eq!(report["calorie_target"], 2956);
        assert!(report["goal_warning"].is_null());

        let report = metrics_report(50, 110.0, 175.0, "female", "sedentary", Some("bulk")).unwrap();
        assert_eq!(report["bmi_label"], "Obese range");
        assert!(report["goal_warning"]
            .as_str()
            .unwrap()
            .starts_with("Bulking is not recommended"));

        let report = metrics_report(30, 70.0, 175.0, "male", "moderate", None).unwrap();
        assert!(report.get("calorie_target").is_none());
    }
}

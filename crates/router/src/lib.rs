use std::sync::Arc;
use std::time::Instant;

use fitplan_core::{
    body_mass_index, generate_plan, FitnessPlan, Goal, PlanError, PlanInput, Profile,
    ProfileRequest,
};
use fitplan_ml::{ModelError, ModelRegistry};
use fitplan_observability::AppMetrics;
use rand::Rng;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("unknown {field} value '{value}'")]
    UnknownCategory { field: &'static str, value: String },

    #[error("model failure: {0}")]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    InvalidGoal,
    UnknownCategory,
    InvalidPool,
    Model,
}

impl RouteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Plan(PlanError::Validation { .. }) => ErrorKind::Validation,
            Self::Plan(PlanError::InvalidGoal(_)) => ErrorKind::InvalidGoal,
            Self::Plan(PlanError::InvalidPool { .. }) => ErrorKind::InvalidPool,
            Self::UnknownCategory { .. } => ErrorKind::UnknownCategory,
            Self::Model(_) => ErrorKind::Model,
        }
    }
}

/// Outcome of dispatching a profile to its goal's expert model.
#[derive(Debug, Clone, PartialEq)]
pub struct Routing {
    pub goal: Goal,
    pub plan_key: String,
    pub confidence: f64,
}

#[derive(Clone)]
pub struct PlanRouter {
    models: Arc<ModelRegistry>,
    metrics: Arc<AppMetrics>,
}

impl PlanRouter {
    pub fn new(models: Arc<ModelRegistry>, metrics: Arc<AppMetrics>) -> Self {
        Self { models, metrics }
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    pub fn recommend(&self, request: ProfileRequest) -> Result<FitnessPlan, RouteError> {
        self.recommend_with_rng(request, &mut rand::thread_rng())
    }

    pub fn recommend_with_rng<R>(
        &self,
        request: ProfileRequest,
        rng: &mut R,
    ) -> Result<FitnessPlan, RouteError>
    where
        R: Rng + ?Sized,
    {
        let started = Instant::now();
        self.metrics.inc_request();

        let result = request
            .into_profile()
            .map_err(RouteError::from)
            .and_then(|profile| self.plan_for(&profile, rng));

        if let Err(error) = &result {
            self.metrics.inc_failure();
            warn!(error = %error, kind = ?error.kind(), "plan request rejected");
        }
        self.metrics.observe_latency(started.elapsed());
        result
    }

    pub fn plan_for<R>(&self, profile: &Profile, rng: &mut R) -> Result<FitnessPlan, RouteError>
    where
        R: Rng + ?Sized,
    {
        let routing = self.route(profile)?;
        let bmi = body_mass_index(profile.weight_kg, profile.height_cm);

        let plan = generate_plan(
            &PlanInput {
                plan_key: &routing.plan_key,
                age: profile.age,
                bmi,
                activity: profile.activity.as_label(),
                goal: routing.goal,
                confidence: routing.confidence,
                food_type: profile.food_type,
            },
            rng,
        )?;
        Ok(plan)
    }

    /// scale -> predict -> predict_proba -> inverse-map the class to a plan key.
    #[instrument(skip(self, profile), fields(goal = %profile.goal))]
    pub fn route(&self, profile: &Profile) -> Result<Routing, RouteError> {
        let gender_code = self
            .models
            .gender_encoder()
            .transform(&profile.gender)
            .map_err(|_| RouteError::UnknownCategory {
                field: "gender",
                value: profile.gender.clone(),
            })?;
        let activity_label = profile.activity.as_label();
        let activity_code = self
            .models
            .activity_encoder()
            .transform(activity_label)
            .map_err(|_| RouteError::UnknownCategory {
                field: "activity",
                value: activity_label.to_string(),
            })?;

        let expert = self.models.expert(profile.goal)?;
        info!("routing to expert model");

        let features = [
            profile.age as f64,
            profile.weight_kg,
            profile.height_cm,
            gender_code as f64,
            activity_code as f64,
        ];
        let scaled = expert.scaler.transform(&features)?;
        let class = expert.classifier.predict(&scaled)?;
        let probabilities = expert.classifier.predict_proba(&scaled)?;
        self.metrics.inc_ml_inference();

        let confidence = max_probability(&probabilities)?;
        let plan_key = self.models.plan_encoder().inverse_transform(class)?;

        self.metrics.inc_route(profile.goal);
        info!(plan_key = %plan_key, confidence, "plan recommended");

        Ok(Routing {
            goal: profile.goal,
            plan_key,
            confidence,
        })
    }
}

fn max_probability(probabilities: &[f64]) -> Result<f64, ModelError> {
    let confidence = probabilities
        .iter()
        .copied()
        .fold(None, |best: Option<f64>, p| match best {
            Some(current) if current >= p => Some(current),
            _ => Some(p),
        })
        .ok_or_else(|| ModelError::Invalid("empty probability vector".to_string()))?;

    if !(0.0..=1.0).contains(&confidence) {
        return Err(ModelError::Invalid(format!(
            "class probability {} is outside [0, 1]",
            confidence
        )));
    }
    Ok(confidence)
}

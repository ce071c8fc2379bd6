mod artifacts;
mod encoder;
mod knn;
mod scaler;

use std::collections::HashMap;
use std::sync::Arc;

use fitplan_core::Goal;
use thiserror::Error;

pub use artifacts::load_registry;
pub use encoder::LabelEncoder;
pub use knn::{KnnClassifier, ReferenceSample};
pub use scaler::StandardScaler;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("'{value}' is not a known {encoder} label")]
    UnknownLabel { encoder: String, value: String },

    #[error("class code {code} is out of range for {encoder}")]
    UnknownCode { encoder: String, code: usize },

    #[error("model has no reference samples")]
    EmptyModel,

    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("no expert model registered for goal '{0}'")]
    MissingExpert(Goal),
}

pub trait Scaler: Send + Sync {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;
}

pub trait Classifier: Send + Sync {
    /// Encoded class label of the winning class.
    fn predict(&self, features: &[f64]) -> Result<usize, ModelError>;

    /// One probability per known class, in the classifier's class order.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;
}

pub trait LabelCodec: Send + Sync {
    fn transform(&self, label: &str) -> Result<usize, ModelError>;
    fn inverse_transform(&self, code: usize) -> Result<String, ModelError>;
}

/// Scaler and classifier trained together for one goal.
#[derive(Clone)]
pub struct Expert {
    pub scaler: Arc<dyn Scaler>,
    pub classifier: Arc<dyn Classifier>,
}

/// Immutable set of loaded collaborators. Built once at startup and shared
/// read-only between requests.
#[derive(Clone)]
pub struct ModelRegistry {
    experts: HashMap<Goal, Expert>,
    plan_encoder: Arc<dyn LabelCodec>,
    gender_encoder: Arc<dyn LabelCodec>,
    activity_encoder: Arc<dyn LabelCodec>,
}

impl ModelRegistry {
    pub fn new(
        plan_encoder: Arc<dyn LabelCodec>,
        gender_encoder: Arc<dyn LabelCodec>,
        activity_encoder: Arc<dyn LabelCodec>,
    ) -> Self {
        Self {
            experts: HashMap::new(),
            plan_encoder,
            gender_encoder,
            activity_encoder,
        }
    }

    pub fn with_expert(
        mut self,
        goal: Goal,
        scaler: Arc<dyn Scaler>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        self.experts.insert(goal, Expert { scaler, classifier });
        self
    }

    pub fn expert(&self, goal: Goal) -> Result<&Expert, ModelError> {
        self.experts.get(&goal).ok_or(ModelError::MissingExpert(goal))
    }

    pub fn goals(&self) -> Vec<Goal> {
        Goal::ALL
            .into_iter()
            .filter(|goal| self.experts.contains_key(goal))
            .collect()
    }

    pub fn plan_encoder(&self) -> &dyn LabelCodec {
        self.plan_encoder.as_ref()
    }

    pub fn gender_encoder(&self) -> &dyn LabelCodec {
        self.gender_encoder.as_ref()
    }

    pub fn activity_encoder(&self) -> &dyn LabelCodec {
        self.activity_encoder.as_ref()
    }
}

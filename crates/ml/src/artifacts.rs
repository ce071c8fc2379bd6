use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use fitplan_core::Goal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use crate::{KnnClassifier, LabelEncoder, ModelRegistry, StandardScaler};

#[derive(Debug, Deserialize)]
struct EncoderArtifact {
    classes: Vec<String>,
}

/// Loads `scaler_<goal>.json`, `model_<goal>.json` for every goal plus the
/// `le_plan`, `le_gender` and `le_activity` encoders from `dir`.
pub fn load_registry(dir: impl AsRef<Path>) -> Result<ModelRegistry> {
    let dir = dir.as_ref();

    let plan_encoder = load_encoder(dir, "plan")?;
    let gender_encoder = load_encoder(dir, "gender")?;
    let activity_encoder = load_encoder(dir, "activity")?;

    let mut registry = ModelRegistry::new(
        Arc::new(plan_encoder),
        Arc::new(gender_encoder),
        Arc::new(activity_encoder),
    );

    for goal in Goal::ALL {
        let scaler: StandardScaler = read_json(dir, &format!("scaler_{}.json", goal.as_code()))?;
        let classifier: KnnClassifier = read_json(dir, &format!("model_{}.json", goal.as_code()))?;
        info!(
            goal = goal.as_code(),
            features = scaler.n_features(),
            classes = classifier.classes().len(),
            "expert model loaded"
        );
        registry = registry.with_expert(goal, Arc::new(scaler), Arc::new(classifier));
    }

    Ok(registry)
}

fn load_encoder(dir: &Path, name: &str) -> Result<LabelEncoder> {
    let artifact: EncoderArtifact = read_json(dir, &format!("le_{}.json", name))?;
    if artifact.classes.is_empty() {
        anyhow::bail!("label encoder '{}' has no classes", name);
    }
    let encoder = LabelEncoder::new(name, artifact.classes);
    info!(
        encoder = encoder.name(),
        classes = encoder.classes().len(),
        "label encoder loaded"
    );
    Ok(encoder)
}

fn read_json<T: DeserializeOwned>(dir: &Path, file_name: &str) -> Result<T> {
    let path = dir.join(file_name);
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed reading model artifact at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid model artifact at {}", path.display()))
}

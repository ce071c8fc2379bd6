use serde::Deserialize;

use crate::{Classifier, ModelError};

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceSample {
    pub features: Vec<f64>,
    pub label: usize,
}

/// Uniform-weight k-nearest-neighbour classifier over samples stored in
/// scaled feature space.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "KnnArtifact")]
pub struct KnnClassifier {
    k: usize,
    classes: Vec<usize>,
    samples: Vec<ReferenceSample>,
    n_features: usize,
}

#[derive(Debug, Deserialize)]
struct KnnArtifact {
    k: usize,
    classes: Vec<usize>,
    samples: Vec<ReferenceSample>,
}

impl TryFrom<KnnArtifact> for KnnClassifier {
    type Error = ModelError;

    fn try_from(artifact: KnnArtifact) -> Result<Self, Self::Error> {
        Self::new(artifact.k, artifact.classes, artifact.samples)
    }
}

impl KnnClassifier {
    pub fn new(
        k: usize,
        classes: Vec<usize>,
        samples: Vec<ReferenceSample>,
    ) -> Result<Self, ModelError> {
        let n_features = samples
            .first()
            .map(|sample| sample.features.len())
            .ok_or(ModelError::EmptyModel)?;

        if k == 0 || k > samples.len() {
            return Err(ModelError::Invalid(format!(
                "k={} must be between 1 and {} samples",
                k,
                samples.len()
            )));
        }
        if classes.is_empty() {
            return Err(ModelError::Invalid("classifier has no classes".to_string()));
        }
        for (idx, sample) in samples.iter().enumerate() {
            if sample.features.len() != n_features {
                return Err(ModelError::Invalid(format!(
                    "sample {} has {} features, expected {}",
                    idx,
                    sample.features.len(),
                    n_features
                )));
            }
            if !classes.contains(&sample.label) {
                return Err(ModelError::Invalid(format!(
                    "sample {} has label {} which is not a declared class",
                    idx, sample.label
                )));
            }
        }

        Ok(Self {
            k,
            classes,
            samples,
            n_features,
        })
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    fn nearest(&self, features: &[f64]) -> Result<Vec<&ReferenceSample>, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let mut ranked = self
            .samples
            .iter()
            .map(|sample| (squared_distance(&sample.features, features), sample))
            .collect::<Vec<_>>();
        // Stable sort keeps the earlier sample first on equal distances.
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(ranked
            .into_iter()
            .take(self.k)
            .map(|(_, sample)| sample)
            .collect())
    }
}

impl Classifier for KnnClassifier {
    fn predict(&self, features: &[f64]) -> Result<usize, ModelError> {
        let proba = self.predict_proba(features)?;

        // First maximum wins, so ties resolve to the lowest class.
        let mut best = 0;
        for (idx, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = idx;
            }
        }
        Ok(self.classes[best])
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        let neighbours = self.nearest(features)?;
        let mut votes = vec![0_usize; self.classes.len()];

        for sample in &neighbours {
            if let Some(idx) = self.classes.iter().position(|class| *class == sample.label) {
                votes[idx] += 1;
            }
        }

        Ok(votes
            .into_iter()
            .map(|count| count as f64 / self.k as f64)
            .collect())
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

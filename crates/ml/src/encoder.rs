use crate::{LabelCodec, ModelError};

/// Maps category labels to their index in a fixed, ordered class list.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    name: String,
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(name: impl Into<String>, classes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            classes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl LabelCodec for LabelEncoder {
    fn transform(&self, label: &str) -> Result<usize, ModelError> {
        self.classes
            .iter()
            .position(|class| class == label)
            .ok_or_else(|| ModelError::UnknownLabel {
                encoder: self.name.clone(),
                value: label.to_string(),
            })
    }

    fn inverse_transform(&self, code: usize) -> Result<String, ModelError> {
        self.classes
            .get(code)
            .cloned()
            .ok_or_else(|| ModelError::UnknownCode {
                encoder: self.name.clone(),
                code,
            })
    }
}

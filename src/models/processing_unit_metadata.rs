use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
#[serde(tag = "unit_name")]
#[serde(rename_all = "snake_case")]
pub enum ProcessingUnitMetadata {
    LogRegIntentClassifier,
}

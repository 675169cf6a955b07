mod processing_unit_metadata;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use self::processing_unit_metadata::ProcessingUnitMetadata;
use crate::utils::IntentName;

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelVersion {
    pub model_version: String,
}

/// Top level engine model, persisted as `nlu_engine.json` in the engine
/// directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct NluEngineModel {
    pub model_version: String,
    pub dataset_metadata: DatasetMetadata,
    /// Name of the intent classifier unit directory.
    pub intent_classifier: String,
    /// Name of the resources directory.
    pub resources: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub intents: Vec<IntentName>,
    pub nb_utterances: usize,
}

/// Trained logistic regression parameters, persisted as
/// `intent_classifier.json` in the classifier unit directory.
///
/// `weights` holds one row per class, aligned with `class_names`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentClassifierModel {
    pub class_names: Vec<IntentName>,
    pub intercept: Vec<f32>,
    pub weights: Vec<Vec<f32>>,
}

/// Fitted tf-idf vectorizer, persisted as `vectorizer.json` in the
/// classifier unit directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizerModel {
    pub vectorizer: TfidfVectorizerData,
    pub config: VectorizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizerData {
    pub vocab: HashMap<String, usize>,
    pub idf_diag: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerConfig {
    pub ngram_max: usize,
    pub max_features: usize,
    #[serde(default)]
    pub filter_stop_words: bool,
}

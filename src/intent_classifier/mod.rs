pub mod featurizer;
pub mod logreg;

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use failure::ResultExt;
use log::{debug, info};
use ndarray::prelude::*;

use self::featurizer::TfidfVectorizer;
use self::logreg::MulticlassLogisticRegression;
use crate::errors::*;
use crate::models::{IntentClassifierModel, ProcessingUnitMetadata};
use crate::ontology::IntentClassifierResult;
use crate::resources::SharedResources;
use crate::utils::IntentName;

pub trait IntentClassifier: Send + Sync {
    /// Classify the input, restricted to `intents_filter` when provided.
    fn get_intent(
        &self,
        input: &str,
        intents_filter: Option<&[&str]>,
    ) -> Result<IntentClassifierResult>;

    /// Confidence of every known intent, sorted by decreasing score.
    fn get_intents(&self, input: &str) -> Result<Vec<IntentClassifierResult>>;
}

pub fn build_intent_classifier<P: AsRef<Path>>(
    path: P,
    shared_resources: Arc<SharedResources>,
) -> Result<Box<dyn IntentClassifier>> {
    let metadata_path = path.as_ref().join("metadata.json");
    let metadata_file = File::open(&metadata_path).with_context(|_| {
        format!(
            "Could not open metadata file of intent classifier '{:?}'",
            metadata_path
        )
    })?;
    let metadata: ProcessingUnitMetadata = serde_json::from_reader(metadata_file)
        .with_context(|_| "Could not deserialize json metadata of intent classifier")?;
    match metadata {
        ProcessingUnitMetadata::LogRegIntentClassifier => Ok(Box::new(
            LogRegIntentClassifier::from_path(path, shared_resources)?,
        ) as _),
    }
}

/// Intent classification with a tf-idf featurizer and a multiclass logistic
/// regression.
pub struct LogRegIntentClassifier {
    class_names: Vec<IntentName>,
    featurizer: TfidfVectorizer,
    logreg: MulticlassLogisticRegression,
}

impl LogRegIntentClassifier {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        shared_resources: Arc<SharedResources>,
    ) -> Result<Self> {
        info!("Loading logreg intent classifier ({:?}) ...", path.as_ref());
        let classifier_model_path = path.as_ref().join("intent_classifier.json");
        let model_file = File::open(&classifier_model_path).with_context(|_| {
            format!(
                "Cannot open LogRegIntentClassifier file '{:?}'",
                &classifier_model_path
            )
        })?;
        let model: IntentClassifierModel = serde_json::from_reader(model_file)
            .with_context(|_| "Cannot deserialize LogRegIntentClassifier json data")?;
        let featurizer = TfidfVectorizer::from_path(&path, shared_resources)?;
        let classifier = Self::new(model, featurizer);
        info!("Logreg intent classifier loaded");
        classifier
    }

    pub fn new(model: IntentClassifierModel, featurizer: TfidfVectorizer) -> Result<Self> {
        let nb_classes = model.class_names.len();
        let nb_features = featurizer.nb_features();
        if model.intercept.len() != nb_classes || model.weights.len() != nb_classes {
            return Err(LogisticsNluError::InternalError(format!(
                "Intent classifier model has {} classes but {} intercepts and {} weight rows",
                nb_classes,
                model.intercept.len(),
                model.weights.len()
            ))
            .into());
        }
        if model.weights.iter().any(|row| row.len() != nb_features) {
            return Err(LogisticsNluError::InternalError(format!(
                "Intent classifier weight rows do not all have {} features",
                nb_features
            ))
            .into());
        }
        let weights =
            Array2::from_shape_fn((nb_features, nb_classes), |(feature_idx, class_idx)| {
                model.weights[class_idx][feature_idx]
            });
        let intercept = Array1::from(model.intercept);
        let logreg = MulticlassLogisticRegression::new(intercept, weights)?;
        Ok(Self {
            class_names: model.class_names,
            featurizer,
            logreg,
        })
    }
}

impl IntentClassifier for LogRegIntentClassifier {
    fn get_intent(
        &self,
        input: &str,
        intents_filter: Option<&[&str]>,
    ) -> Result<IntentClassifierResult> {
        debug!("Classifying intent...");
        let filtered_out_indexes = intents_filter.map(|filter| {
            self.class_names
                .iter()
                .enumerate()
                .filter(|(_, name)| !filter.contains(&name.as_str()))
                .map(|(index, _)| index)
                .collect::<Vec<_>>()
        });
        if let Some(indexes) = filtered_out_indexes.as_ref() {
            if indexes.len() == self.class_names.len() {
                return Ok(IntentClassifierResult {
                    intent_name: None,
                    confidence_score: 0.0,
                });
            }
        }
        let features = self.featurizer.transform(input)?;
        let probabilities = self.logreg.run(&features.view(), filtered_out_indexes)?;
        let best = probabilities
            .indexed_iter()
            .max_by(|(_, lhs), (_, rhs)| {
                lhs.partial_cmp(rhs)
                    .unwrap_or(::std::cmp::Ordering::Equal)
            })
            .map(|(index, score)| (index, *score));
        let result = best
            .map(|(index, score)| IntentClassifierResult {
                intent_name: Some(self.class_names[index].clone()),
                confidence_score: score,
            })
            .unwrap_or_else(|| IntentClassifierResult {
                intent_name: None,
                confidence_score: 0.0,
            });
        debug!("Intent found: '{:?}'", result.intent_name);
        Ok(result)
    }

    fn get_intents(&self, input: &str) -> Result<Vec<IntentClassifierResult>> {
        let features = self.featurizer.transform(input)?;
        let probabilities = self.logreg.run(&features.view(), None)?;
        let mut results: Vec<IntentClassifierResult> = self
            .class_names
            .iter()
            .zip(probabilities.iter())
            .map(|(name, score)| IntentClassifierResult {
                intent_name: Some(name.clone()),
                confidence_score: *score,
            })
            .collect();
        results.sort_by(|lhs, rhs| {
            rhs.confidence_score
                .partial_cmp(&lhs.confidence_score)
                .unwrap_or(::std::cmp::Ordering::Equal)
        });
        Ok(results)
    }
}

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use failure::ResultExt;
use log::info;
use ndarray::prelude::*;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::errors::*;
use crate::intent_classifier::featurizer::TfidfVectorizer;
use crate::intent_classifier::{logreg, IntentClassifier, LogRegIntentClassifier};
use crate::models::{
    DatasetMetadata, IntentClassifierModel, NluEngineModel, ProcessingUnitMetadata,
    TfidfVectorizerModel, VectorizerConfig,
};
use crate::resources::SharedResources;
use crate::utils::IntentName;

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f32,
    pub l2_penalty: f32,
    pub vectorizer: VectorizerConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 300,
            learning_rate: 1.0,
            l2_penalty: 1e-4,
            vectorizer: VectorizerConfig {
                ngram_max: 2,
                max_features: 500,
                filter_stop_words: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub intent: IntentName,
}

/// Labelled training utterances, loaded from a `text,intent` CSV file.
///
/// The intent is the last comma separated field of each line, so utterance
/// texts may themselves contain commas.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub utterances: Vec<Utterance>,
}

impl Dataset {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = fs::File::open(&path)
            .with_context(|_| format!("Cannot open dataset file {:?}", path.as_ref()))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = BufReader::new(reader);
        let mut utterances = Vec::new();
        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if line_index == 0 && trimmed.eq_ignore_ascii_case("text,intent") {
                continue;
            }
            let mut fields = trimmed.rsplitn(2, ',');
            let intent = fields.next().map(|field| field.trim()).unwrap_or("");
            let text = fields.next().map(|field| field.trim()).ok_or_else(|| {
                LogisticsNluError::InvalidDataset(format!(
                    "Line {} has no intent column: '{}'",
                    line_index + 1,
                    trimmed
                ))
            })?;
            let text = text.trim_matches('"').trim();
            if text.is_empty() || intent.is_empty() {
                return Err(LogisticsNluError::InvalidDataset(format!(
                    "Line {} has an empty text or intent",
                    line_index + 1
                ))
                .into());
            }
            utterances.push(Utterance {
                text: text.to_string(),
                intent: intent.to_string(),
            });
        }
        let dataset = Self { utterances };
        if dataset.utterances.is_empty() {
            return Err(
                LogisticsNluError::InvalidDataset("Dataset has no utterances".to_string()).into(),
            );
        }
        if dataset.intents().len() < 2 {
            return Err(LogisticsNluError::InvalidDataset(
                "Dataset must contain at least two distinct intents".to_string(),
            )
            .into());
        }
        Ok(dataset)
    }

    /// Distinct intents of the dataset, sorted for deterministic class order.
    pub fn intents(&self) -> Vec<IntentName> {
        let mut intents: Vec<IntentName> = self
            .utterances
            .iter()
            .map(|utterance| utterance.intent.clone())
            .collect();
        intents.sort();
        intents.dedup();
        intents
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntentMetrics {
    pub precision: f32,
    pub recall: f32,
    pub nb_utterances: usize,
}

/// Metrics computed on the training set after fitting, as a sanity check of
/// the fitted model.
#[derive(Debug, Clone)]
pub struct TrainingMetrics {
    pub accuracy: f32,
    pub per_intent: HashMap<IntentName, IntentMetrics>,
}

/// A fitted engine, ready to be persisted with [`TrainedNluEngine::save`].
pub struct TrainedNluEngine {
    engine_model: NluEngineModel,
    classifier_model: IntentClassifierModel,
    vectorizer_model: TfidfVectorizerModel,
    metrics: TrainingMetrics,
}

impl TrainedNluEngine {
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Write the loadable engine directory layout, copying the resources
    /// from `resources_dir` into the engine.
    pub fn save<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        engine_dir: P,
        resources_dir: Q,
    ) -> Result<()> {
        let engine_dir = engine_dir.as_ref();
        fs::create_dir_all(engine_dir)
            .with_context(|_| format!("Cannot create engine directory {:?}", engine_dir))?;
        let engine_model_file = fs::File::create(engine_dir.join("nlu_engine.json"))?;
        serde_json::to_writer_pretty(engine_model_file, &self.engine_model)?;

        let classifier_dir = engine_dir.join(&self.engine_model.intent_classifier);
        fs::create_dir_all(&classifier_dir)?;
        let metadata_file = fs::File::create(classifier_dir.join("metadata.json"))?;
        serde_json::to_writer_pretty(
            metadata_file,
            &ProcessingUnitMetadata::LogRegIntentClassifier,
        )?;
        let classifier_file = fs::File::create(classifier_dir.join("intent_classifier.json"))?;
        serde_json::to_writer_pretty(classifier_file, &self.classifier_model)?;
        let vectorizer_file = fs::File::create(classifier_dir.join("vectorizer.json"))?;
        serde_json::to_writer_pretty(vectorizer_file, &self.vectorizer_model)?;

        let resources_dest = engine_dir.join(&self.engine_model.resources);
        copy_dir_recursive(resources_dir.as_ref(), &resources_dest).with_context(|_| {
            format!(
                "Cannot copy resources from {:?} into the engine directory",
                resources_dir.as_ref()
            )
        })?;
        info!("Engine saved to {:?}", engine_dir);
        Ok(())
    }

    /// Zip archive equivalent of [`TrainedNluEngine::save`], with the engine
    /// files under a top level `nlu_engine/` directory.
    pub fn save_zip<W: io::Write + io::Seek, Q: AsRef<Path>>(
        &self,
        writer: W,
        resources_dir: Q,
    ) -> Result<()> {
        let temp_dir = tempfile::Builder::new().prefix("nlu_engine_zip_").tempdir()?;
        let engine_dir = temp_dir.path().join("nlu_engine");
        self.save(&engine_dir, resources_dir)?;

        let mut zip_writer = ZipWriter::new(writer);
        let options = FileOptions::default();
        zip_directory_contents(&mut zip_writer, temp_dir.path(), temp_dir.path(), options)?;
        zip_writer.finish()?;
        Ok(())
    }
}

/// Fit the intent classifier on the dataset and assemble the engine models.
pub fn train(
    dataset: &Dataset,
    shared_resources: Arc<SharedResources>,
    config: &TrainingConfig,
) -> Result<TrainedNluEngine> {
    let class_names = dataset.intents();
    info!(
        "Training intent classifier on {} utterances with {} intents...",
        dataset.utterances.len(),
        class_names.len()
    );
    let targets: Vec<usize> = dataset
        .utterances
        .iter()
        .map(|utterance| {
            class_names
                .iter()
                .position(|name| *name == utterance.intent)
                .ok_or_else(|| {
                    LogisticsNluError::InternalError(format!(
                        "Intent '{}' missing from class names",
                        utterance.intent
                    ))
                    .into()
                })
        })
        .collect::<Result<_>>()?;
    let texts: Vec<String> = dataset
        .utterances
        .iter()
        .map(|utterance| utterance.text.clone())
        .collect();

    let vectorizer_model = TfidfVectorizer::fit(&texts, &config.vectorizer, &shared_resources)?;
    let vectorizer = TfidfVectorizer::new(vectorizer_model.clone(), shared_resources)?;

    let nb_features = vectorizer.nb_features();
    let mut features = Array2::<f32>::zeros((texts.len(), nb_features));
    for (index, text) in texts.iter().enumerate() {
        let sample = vectorizer.transform(text)?;
        features.row_mut(index).assign(&sample);
    }

    let (intercept, weights) = logreg::fit(
        &features,
        &targets,
        class_names.len(),
        config.epochs,
        config.learning_rate,
        config.l2_penalty,
    )?;
    let classifier_model = IntentClassifierModel {
        class_names: class_names.clone(),
        intercept: intercept.to_vec(),
        weights: (0..class_names.len())
            .map(|class_index| weights.column(class_index).to_vec())
            .collect(),
    };

    let classifier = LogRegIntentClassifier::new(classifier_model.clone(), vectorizer)?;
    let metrics = compute_metrics(&classifier, dataset, &class_names)?;
    info!(
        "Training done, accuracy on training set: {:.2}",
        metrics.accuracy
    );

    let engine_model = NluEngineModel {
        model_version: crate::MODEL_VERSION.to_string(),
        dataset_metadata: DatasetMetadata {
            intents: class_names,
            nb_utterances: dataset.utterances.len(),
        },
        intent_classifier: "intent_classifier".to_string(),
        resources: "resources".to_string(),
    };

    Ok(TrainedNluEngine {
        engine_model,
        classifier_model,
        vectorizer_model,
        metrics,
    })
}

fn compute_metrics(
    classifier: &LogRegIntentClassifier,
    dataset: &Dataset,
    class_names: &[IntentName],
) -> Result<TrainingMetrics> {
    let mut nb_correct = 0usize;
    let mut true_positives: HashMap<&str, usize> = HashMap::new();
    let mut predicted_counts: HashMap<&str, usize> = HashMap::new();
    let mut actual_counts: HashMap<&str, usize> = HashMap::new();

    let mut predictions: Vec<Option<IntentName>> = Vec::with_capacity(dataset.utterances.len());
    for utterance in dataset.utterances.iter() {
        let result = classifier.get_intent(&utterance.text, None)?;
        predictions.push(result.intent_name);
    }
    for (utterance, prediction) in dataset.utterances.iter().zip(predictions.iter()) {
        *actual_counts.entry(utterance.intent.as_str()).or_insert(0) += 1;
        if let Some(predicted) = prediction.as_ref() {
            *predicted_counts
                .entry(lookup_name(class_names, predicted))
                .or_insert(0) += 1;
            if *predicted == utterance.intent {
                nb_correct += 1;
                *true_positives.entry(utterance.intent.as_str()).or_insert(0) += 1;
            }
        }
    }

    let per_intent = class_names
        .iter()
        .map(|intent| {
            let tp = *true_positives.get(intent.as_str()).unwrap_or(&0) as f32;
            let nb_predicted = *predicted_counts.get(intent.as_str()).unwrap_or(&0) as f32;
            let nb_actual = *actual_counts.get(intent.as_str()).unwrap_or(&0) as f32;
            let metrics = IntentMetrics {
                precision: if nb_predicted > 0. { tp / nb_predicted } else { 0. },
                recall: if nb_actual > 0. { tp / nb_actual } else { 0. },
                nb_utterances: nb_actual as usize,
            };
            (intent.clone(), metrics)
        })
        .collect();

    Ok(TrainingMetrics {
        accuracy: nb_correct as f32 / dataset.utterances.len() as f32,
        per_intent,
    })
}

// Interns the predicted name so the count maps can borrow from class_names.
fn lookup_name<'a>(class_names: &'a [IntentName], name: &str) -> &'a str {
    class_names
        .iter()
        .find(|candidate| *candidate == name)
        .map(|candidate| candidate.as_str())
        .unwrap_or("")
}

fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let entry_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry_path, &dest_path)?;
        } else {
            fs::copy(&entry_path, &dest_path)?;
        }
    }
    Ok(())
}

fn zip_directory_contents<W: io::Write + io::Seek>(
    zip_writer: &mut ZipWriter<W>,
    root: &Path,
    dir: &Path,
    options: FileOptions,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry.file_type()?.is_dir() {
            zip_directory_contents(zip_writer, root, &entry_path, options)?;
        } else {
            let relative_path = entry_path
                .strip_prefix(root)
                .map_err(|_| {
                    LogisticsNluError::InternalError(format!(
                        "Path {:?} is not under the engine directory",
                        entry_path
                    ))
                })?
                .to_string_lossy()
                .replace('\\', "/");
            zip_writer.start_file(relative_path, options)?;
            let mut file = fs::File::open(&entry_path)?;
            io::copy(&mut file, zip_writer)?;
        }
    }
    Ok(())
}

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use failure::{bail, format_err, ResultExt};
use log::info;
use zip::ZipArchive;

use crate::action_decider::ActionDecider;
use crate::entity_extractor::{CachingEntityExtractor, EntityExtractor, RuleBasedEntityExtractor};
use crate::errors::*;
use crate::intent_classifier::{build_intent_classifier, IntentClassifier};
use crate::models::{DatasetMetadata, ModelVersion, NluEngineModel};
use crate::ontology::{Entities, IntentClassifierResult, QueryResult};
use crate::resources::loading::load_shared_resources;

const ENTITY_CACHE_CAPACITY: usize = 1000;

/// The full voice-to-action pipeline: intent classification, entity
/// extraction and action decision over a single query.
pub struct LogisticsNluEngine {
    dataset_metadata: DatasetMetadata,
    intent_classifier: Box<dyn IntentClassifier>,
    entity_extractor: CachingEntityExtractor<RuleBasedEntityExtractor>,
    action_decider: ActionDecider,
}

impl LogisticsNluEngine {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Loading nlu engine ({:?}) ...", path.as_ref());
        let model = Self::load_model(&path)?;

        let resources_path = path.as_ref().join(&model.resources);
        let shared_resources = load_shared_resources(&resources_path)?;

        let classifier_path = path.as_ref().join(&model.intent_classifier);
        let intent_classifier = build_intent_classifier(classifier_path, shared_resources.clone())?;

        let entity_extractor = CachingEntityExtractor::new(
            RuleBasedEntityExtractor::new(shared_resources)?,
            ENTITY_CACHE_CAPACITY,
        );

        info!("Nlu engine loaded");
        Ok(Self {
            dataset_metadata: model.dataset_metadata,
            intent_classifier,
            entity_extractor,
            action_decider: ActionDecider::new(),
        })
    }

    pub fn from_zip<R: io::Read + io::Seek>(reader: R) -> Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix("temp_dir_nlu_").tempdir()?;
        let temp_dir_path = temp_dir.path();
        let engine_dir_path = extract_nlu_engine_zip_archive(reader, temp_dir_path)?;
        LogisticsNluEngine::from_path(engine_dir_path)
    }

    fn check_model_version<P: AsRef<Path>>(path: P) -> Result<()> {
        let model_file = fs::File::open(&path)?;

        let model_version: ModelVersion = serde_json::from_reader(model_file)?;
        if model_version.model_version != crate::MODEL_VERSION {
            bail!(LogisticsNluError::WrongModelVersion {
                model: model_version.model_version,
                runner: crate::MODEL_VERSION
            });
        }
        Ok(())
    }

    fn load_model<P: AsRef<Path>>(path: P) -> Result<NluEngineModel> {
        let engine_model_path = path.as_ref().join("nlu_engine.json");
        Self::check_model_version(&engine_model_path).with_context(|_| {
            LogisticsNluError::ModelLoad(engine_model_path.to_string_lossy().to_string())
        })?;
        let model_file = fs::File::open(&engine_model_path)
            .with_context(|_| format!("Could not open nlu engine file {:?}", &engine_model_path))?;
        let model = serde_json::from_reader(model_file)
            .with_context(|_| format!("Invalid nlu engine file {:?}", &engine_model_path))?;
        Ok(model)
    }

    /// Intents the engine was trained on.
    pub fn intents(&self) -> &[String] {
        &self.dataset_metadata.intents
    }
}

impl LogisticsNluEngine {
    /// Run the full pipeline on the input, optionally restricting the
    /// classification to a whitelist of intents.
    pub fn parse<'a, W>(&self, input: &str, intents_whitelist: W) -> Result<QueryResult>
    where
        W: Into<Option<Vec<&'a str>>>,
    {
        let query = self.validate_query(input)?;
        let intents_whitelist = intents_whitelist.into();
        self.validate_whitelist(intents_whitelist.as_ref())?;

        let mut intent = self
            .intent_classifier
            .get_intent(query, intents_whitelist.as_deref())?;
        intent.confidence_score = round_confidence(intent.confidence_score);

        let entities = self.entity_extractor.extract(query)?;
        let next_action = self.action_decider.decide_action(&intent, &entities);

        Ok(QueryResult {
            query: query.to_string(),
            intent,
            entities,
            next_action,
        })
    }

    /// Confidence of every known intent, sorted by decreasing score.
    pub fn get_intents(&self, input: &str) -> Result<Vec<IntentClassifierResult>> {
        let query = self.validate_query(input)?;
        let mut results = self.intent_classifier.get_intents(query)?;
        for result in results.iter_mut() {
            result.confidence_score = round_confidence(result.confidence_score);
        }
        Ok(results)
    }

    /// Entity extraction only, without classification.
    pub fn extract_entities(&self, input: &str) -> Result<Entities> {
        let query = self.validate_query(input)?;
        self.entity_extractor.extract(query)
    }

    fn validate_query<'q>(&self, input: &'q str) -> Result<&'q str> {
        let query = input.trim();
        if query.is_empty() {
            return Err(LogisticsNluError::EmptyQuery.into());
        }
        Ok(query)
    }

    fn validate_whitelist(&self, intents_whitelist: Option<&Vec<&str>>) -> Result<()> {
        let known_intents: HashSet<&str> = self
            .dataset_metadata
            .intents
            .iter()
            .map(|intent| intent.as_str())
            .collect();
        if let Some(unknown_intent) = intents_whitelist
            .into_iter()
            .flatten()
            .find(|intent| !known_intents.contains(*intent))
        {
            return Err(format_err!(
                "Cannot use unknown intent '{}' in intents filter",
                unknown_intent
            ));
        }
        Ok(())
    }
}

/// The classifier works in full precision; the reported confidence is
/// rounded to 2 decimals at the API boundary.
fn round_confidence(score: f32) -> f32 {
    (score * 100.).round() / 100.
}

fn extract_nlu_engine_zip_archive<R: io::Read + io::Seek>(
    zip_reader: R,
    dest_path: &Path,
) -> Result<PathBuf> {
    let mut archive =
        ZipArchive::new(zip_reader).with_context(|_| "Could not read nlu engine zip data")?;
    for file_index in 0..archive.len() {
        let mut file = archive.by_index(file_index)?;
        let outpath = dest_path.join(file.mangled_name());

        if file.name().ends_with('/') || file.name().ends_with('\\') {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                if !parent.exists() {
                    fs::create_dir_all(&parent)?;
                }
            }
            let mut outfile = fs::File::create(&outpath)?;
            io::copy(&mut file, &mut outfile)?;
        }
    }
    let first_archive_file = archive.by_index(0)?.mangled_name();
    let engine_dir_path = first_archive_file
        .components()
        .find(|component| matches!(component, Component::Normal(_)))
        .ok_or_else(|| format_err!("Trained engine archive is incorrect"))?
        .as_os_str();
    let engine_dir_name = engine_dir_path
        .to_str()
        .ok_or_else(|| format_err!("Engine directory name is empty"))?;
    Ok(dest_path.join(engine_dir_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::ActionPlan;
    use crate::testutils::{sample_dataset, write_sample_resources};
    use crate::training::{train, TrainingConfig};
    use std::io::Cursor;

    fn trained_engine_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let resources_dir = dir.path().join("resources_src");
        write_sample_resources(&resources_dir);
        let trained = train(
            &sample_dataset(),
            load_shared_resources(&resources_dir).unwrap(),
            &TrainingConfig::default(),
        )
        .unwrap();
        trained.save(dir.path().join("nlu_engine"), &resources_dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_rate_query() {
        // Given
        let engine_dir = trained_engine_dir();
        let engine = LogisticsNluEngine::from_path(engine_dir.path().join("nlu_engine")).unwrap();

        // When
        let result = engine
            .parse("Bhai price batao Mumbai to Pune 10kg", None)
            .unwrap();

        // Then
        assert_eq!(Some("CHECK_RATE".to_string()), result.intent.intent_name);
        assert!(result.intent.confidence_score > 0.0);
        assert_eq!(Some("Mumbai".to_string()), result.entities.pickup_location);
        assert_eq!(Some("Pune".to_string()), result.entities.drop_location);
        assert_eq!(Some(10.0), result.entities.weight_kg);
        match result.next_action {
            ActionPlan::CalculateRate { parameters, .. } => {
                assert_eq!("Mumbai", parameters.from);
                assert_eq!("Pune", parameters.to);
                assert_eq!(10.0, parameters.weight);
            }
            other => panic!("Unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_parse_booking_query_asks_for_optional_fields() {
        // Given
        let engine_dir = trained_engine_dir();
        let engine = LogisticsNluEngine::from_path(engine_dir.path().join("nlu_engine")).unwrap();

        // When
        let result = engine
            .parse("Pickup karna hai Andheri se Powai, 2 boxes hai", None)
            .unwrap();

        // Then
        assert_eq!(Some("BOOK_PICKUP".to_string()), result.intent.intent_name);
        assert_eq!(Some("Andheri".to_string()), result.entities.pickup_location);
        assert_eq!(Some("Powai".to_string()), result.entities.drop_location);
        assert_eq!(Some(2), result.entities.packages);
        match result.next_action {
            ActionPlan::AskOptionalFields { can_proceed, .. } => assert!(can_proceed),
            other => panic!("Unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_parse_with_whitelist() {
        // Given
        let engine_dir = trained_engine_dir();
        let engine = LogisticsNluEngine::from_path(engine_dir.path().join("nlu_engine")).unwrap();

        // When
        let result = engine
            .parse("Bhai price batao Mumbai to Pune 10kg", vec!["TRACK_ORDER"])
            .unwrap();

        // Then
        assert_eq!(Some("TRACK_ORDER".to_string()), result.intent.intent_name);
    }

    #[test]
    fn test_parse_with_unknown_whitelist_intent_fails() {
        // Given
        let engine_dir = trained_engine_dir();
        let engine = LogisticsNluEngine::from_path(engine_dir.path().join("nlu_engine")).unwrap();

        // When
        let result = engine.parse("price batao", vec!["MAKE_COFFEE"]);

        // Then
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_empty_query_fails() {
        // Given
        let engine_dir = trained_engine_dir();
        let engine = LogisticsNluEngine::from_path(engine_dir.path().join("nlu_engine")).unwrap();

        // When
        let result = engine.parse("   ", None);

        // Then
        assert!(result.is_err());
    }

    #[test]
    fn test_get_intents_returns_all_intents_sorted() {
        // Given
        let engine_dir = trained_engine_dir();
        let engine = LogisticsNluEngine::from_path(engine_dir.path().join("nlu_engine")).unwrap();

        // When
        let intents = engine.get_intents("mera order track karo").unwrap();

        // Then
        assert_eq!(engine.intents().len(), intents.len());
        assert_eq!(Some("TRACK_ORDER".to_string()), intents[0].intent_name);
        for window in intents.windows(2) {
            assert!(window[0].confidence_score >= window[1].confidence_score);
        }
    }

    #[test]
    fn test_extract_entities_only() {
        // Given
        let engine_dir = trained_engine_dir();
        let engine = LogisticsNluEngine::from_path(engine_dir.path().join("nlu_engine")).unwrap();

        // When
        let entities = engine
            .extract_entities("COD me 3 parcels bhejne hai Delhi se Bangalore")
            .unwrap();

        // Then
        assert_eq!(Some(3), entities.packages);
        assert_eq!(Some("Delhi".to_string()), entities.pickup_location);
    }

    #[test]
    fn test_load_from_zip() {
        // Given
        let dir = tempfile::tempdir().unwrap();
        let resources_dir = dir.path().join("resources_src");
        write_sample_resources(&resources_dir);
        let trained = train(
            &sample_dataset(),
            load_shared_resources(&resources_dir).unwrap(),
            &TrainingConfig::default(),
        )
        .unwrap();
        let mut zip_bytes = Cursor::new(Vec::new());
        trained.save_zip(&mut zip_bytes, &resources_dir).unwrap();
        zip_bytes.set_position(0);

        // When
        let engine = LogisticsNluEngine::from_zip(zip_bytes).unwrap();

        // Then
        let result = engine.parse("mera order track karo", None).unwrap();
        assert_eq!(Some("TRACK_ORDER".to_string()), result.intent.intent_name);
    }

    #[test]
    fn test_from_path_rejects_wrong_model_version() {
        // Given
        let engine_dir = tempfile::tempdir().unwrap();
        fs::write(
            engine_dir.path().join("nlu_engine.json"),
            r#"{"model_version": "0.0.0"}"#,
        )
        .unwrap();

        // When
        let engine = LogisticsNluEngine::from_path(engine_dir.path());

        // Then
        assert!(engine.is_err());
    }
}

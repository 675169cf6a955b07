use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use failure::ResultExt;
use itertools::Itertools;
use ndarray::prelude::*;

use crate::errors::*;
use crate::models::{TfidfVectorizerData, TfidfVectorizerModel, VectorizerConfig};
use crate::resources::SharedResources;
use crate::utils::{compute_all_ngrams, tokenize_light};

/// Tf-idf featurization of preprocessed queries, over word n-grams.
///
/// The vocabulary and inverse document frequencies are fitted on the training
/// corpus and persisted in the engine model.
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf_diag: Vec<f32>,
    ngram_max: usize,
    stop_words: HashSet<String>,
}

impl TfidfVectorizer {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        shared_resources: Arc<SharedResources>,
    ) -> Result<Self> {
        let vectorizer_model_path = path.as_ref().join("vectorizer.json");
        let model_file = File::open(&vectorizer_model_path).with_context(|_| {
            format!(
                "Cannot open TfidfVectorizer file '{:?}'",
                &vectorizer_model_path
            )
        })?;
        let model: TfidfVectorizerModel = serde_json::from_reader(model_file)
            .with_context(|_| "Cannot deserialize TfidfVectorizer json data")?;
        Self::new(model, shared_resources)
    }

    pub fn new(
        model: TfidfVectorizerModel,
        shared_resources: Arc<SharedResources>,
    ) -> Result<Self> {
        let vocabulary = model.vectorizer.vocab;
        let idf_diag = model.vectorizer.idf_diag;
        if vocabulary.is_empty() {
            return Err(LogisticsNluError::InternalError(
                "Tf-idf vectorizer has an empty vocabulary".to_string(),
            )
            .into());
        }
        let stop_words = if model.config.filter_stop_words {
            shared_resources.stop_words.clone()
        } else {
            HashSet::new()
        };
        Ok(Self {
            vocabulary,
            idf_diag,
            ngram_max: model.config.ngram_max,
            stop_words,
        })
    }

    /// Fit the vocabulary and idf weights on the training utterances.
    ///
    /// The vocabulary is capped at `config.max_features` terms, keeping the
    /// most frequent ones (ties broken lexicographically); indexes are then
    /// assigned in lexicographic order so that fitting is deterministic.
    pub fn fit(
        utterances: &[String],
        config: &VectorizerConfig,
        shared_resources: &SharedResources,
    ) -> Result<TfidfVectorizerModel> {
        if utterances.is_empty() {
            return Err(
                LogisticsNluError::InvalidDataset("No utterances to fit on".to_string()).into(),
            );
        }
        let stop_words: HashSet<String> = if config.filter_stop_words {
            shared_resources.stop_words.clone()
        } else {
            HashSet::new()
        };
        let mut document_freq: HashMap<String, usize> = HashMap::new();
        let mut corpus_freq: HashMap<String, usize> = HashMap::new();
        for utterance in utterances {
            let ngrams = extract_ngrams(utterance, config.ngram_max, &stop_words);
            for ngram in ngrams.iter() {
                *corpus_freq.entry(ngram.clone()).or_insert(0) += 1;
            }
            for ngram in ngrams.iter().unique() {
                *document_freq.entry(ngram.clone()).or_insert(0) += 1;
            }
        }

        let selected_terms: Vec<String> = corpus_freq
            .iter()
            .sorted_by(|(lhs_term, lhs_count), (rhs_term, rhs_count)| {
                rhs_count.cmp(lhs_count).then(lhs_term.cmp(rhs_term))
            })
            .take(config.max_features)
            .map(|(term, _)| term.clone())
            .sorted()
            .collect();

        let nb_documents = utterances.len() as f32;
        let idf_diag = selected_terms
            .iter()
            .map(|term| {
                let df = document_freq[term] as f32;
                ((1. + nb_documents) / (1. + df)).ln() + 1.
            })
            .collect();
        let vocab = selected_terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        Ok(TfidfVectorizerModel {
            vectorizer: TfidfVectorizerData { vocab, idf_diag },
            config: config.clone(),
        })
    }

    pub fn transform(&self, utterance: &str) -> Result<Array1<f32>> {
        let ngrams = extract_ngrams(utterance, self.ngram_max, &self.stop_words);

        let vocabulary_size = self.vocabulary.values().max().map(|max| max + 1).ok_or_else(
            || LogisticsNluError::InternalError("Empty vectorizer vocabulary".to_string()),
        )?;
        let mut features: Vec<f32> = vec![0.; vocabulary_size];
        let mut match_idx: HashSet<usize> = HashSet::new();
        for ngram in ngrams {
            if let Some(ngram_idx) = self.vocabulary.get(&ngram) {
                features[*ngram_idx] += 1.;
                match_idx.insert(*ngram_idx);
            }
        }

        for ix in match_idx {
            features[ix] *= self.idf_diag[ix]
        }

        // Normalize tf-idf
        let l2_norm: f32 = features.iter().fold(0., |norm, v| norm + v * v).sqrt();
        let safe_l2_norm = if l2_norm > 0. { l2_norm } else { 1. };
        let features = features.iter().map(|c| *c / safe_l2_norm).collect_vec();
        Ok(Array::from(features))
    }

    pub fn nb_features(&self) -> usize {
        self.idf_diag.len()
    }
}

fn extract_ngrams(utterance: &str, ngram_max: usize, stop_words: &HashSet<String>) -> Vec<String> {
    let tokens: Vec<String> = tokenize_light(utterance)
        .into_iter()
        .filter(|token| !stop_words.contains(token))
        .collect();
    compute_all_ngrams(&tokens, ngram_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::SharedResourcesBuilder;

    fn fit_vectorizer(
        utterances: &[&str],
        config: &VectorizerConfig,
        resources: &SharedResources,
    ) -> TfidfVectorizerModel {
        let utterances: Vec<String> = utterances.iter().map(|text| text.to_string()).collect();
        TfidfVectorizer::fit(&utterances, config, resources).unwrap()
    }

    #[test]
    fn test_fit_computes_smoothed_idf() {
        // Given
        let resources = SharedResourcesBuilder::default().build();
        let config = VectorizerConfig {
            ngram_max: 1,
            max_features: 10,
            filter_stop_words: false,
        };

        // When
        let model = fit_vectorizer(
            &["price batao", "price check karo", "order track karo"],
            &config,
            &resources,
        );

        // Then
        let vocab = &model.vectorizer.vocab;
        assert_eq!(6, vocab.len());
        let price_idx = vocab["price"];
        let batao_idx = vocab["batao"];
        assert!((model.vectorizer.idf_diag[price_idx] - 1.2876821).abs() < 1e-6);
        assert!((model.vectorizer.idf_diag[batao_idx] - 1.6931472).abs() < 1e-6);
    }

    #[test]
    fn test_fit_caps_vocabulary_at_max_features() {
        // Given
        let resources = SharedResourcesBuilder::default().build();
        let config = VectorizerConfig {
            ngram_max: 1,
            max_features: 2,
            filter_stop_words: false,
        };

        // When
        let model = fit_vectorizer(
            &["rate rate rate", "track track", "cancel"],
            &config,
            &resources,
        );

        // Then
        let vocab = &model.vectorizer.vocab;
        assert_eq!(2, vocab.len());
        assert!(vocab.contains_key("rate"));
        assert!(vocab.contains_key("track"));
    }

    #[test]
    fn test_transform_produces_l2_normalized_features() {
        // Given
        let resources = Arc::new(SharedResourcesBuilder::default().build());
        let config = VectorizerConfig {
            ngram_max: 2,
            max_features: 50,
            filter_stop_words: false,
        };
        let model = fit_vectorizer(
            &["book a pickup", "track my order", "cancel my order"],
            &config,
            &resources,
        );
        let vocabulary = model.vectorizer.vocab.clone();
        let vectorizer = TfidfVectorizer::new(model, resources).unwrap();

        // When
        let features = vectorizer.transform("track my order").unwrap();

        // Then
        let l2_norm: f32 = features.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((l2_norm - 1.0).abs() < 1e-6);
        assert!(features[vocabulary["track"]] > 0.0);
        assert!(features[vocabulary["track my"]] > 0.0);
        assert_eq!(0.0, features[vocabulary["pickup"]]);
    }

    #[test]
    fn test_transform_filters_stop_words_when_configured() {
        // Given
        let resources = Arc::new(
            SharedResourcesBuilder::default()
                .stop_words(vec!["hai".to_string(), "kya".to_string()])
                .build(),
        );
        let config = VectorizerConfig {
            ngram_max: 1,
            max_features: 50,
            filter_stop_words: true,
        };
        let model = TfidfVectorizer::fit(
            &["cod available hai kya".to_string(), "rate batao".to_string()],
            &config,
            &resources,
        )
        .unwrap();

        // Then
        assert!(!model.vectorizer.vocab.contains_key("hai"));
        assert!(!model.vectorizer.vocab.contains_key("kya"));
        assert!(model.vectorizer.vocab.contains_key("cod"));
    }
}

mod action_decider;
mod entity_extractor;
pub mod errors;
mod intent_classifier;
pub mod models;
mod nlu_engine;
pub mod ontology;
mod resources;
#[cfg(test)]
mod testutils;
pub mod training;
mod utils;

pub const MODEL_VERSION: &str = "0.1.0";

pub use crate::action_decider::ActionDecider;
pub use crate::entity_extractor::{
    CachingEntityExtractor, EntityExtractor, RuleBasedEntityExtractor,
};
pub use crate::errors::*;
pub use crate::intent_classifier::{IntentClassifier, LogRegIntentClassifier};
pub use crate::models::*;
pub use crate::nlu_engine::LogisticsNluEngine;
pub use crate::ontology::*;
pub use crate::resources::loading::load_shared_resources;
pub use crate::resources::SharedResources;
pub use crate::utils::{tokenize_light, IntentName};

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use failure::ResultExt;
use log::info;
use serde::Deserialize;

use crate::errors::*;
use crate::resources::gazetteer::{Gazetteer, HashSetGazetteer};
use crate::resources::SharedResources;

#[derive(Debug, Deserialize, Clone)]
pub struct ResourcesMetadata {
    pub gazetteers: Option<Vec<String>>,
    pub stop_words: Option<String>,
}

pub fn load_shared_resources<P: AsRef<Path>>(resources_dir: P) -> Result<Arc<SharedResources>> {
    let metadata_file_path = resources_dir.as_ref().join("metadata.json");
    let metadata_file = File::open(&metadata_file_path).with_context(|_| {
        format!(
            "Cannot open resources metadata file '{:?}'",
            metadata_file_path
        )
    })?;
    let metadata: ResourcesMetadata = serde_json::from_reader(metadata_file).with_context(|_| {
        format!(
            "Cannot deserialize resources metadata file '{:?}'",
            metadata_file_path
        )
    })?;
    let gazetteers = load_gazetteers(&resources_dir, &metadata)?;
    let stop_words = load_stop_words(&resources_dir, &metadata)?;

    Ok(Arc::new(SharedResources {
        gazetteers,
        stop_words,
    }))
}

fn load_gazetteers<P: AsRef<Path>>(
    resources_dir: &P,
    metadata: &ResourcesMetadata,
) -> Result<HashMap<String, Arc<dyn Gazetteer>>> {
    let mut gazetteers: HashMap<String, Arc<dyn Gazetteer>> = HashMap::new();
    if let Some(gazetteer_names) = metadata.gazetteers.as_ref() {
        let gazetteers_directory = resources_dir.as_ref().join("gazetteers");
        for gazetteer_name in gazetteer_names {
            let gazetteer_path = gazetteers_directory
                .join(gazetteer_name.clone())
                .with_extension("txt");
            info!(
                "Loading gazetteer '{}' ({:?}) ...",
                gazetteer_name, gazetteer_path
            );
            let file = File::open(&gazetteer_path)
                .with_context(|_| format!("Cannot open gazetteer file {:?}", gazetteer_path))?;
            let gazetteer = HashSetGazetteer::from_reader(file)
                .with_context(|_| format!("Cannot read gazetteer file {:?}", gazetteer_path))?;
            gazetteers.insert(gazetteer_name.to_string(), Arc::new(gazetteer));
            info!("Gazetteer '{}' loaded", gazetteer_name);
        }
    }
    Ok(gazetteers)
}

fn load_stop_words<P: AsRef<Path>>(
    resources_dir: &P,
    metadata: &ResourcesMetadata,
) -> Result<HashSet<String>> {
    if let Some(stop_words_name) = metadata.stop_words.as_ref() {
        let stop_words_path = resources_dir
            .as_ref()
            .join(stop_words_name)
            .with_extension("txt");
        info!("Loading stop words ({:?}) ...", stop_words_path);
        let file = File::open(&stop_words_path)
            .with_context(|_| format!("Cannot open stop words file {:?}", stop_words_path))?;
        let reader = BufReader::new(file);
        let mut stop_words = HashSet::<String>::new();
        for line in reader.lines() {
            let stop_word = line?;
            if !stop_word.is_empty() {
                stop_words.insert(stop_word);
            }
        }
        info!("Stop words loaded");
        Ok(stop_words)
    } else {
        Ok(HashSet::new())
    }
}

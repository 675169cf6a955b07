use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read};
use std::iter::FromIterator;

use crate::errors::*;

pub trait Gazetteer: Send + Sync {
    fn contains(&self, value: &str) -> bool;
}

/// Gazetteer backed by a set of lowercased values, loaded from a newline
/// separated text file.
pub struct HashSetGazetteer {
    values: HashSet<String>,
}

impl HashSetGazetteer {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = BufReader::new(reader);
        let mut values = HashSet::<String>::new();
        for line in reader.lines() {
            let word = line?;
            let word = word.trim();
            if !word.is_empty() {
                values.insert(word.to_lowercase());
            }
        }
        Ok(Self { values })
    }
}

impl FromIterator<String> for HashSetGazetteer {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|str_value| str_value.to_lowercase())
                .collect(),
        }
    }
}

impl Gazetteer for HashSetGazetteer {
    fn contains(&self, value: &str) -> bool {
        self.values.contains(&value.to_lowercase())
    }
}

use std::collections::{HashMap, HashSet};
use std::fs;
use std::iter::FromIterator;
use std::path::Path;
use std::sync::Arc;

use ndarray::prelude::*;

use crate::resources::gazetteer::{Gazetteer, HashSetGazetteer};
use crate::resources::{SharedResources, LOCATIONS_GAZETTEER};
use crate::training::Dataset;

pub fn assert_epsilon_eq_array1(a: &Array1<f32>, b: &Array1<f32>, epsilon: f32) {
    assert_eq!(a.dim(), b.dim());
    for (index, elem_a) in a.indexed_iter() {
        assert!(epsilon_eq(*elem_a, b[index], epsilon))
    }
}

pub fn epsilon_eq(a: f32, b: f32, epsilon: f32) -> bool {
    let diff = a - b;
    diff < epsilon && diff > -epsilon
}

#[derive(Default)]
pub struct SharedResourcesBuilder {
    gazetteers: HashMap<String, Arc<dyn Gazetteer>>,
    stop_words: HashSet<String>,
}

impl SharedResourcesBuilder {
    pub fn locations_gazetteer(mut self, values: Vec<&str>) -> Self {
        let gazetteer =
            HashSetGazetteer::from_iter(values.into_iter().map(|value| value.to_string()));
        self.gazetteers
            .insert(LOCATIONS_GAZETTEER.to_string(), Arc::new(gazetteer) as _);
        self
    }

    pub fn stop_words(mut self, stop_words: Vec<String>) -> Self {
        self.stop_words = stop_words.into_iter().collect();
        self
    }

    pub fn build(self) -> SharedResources {
        SharedResources {
            gazetteers: self.gazetteers,
            stop_words: self.stop_words,
        }
    }
}

/// Small training dataset covering four intents, with wordings close to the
/// queries used in the engine tests.
pub fn sample_dataset() -> Dataset {
    let csv: &[u8] = b"text,intent\n\
        Bhai price batao Mumbai to Pune 10kg,CHECK_RATE\n\
        rate batao delhi tak bhejne ka,CHECK_RATE\n\
        shipping rate kya hai 5kg parcel,CHECK_RATE\n\
        price kitna lagega bangalore delivery,CHECK_RATE\n\
        charge batao mumbai se pune,CHECK_RATE\n\
        \"Pickup karna hai Andheri se Powai, 2 boxes hai\",BOOK_PICKUP\n\
        book pickup for 2 boxes tomorrow,BOOK_PICKUP\n\
        pickup schedule kar do gurgaon se,BOOK_PICKUP\n\
        ek pickup book karna hai urgent,BOOK_PICKUP\n\
        pickup chahiye kal morning,BOOK_PICKUP\n\
        mera order track karo,TRACK_ORDER\n\
        track my shipment status,TRACK_ORDER\n\
        order kahan pahuncha track karke batao,TRACK_ORDER\n\
        parcel ka status track karna hai,TRACK_ORDER\n\
        mera shipment kahan hai abhi,TRACK_ORDER\n\
        COD available hai kya,PAYMENT_QUERY\n\
        payment kaise karna hai online,PAYMENT_QUERY\n\
        kya aap upi accept karte ho,PAYMENT_QUERY\n\
        cash on delivery option hai kya,PAYMENT_QUERY\n\
        payment modes kya kya hai,PAYMENT_QUERY\n";
    Dataset::from_reader(csv).unwrap()
}

/// Write a loadable resources directory with a locations gazetteer and stop
/// words.
pub fn write_sample_resources<P: AsRef<Path>>(resources_dir: P) {
    let resources_dir = resources_dir.as_ref();
    let gazetteers_dir = resources_dir.join("gazetteers");
    fs::create_dir_all(&gazetteers_dir).unwrap();
    fs::write(
        gazetteers_dir.join("locations.txt"),
        "mumbai\nnavi mumbai\npune\ndelhi\nbangalore\nandheri\npowai\ngurgaon\nnoida\nghaziabad\n",
    )
    .unwrap();
    fs::write(resources_dir.join("stop_words.txt"), "hai\nkya\nbhai\n").unwrap();
    fs::write(
        resources_dir.join("metadata.json"),
        r#"{"gazetteers": ["locations"], "stop_words": "stop_words"}"#,
    )
    .unwrap();
}

pub mod gazetteer;
pub mod loading;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::resources::gazetteer::Gazetteer;
use crate::utils::GazetteerName;

/// Name of the gazetteer holding the known pickup/drop locations.
pub const LOCATIONS_GAZETTEER: &str = "locations";

/// Resources shared by the processing units of an engine.
pub struct SharedResources {
    pub gazetteers: HashMap<GazetteerName, Arc<dyn Gazetteer>>,
    pub stop_words: HashSet<String>,
}

use serde::{Deserialize, Serialize};

/// One row of tracking-device metadata for a single bird.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirdRecord {
    pub bird_name: String,
    pub device_info_serial: String,
    pub sex: String,
    pub scientific_name: String,
}

impl BirdRecord {
    /// Ordering key: scientific name and bird name concatenated into one
    /// string, not compared as a tuple. Records whose keys concatenate
    /// equal are equal-order.
    pub fn sort_key(&self) -> String {
        format!("{}{}", self.scientific_name, self.bird_name)
    }
}

/// Wire shape of the SQL API response. Sibling fields such as `time`,
/// `fields` and `total_rows` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SqlResponse {
    pub rows: Vec<BirdRecord>,
}

/// All records sharing one scientific name, plus the option markup built
/// for them so far.
#[derive(Debug, Clone)]
pub struct SpeciesGroup {
    pub scientific_name: String,
    pub options: String,
}

#[derive(Debug, Clone)]
pub struct RenderResult {
    /// Records in globally sorted order.
    pub birds: Vec<BirdRecord>,
    /// Distinct scientific names, first-occurrence order.
    pub species: Vec<String>,
    /// The optgroup fragment destined for the select container.
    pub select_html: String,
    pub csv_output: String,
    pub json_output: String,
}

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

/// Batch submission: a declared count and the visits it covers.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProcessingRequest {
    #[garde(skip)]
    pub count: usize,

    #[garde(dive)]
    #[serde(default)]
    pub visits: Vec<Visit>,
}

/// One store's images, tagged with the time of the visit.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Visit {
    #[garde(length(min = 1))]
    #[serde(default)]
    pub store_id: String,

    #[garde(length(min = 1))]
    #[serde(rename = "image_url", default)]
    pub image_urls: Vec<String>,

    /// RFC 3339 timestamp, parsed leniently by the executor.
    #[garde(skip)]
    #[serde(default)]
    pub visit_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedImage {
    pub image_url: String,
    pub perimeter: f64,
}

/// Latest processed outcome for a store. A later job replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedResult {
    pub store_id: String,
    pub processed_images: Vec<ProcessedImage>,
    /// `None` when the submitted visit time could not be parsed.
    pub visit_time: Option<DateTime<Utc>>,
}

/// Reference data for a store, empty when the store is unknown.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreInfo {
    pub store_name: String,
    pub area_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatePerimeter {
    pub date: Option<DateTime<Utc>>,
    pub perimeter: f64,
}

/// A processed result joined with the store's reference data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitReport {
    pub store_id: String,
    pub area: String,
    pub store_name: String,
    pub data: Vec<DatePerimeter>,
}

impl VisitReport {
    pub fn from_result(result: &ProcessedResult, info: StoreInfo) -> Self {
        Self {
            store_id: result.store_id.clone(),
            area: info.area_code,
            store_name: info.store_name,
            data: result
                .processed_images
                .iter()
                .map(|image| DatePerimeter {
                    date: result.visit_time,
                    perimeter: image.perimeter,
                })
                .collect(),
        }
    }
}

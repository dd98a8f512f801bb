use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::models::visit::StoreInfo;

/// Read-only store reference data, keyed by store id.
#[derive(Debug, Default)]
pub struct StoreMaster {
    stores: HashMap<String, StoreInfo>,
}

impl StoreMaster {
    /// Load from a CSV file with columns `AreaCode,StoreName,StoreID` and a
    /// header row.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreMasterError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| StoreMasterError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let master = Self::from_reader(file)?;
        tracing::info!(path = %path.display(), stores = master.len(), "Loaded store master data");
        Ok(master)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreMasterError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut stores = HashMap::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let (Some(area_code), Some(store_name), Some(store_id)) =
                (record.get(0), record.get(1), record.get(2))
            else {
                tracing::warn!(
                    row = index + 1,
                    "Skipping store master row with fewer than 3 columns"
                );
                continue;
            };

            stores.insert(
                store_id.to_string(),
                StoreInfo {
                    store_name: store_name.to_string(),
                    area_code: area_code.to_string(),
                },
            );
        }

        Ok(Self { stores })
    }

    /// Reference data for a store, or empty values if the store is unknown.
    pub fn lookup(&self, store_id: &str) -> StoreInfo {
        self.stores.get(store_id).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreMasterError {
    #[error("failed to open store master file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse store master CSV: {0}")]
    Csv(#[from] csv::Error),
}

//! Shared request and reference-data fixtures

use store_visits::models::visit::{ProcessingRequest, Visit};
use store_visits::services::store_master::StoreMaster;

pub const STORE_MASTER_CSV: &str = "AreaCode,StoreName,StoreID\n\
    7100001,Kirana Corner,S1\n\
    7100002,Fresh Mart,S2\n\
    7100003,Daily Needs,S3\n";

pub const VISIT_TIME: &str = "2024-01-01T00:00:00Z";

pub fn store_master() -> StoreMaster {
    StoreMaster::from_reader(STORE_MASTER_CSV.as_bytes()).expect("fixture CSV is valid")
}

pub fn visit(store_id: &str, urls: &[&str]) -> Visit {
    Visit {
        store_id: store_id.to_string(),
        image_urls: urls.iter().map(|u| u.to_string()).collect(),
        visit_time: VISIT_TIME.to_string(),
    }
}

/// A request whose declared count matches its visits.
pub fn request(visits: Vec<Visit>) -> ProcessingRequest {
    ProcessingRequest {
        count: visits.len(),
        visits,
    }
}

use garde::Validate;

use crate::models::visit::ProcessingRequest;

/// Client-caused rejection of a batch submission.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("count mismatch")]
    CountMismatch { declared: usize, actual: usize },

    #[error("empty request")]
    EmptyRequest,

    #[error("missing fields")]
    MissingFields,
}

/// Check a submission before it is accepted.
///
/// Rules apply in order:
/// - the declared count must equal the number of visits
/// - a request with no visits is rejected
/// - every visit needs a store id and at least one image URL
pub fn validate_request(request: &ProcessingRequest) -> Result<(), ValidationError> {
    if request.count != request.visits.len() {
        return Err(ValidationError::CountMismatch {
            declared: request.count,
            actual: request.visits.len(),
        });
    }

    if request.visits.is_empty() {
        return Err(ValidationError::EmptyRequest);
    }

    request.validate().map_err(|report| {
        tracing::debug!(report = %report, "Request failed field validation");
        ValidationError::MissingFields
    })
}

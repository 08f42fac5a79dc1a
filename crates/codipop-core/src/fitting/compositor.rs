//! Compositor trait.
//!
//! The remote service that turns a subject image plus one or more garment
//! images into a single composite. The HTTP adapter lives in codipop-infra.

use codipop_types::error::CompositionError;
use codipop_types::fitting::{CompositionRequest, CompositionResponse};

/// Remote image compositor.
///
/// Implementations report transport failures, non-2xx statuses and
/// undecodable bodies as errors. A decoded body with `success = false` is
/// returned as-is and interpreted by the orchestrator.
pub trait Compositor: Send + Sync {
    fn compose(
        &self,
        request: &CompositionRequest,
    ) -> impl std::future::Future<Output = Result<CompositionResponse, CompositionError>> + Send;
}

/// Extract the output URL from a decoded response.
pub fn output_url(response: CompositionResponse) -> Result<String, CompositionError> {
    if !response.success {
        return Err(CompositionError::Rejected(
            response
                .message
                .unwrap_or_else(|| "no reason given".to_string()),
        ));
    }

    match response.image_url {
        Some(url) if !url.trim().is_empty() => Ok(url),
        _ => Err(CompositionError::Malformed(
            "success response without imageUrl".to_string(),
        )),
    }
}

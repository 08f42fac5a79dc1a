//! Fitting (try-on) request and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a fitting result, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FittingResultId(pub Uuid);

impl FittingResultId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for FittingResultId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FittingResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FittingResultId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One completed composition, as stored in the user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittingResult {
    pub id: FittingResultId,
    /// Compositor output image.
    pub image_url: String,
    /// Server-assigned insert time.
    pub created_at: DateTime<Utc>,
    pub is_liked: bool,
}

/// Phase of the composition request state machine.
///
/// `Succeeded` and `Failed` are transient: the orchestrator reports them to
/// the caller and immediately returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FittingPhase {
    Idle,
    Validating,
    Submitting,
}

impl fmt::Display for FittingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FittingPhase::Idle => write!(f, "idle"),
            FittingPhase::Validating => write!(f, "validating"),
            FittingPhase::Submitting => write!(f, "submitting"),
        }
    }
}

/// Non-error outcomes of a try-on invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryOnOutcome {
    /// The compositor produced an image and it was recorded.
    Completed(FittingResult),
    /// A request was already in flight; nothing was sent.
    Ignored,
    /// The response arrived after a new session started and was dropped.
    Discarded,
}

/// An image attached to a composition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    /// Garment id, or `None` for the subject image.
    pub garment_id: Option<String>,
    /// Local path, `file://` URI, or remote URL.
    pub uri: String,
}

impl ImageSource {
    pub fn subject(uri: impl Into<String>) -> Self {
        Self {
            garment_id: None,
            uri: uri.into(),
        }
    }

    pub fn garment(id: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            garment_id: Some(id.into()),
            uri: uri.into(),
        }
    }
}

/// Payload sent to the remote compositor.
///
/// `clothing` order is significant: the compositor may treat it as layering
/// order, so it always follows the selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionRequest {
    pub person: ImageSource,
    pub clothing: Vec<ImageSource>,
}

impl CompositionRequest {
    /// Value of the redundant `clothing_count` field.
    pub fn clothing_count(&self) -> usize {
        self.clothing.len()
    }

    /// Garment ids in attachment order.
    pub fn garment_ids(&self) -> Vec<String> {
        self.clothing
            .iter()
            .filter_map(|c| c.garment_id.clone())
            .collect()
    }
}

/// JSON body returned by the compositor endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fitting_result_id_parse() {
        let id = FittingResultId::new();
        let parsed: FittingResultId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<FittingResultId>().is_err());
    }

    #[test]
    fn test_composition_request_count_and_order() {
        let request = CompositionRequest {
            person: ImageSource::subject("/tmp/me.jpg"),
            clothing: vec![
                ImageSource::garment("g1", "https://cdn/g1.jpg"),
                ImageSource::garment("g2", "https://cdn/g2.jpg"),
            ],
        };
        assert_eq!(request.clothing_count(), 2);
        assert_eq!(request.garment_ids(), vec!["g1", "g2"]);
    }

    #[test]
    fn test_composition_response_deserialize_camel_case() {
        let resp: CompositionResponse =
            serde_json::from_str(r#"{"success":true,"imageUrl":"https://x/out.png"}"#).unwrap();
        assert!(resp.success);
        assert_eq!(resp.image_url.as_deref(), Some("https://x/out.png"));
        assert!(resp.message.is_none());
    }

    #[test]
    fn test_composition_response_failure_message() {
        let resp: CompositionResponse =
            serde_json::from_str(r#"{"success":false,"message":"no person detected"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.message.as_deref(), Some("no person detected"));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(FittingPhase::Submitting.to_string(), "submitting");
    }
}

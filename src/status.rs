//! Canonical detection status vocabulary.
//!
//! The API has used several spellings for the same outcome over time. Every
//! raw status string goes through [`DetectionStatus::normalize`] before it is
//! exposed, so callers only ever see the canonical set.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const QUEUED: &str = "QUEUED";
const PROCESSING: &str = "PROCESSING";
const ANALYZING: &str = "ANALYZING";
const MANIPULATED: &str = "MANIPULATED";
const AUTHENTIC: &str = "AUTHENTIC";
const COMPLETED: &str = "COMPLETED";
const FAILED: &str = "FAILED";
const NOT_APPLICABLE: &str = "NOT_APPLICABLE";
const UNKNOWN: &str = "UNKNOWN";

/// Legacy spelling of [`DetectionStatus::Manipulated`]
const LEGACY_FAKE: &str = "FAKE";

/// Status of an analysis or of a single model within it
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DetectionStatus {
    Queued,
    Processing,
    Analyzing,
    Manipulated,
    Authentic,
    Completed,
    Failed,
    NotApplicable,
    /// The API did not report a status
    #[default]
    Unknown,
    /// Any value outside the known vocabulary, kept verbatim
    Other(String),
}

impl DetectionStatus {
    /// Map a raw status onto the canonical vocabulary.
    ///
    /// `FAKE` becomes `MANIPULATED` (exact, case-sensitive match), a missing
    /// value becomes `UNKNOWN`, and everything else passes through unchanged.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            None => DetectionStatus::Unknown,
            Some(LEGACY_FAKE) | Some(MANIPULATED) => DetectionStatus::Manipulated,
            Some(QUEUED) => DetectionStatus::Queued,
            Some(PROCESSING) => DetectionStatus::Processing,
            Some(ANALYZING) => DetectionStatus::Analyzing,
            Some(AUTHENTIC) => DetectionStatus::Authentic,
            Some(COMPLETED) => DetectionStatus::Completed,
            Some(FAILED) => DetectionStatus::Failed,
            Some(NOT_APPLICABLE) => DetectionStatus::NotApplicable,
            Some(UNKNOWN) => DetectionStatus::Unknown,
            Some(other) => DetectionStatus::Other(other.to_string()),
        }
    }

    /// Wire spelling of this status
    pub fn as_str(&self) -> &str {
        match self {
            DetectionStatus::Queued => QUEUED,
            DetectionStatus::Processing => PROCESSING,
            DetectionStatus::Analyzing => ANALYZING,
            DetectionStatus::Manipulated => MANIPULATED,
            DetectionStatus::Authentic => AUTHENTIC,
            DetectionStatus::Completed => COMPLETED,
            DetectionStatus::Failed => FAILED,
            DetectionStatus::NotApplicable => NOT_APPLICABLE,
            DetectionStatus::Unknown => UNKNOWN,
            DetectionStatus::Other(value) => value,
        }
    }

    /// Whether the analysis has not concluded yet.
    ///
    /// QUEUED, PROCESSING, ANALYZING and UNKNOWN are transient, compared
    /// case-insensitively so that values such as `"processing"` also count.
    pub fn is_transient(&self) -> bool {
        [QUEUED, PROCESSING, ANALYZING, UNKNOWN]
            .iter()
            .any(|marker| self.as_str().eq_ignore_ascii_case(marker))
    }

    /// Whether polling can stop on this status
    pub fn is_terminal(&self) -> bool {
        !self.is_transient()
    }

    /// Page-level settling check: only ANALYZING keeps a page unsettled
    pub fn is_analyzing(&self) -> bool {
        self.as_str().eq_ignore_ascii_case(ANALYZING)
    }

    pub fn is_not_applicable(&self) -> bool {
        *self == DetectionStatus::NotApplicable
    }
}

impl fmt::Display for DetectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DetectionStatus {
    fn from(raw: &str) -> Self {
        DetectionStatus::normalize(Some(raw))
    }
}

impl PartialEq<&str> for DetectionStatus {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Serialize for DetectionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DetectionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(DetectionStatus::normalize(raw.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_becomes_manipulated() {
        assert_eq!(
            DetectionStatus::normalize(Some("FAKE")),
            DetectionStatus::Manipulated
        );
        // Only the exact legacy spelling is rewritten
        assert_eq!(
            DetectionStatus::normalize(Some("fake")),
            DetectionStatus::Other("fake".to_string())
        );
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(
            DetectionStatus::normalize(Some("AUTHENTIC")),
            DetectionStatus::Authentic
        );
        assert_eq!(
            DetectionStatus::normalize(Some("SUSPICIOUS")).as_str(),
            "SUSPICIOUS"
        );
        assert_eq!(DetectionStatus::normalize(None), DetectionStatus::Unknown);
    }

    #[test]
    fn test_transient_any_case() {
        for raw in [
            "QUEUED",
            "queued",
            "Processing",
            "PROCESSING",
            "analyzing",
            "AnAlYzInG",
        ] {
            assert!(
                DetectionStatus::normalize(Some(raw)).is_transient(),
                "{raw} should be transient"
            );
        }
        assert!(DetectionStatus::normalize(None).is_transient());
    }

    #[test]
    fn test_terminal() {
        for raw in [
            "FAKE",
            "MANIPULATED",
            "AUTHENTIC",
            "COMPLETED",
            "FAILED",
            "ERROR",
            "NOT_APPLICABLE",
            "SUSPICIOUS",
        ] {
            assert!(
                DetectionStatus::normalize(Some(raw)).is_terminal(),
                "{raw} should be terminal"
            );
        }
    }

    #[test]
    fn test_only_analyzing_blocks_a_page() {
        assert!(DetectionStatus::Analyzing.is_analyzing());
        assert!(DetectionStatus::from("analyzing").is_analyzing());
        assert!(!DetectionStatus::Processing.is_analyzing());
        assert!(!DetectionStatus::Queued.is_analyzing());
    }

    #[test]
    fn test_serde() {
        let status: DetectionStatus = serde_json::from_str("\"FAKE\"").unwrap();
        assert_eq!(status, DetectionStatus::Manipulated);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"MANIPULATED\"");

        let status: DetectionStatus = serde_json::from_str("null").unwrap();
        assert_eq!(status, DetectionStatus::Unknown);
    }
}

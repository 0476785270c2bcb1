use thiserror::Error;

/// Pipeline anomaly taxonomy.
///
/// Nothing in the pipeline returns these as errors — every stage is total and
/// repairs or degrades in place. Anomalies exist as structured payloads for
/// log events, so operators can see what got repaired and why a section
/// landed in `Other`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Anomaly {
    /// Heading matched no known kind; the section degraded to `Other`.
    #[error("unrecognized section heading '{heading}'")]
    ClassificationAmbiguous { heading: String },

    /// Structure violated a collection invariant and was repaired in place.
    #[error("structural anomaly: {detail}")]
    StructuralAnomaly { detail: String },

    /// Content that could not be walked as markup; preserved verbatim as text.
    #[error("unparsable fragment preserved as plain text: {context}")]
    UnparsableFragment { context: String },
}

/// The one strict boundary: callers that parse record JSON themselves get a
/// typed error instead of the degrading behavior of `sections_from_json`.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid resume record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anomaly_display_names_the_heading() {
        let anomaly = Anomaly::ClassificationAmbiguous {
            heading: "Hobbies".to_string(),
        };
        assert_eq!(anomaly.to_string(), "unrecognized section heading 'Hobbies'");
    }

    #[test]
    fn test_structural_anomaly_display_carries_detail() {
        let anomaly = Anomaly::StructuralAnomaly {
            detail: "orphaned job role 'Engineer' re-attached".to_string(),
        };
        assert!(anomaly.to_string().contains("orphaned job role"));
    }

    #[test]
    fn test_record_error_wraps_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err = RecordError::from(parse_err);
        assert!(err.to_string().starts_with("invalid resume record JSON"));
    }
}

//! Formatter error types.
//!
//! Everything that goes wrong during a conversion surfaces as a single
//! [`FormatConversionError`] carrying the subscriber identity and the
//! underlying cause. The one deliberate exception is byline resolution,
//! which is best-effort and never produces an error (see
//! `NinjsFormatter::try_get_byline`).

use thiserror::Error;

/// Causes of a failed conversion.
#[derive(Error, Debug)]
pub enum FormatterError {
    /// A field the formatter requires was absent from the article record.
    #[error("article is missing required field `{0}`")]
    MissingField(&'static str),

    /// The sequencing collaborator failed to produce a sequence number.
    #[error("sequence number generation failed: {0}")]
    Sequencer(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Serializing the interchange document failed.
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A conversion failure, wrapping the cause together with the subscriber
/// the document was being produced for.
///
/// The formatter never retries internally and never returns a partial
/// document; callers own any retry or backoff policy.
#[derive(Error, Debug)]
#[error("failed to format article for subscriber {subscriber_id}")]
pub struct FormatConversionError {
    /// Identifier of the subscriber the conversion was requested for.
    pub subscriber_id: String,
    /// The underlying failure.
    #[source]
    pub source: FormatterError,
}

impl FormatConversionError {
    /// Wrap a cause with the subscriber it occurred for.
    pub fn new(subscriber_id: impl Into<String>, source: FormatterError) -> Self {
        Self {
            subscriber_id: subscriber_id.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_conversion_error_display_names_subscriber() {
        let err = FormatConversionError::new("wire-1", FormatterError::MissingField("_id"));
        assert_eq!(
            err.to_string(),
            "failed to format article for subscriber wire-1"
        );
    }

    #[test]
    fn test_conversion_error_exposes_cause() {
        let err = FormatConversionError::new("wire-1", FormatterError::MissingField("_id"));
        let cause = err.source().expect("cause should be attached");
        assert_eq!(cause.to_string(), "article is missing required field `_id`");
    }
}

//! NINJS formatter.
//!
//! Converts an article record into a NINJS (JSON news-interchange) document.
//! The conversion is a field-by-field mapping:
//!
//! - `_id`, `version`, and `type` are required and always emitted
//! - `byline` is best-effort: the article's own field wins, otherwise the
//!   creator is resolved through the user directory, and any failure simply
//!   omits the field
//! - a fixed set of fields is copied verbatim when present
//! - composite articles additionally carry an `associations` map derived
//!   from their package groups
//! - `priority` is always emitted, defaulting to 5
//!
//! The document never contains a key for a source field that was absent,
//! `priority` excepted.

use crate::error::{FormatConversionError, FormatterError};
use crate::formatters::Formatter;
use crate::models::{content_type, Article, Subscriber, ROOT_GROUP};
use crate::services::{Sequencer, UserDirectory};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Format name this formatter answers to.
pub const FORMAT_NINJS: &str = "ninjs";

/// Default editorial priority when the article carries none.
const DEFAULT_PRIORITY: i64 = 5;

/// The NINJS document as serialized to subscribers.
///
/// Field declaration order fixes the key order of the JSON output. Optional
/// keys are dropped entirely when the source field was absent.
#[derive(Debug, Serialize)]
pub struct NinjsDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub version: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub located: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versioncreated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usageterms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubstatus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renditions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associations: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embargoed: Option<String>,
    pub priority: i64,
}

/// Transcodes article records into NINJS documents.
///
/// The formatter is stateless between calls; both collaborators are injected
/// at construction time and shared behind [`Arc`], so one instance can serve
/// concurrent conversions.
pub struct NinjsFormatter {
    sequencer: Arc<dyn Sequencer>,
    users: Arc<dyn UserDirectory>,
}

impl NinjsFormatter {
    /// Create a formatter with its sequencing and user-directory collaborators.
    pub fn new(sequencer: Arc<dyn Sequencer>, users: Arc<dyn UserDirectory>) -> Self {
        Self { sequencer, users }
    }

    /// Build and serialize the NINJS document for `article`.
    fn convert(&self, article: &Article) -> Result<String, FormatterError> {
        let id = article
            .id
            .as_ref()
            .ok_or(FormatterError::MissingField("_id"))?;
        let version = article
            .current_version
            .ok_or(FormatterError::MissingField("_current_version"))?;
        let item_type = article
            .item_type
            .as_deref()
            .ok_or(FormatterError::MissingField("type"))?;

        let mut doc = NinjsDocument {
            id: id.clone(),
            version: version.to_string(),
            item_type: map_type(item_type).to_string(),
            byline: self.try_get_byline(article),
            located: article
                .dateline
                .as_ref()
                .and_then(|dateline| dateline.located.as_ref())
                .filter(|located| !located.is_empty())
                .map(|located| located.city.clone().flatten().unwrap_or_default()),
            versioncreated: article.versioncreated,
            usageterms: article.usageterms.clone(),
            subject: article.subject.clone(),
            language: article.language.clone(),
            headline: article.headline.clone(),
            urgency: article.urgency,
            pubstatus: article.pubstatus.clone(),
            mimetype: article.mimetype.clone(),
            renditions: article.renditions.clone(),
            place: article.place.clone(),
            body_text: article.body_text.clone(),
            body_html: article.body_html.clone(),
            description_text: article.description.clone(),
            associations: None,
            embargoed: article.embargo.map(|ts| ts.to_rfc3339()),
            priority: article.priority.unwrap_or(DEFAULT_PRIORITY),
        };

        if item_type == content_type::COMPOSITE {
            doc.associations = Some(build_associations(article)?);
        }

        let serialized = serde_json::to_string(&doc)?;
        debug!(article_id = %id, bytes = serialized.len(), "Built NINJS document");
        Ok(serialized)
    }

    /// Best-effort byline resolution.
    ///
    /// The article's own `byline` field wins when present (null becomes an
    /// empty string). Otherwise the creator is resolved through the user
    /// directory. Any miss along the way returns `None`; the caller drops
    /// the field without surfacing or logging the failure.
    fn try_get_byline(&self, article: &Article) -> Option<String> {
        if let Some(byline) = &article.byline {
            return Some(byline.clone().unwrap_or_default());
        }
        let creator = article.original_creator.as_ref()?;
        let user = self.users.find_one(creator)?;
        Some(user.display_name.unwrap_or_default())
    }
}

impl Formatter for NinjsFormatter {
    fn can_format(&self, format_type: &str, _article: &Article) -> bool {
        format_type == FORMAT_NINJS
    }

    #[instrument(level = "debug", skip_all, fields(subscriber = %subscriber.id))]
    fn format(
        &self,
        article: &Article,
        subscriber: &Subscriber,
    ) -> Result<(u64, String), FormatConversionError> {
        let pub_seq_num = self
            .sequencer
            .generate_sequence_number(subscriber)
            .map_err(|e| {
                FormatConversionError::new(&subscriber.id, FormatterError::Sequencer(e))
            })?;

        let serialized = self
            .convert(article)
            .map_err(|e| FormatConversionError::new(&subscriber.id, e))?;

        Ok((pub_seq_num, serialized))
    }
}

/// Map the article item type to its NINJS counterpart.
///
/// `preformatted` renders as `text`; everything else passes through unchanged.
fn map_type(item_type: &str) -> &str {
    if item_type == content_type::PREFORMATTED {
        content_type::TEXT
    } else {
        item_type
    }
}

/// Build the association map for a composite article.
///
/// Scans the package groups in source order, skipping the root group.
/// Each reference carrying a `residRef` contributes one `{_id, type}` entry
/// under its group id; references without one are dropped, and groups with
/// no qualifying references do not appear at all.
fn build_associations(article: &Article) -> Result<Map<String, Value>, FormatterError> {
    let groups = article
        .groups
        .as_ref()
        .ok_or(FormatterError::MissingField("groups"))?;

    let mut associations = Map::new();
    for group in groups {
        if group.id == ROOT_GROUP {
            continue;
        }
        for reference in &group.refs {
            let Some(residref) = &reference.residref else {
                continue;
            };
            let ref_type = reference
                .item_type
                .as_ref()
                .ok_or(FormatterError::MissingField("refs[].type"))?;

            let items = associations
                .entry(group.id.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = items {
                items.push(json!({ "_id": residref, "type": ref_type }));
            }
        }
    }
    Ok(associations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dateline, Group, Reference, User};
    use crate::services::{InMemorySequencer, InMemoryUserDirectory, SequencerError};
    use chrono::TimeZone;

    fn formatter_with_users(users: Vec<User>) -> NinjsFormatter {
        NinjsFormatter::new(
            Arc::new(InMemorySequencer::new()),
            Arc::new(InMemoryUserDirectory::new(users)),
        )
    }

    fn formatter() -> NinjsFormatter {
        formatter_with_users(vec![])
    }

    fn base_article() -> Article {
        Article {
            id: Some("tag:example.com:article-1".to_string()),
            current_version: Some(2),
            item_type: Some(content_type::TEXT.to_string()),
            ..Default::default()
        }
    }

    fn format_to_value(formatter: &NinjsFormatter, article: &Article) -> Value {
        let (_, doc) = formatter
            .format(article, &Subscriber::new("wire-1"))
            .unwrap();
        serde_json::from_str(&doc).unwrap()
    }

    #[test]
    fn test_can_format_only_ninjs() {
        let f = formatter();
        let article = base_article();
        assert!(f.can_format("ninjs", &article));
        assert!(!f.can_format("nitf", &article));
        assert!(!f.can_format("NINJS", &article));
    }

    #[test]
    fn test_minimal_article_emits_only_required_keys() {
        let doc = format_to_value(&formatter(), &base_article());
        let keys: Vec<&str> = doc.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["_id", "version", "type", "priority"]);
        assert_eq!(doc["_id"], "tag:example.com:article-1");
        assert_eq!(doc["version"], "2");
        assert_eq!(doc["type"], "text");
        assert_eq!(doc["priority"], 5);
    }

    #[test]
    fn test_preformatted_maps_to_text() {
        let mut article = base_article();
        article.item_type = Some(content_type::PREFORMATTED.to_string());
        let doc = format_to_value(&formatter(), &article);
        assert_eq!(doc["type"], "text");
    }

    #[test]
    fn test_other_item_types_pass_through() {
        let mut article = base_article();
        article.item_type = Some("video".to_string());
        let doc = format_to_value(&formatter(), &article);
        assert_eq!(doc["type"], "video");
    }

    #[test]
    fn test_byline_from_article_field() {
        let mut article = base_article();
        article.byline = Some(Some("Jane Doe".to_string()));
        let doc = format_to_value(&formatter(), &article);
        assert_eq!(doc["byline"], "Jane Doe");
    }

    #[test]
    fn test_null_byline_becomes_empty_string() {
        let mut article = base_article();
        article.byline = Some(None);
        let doc = format_to_value(&formatter(), &article);
        assert_eq!(doc["byline"], "");
    }

    #[test]
    fn test_null_byline_survives_deserialization() {
        // A wire record with an explicit null byline must format as "",
        // not fall through to the creator lookup.
        let article = article_from_json(
            r#"{"_id": "a1", "_current_version": 1, "type": "text", "byline": null}"#,
        );
        let doc = format_to_value(&formatter(), &article);
        assert_eq!(doc["byline"], "");
    }

    #[test]
    fn test_byline_resolved_from_user_directory() {
        let f = formatter_with_users(vec![User {
            id: "u1".to_string(),
            display_name: Some("John Smith".to_string()),
        }]);
        let mut article = base_article();
        article.original_creator = Some("u1".to_string());
        let doc = format_to_value(&f, &article);
        assert_eq!(doc["byline"], "John Smith");
    }

    #[test]
    fn test_byline_empty_when_display_name_missing() {
        let f = formatter_with_users(vec![User {
            id: "u1".to_string(),
            display_name: None,
        }]);
        let mut article = base_article();
        article.original_creator = Some("u1".to_string());
        let doc = format_to_value(&f, &article);
        assert_eq!(doc["byline"], "");
    }

    #[test]
    fn test_byline_omitted_when_lookup_fails() {
        // Creator resolves to no user: the field is dropped, no error.
        let mut article = base_article();
        article.original_creator = Some("ghost".to_string());
        let doc = format_to_value(&formatter(), &article);
        assert!(doc.get("byline").is_none());

        // No creator at all: same outcome.
        let doc = format_to_value(&formatter(), &base_article());
        assert!(doc.get("byline").is_none());
    }

    fn article_from_json(json: &str) -> Article {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_located_from_dateline_city() {
        let article = article_from_json(
            r#"{"_id": "a1", "_current_version": 1, "type": "text",
                "dateline": {"located": {"city": "Sydney"}}}"#,
        );
        let doc = format_to_value(&formatter(), &article);
        assert_eq!(doc["located"], "Sydney");
    }

    #[test]
    fn test_located_defaults_to_empty_when_city_missing() {
        let article = article_from_json(
            r#"{"_id": "a1", "_current_version": 1, "type": "text",
                "dateline": {"located": {"state": "NSW"}}}"#,
        );
        let doc = format_to_value(&formatter(), &article);
        assert_eq!(doc["located"], "");
    }

    #[test]
    fn test_empty_located_is_omitted() {
        let article = article_from_json(
            r#"{"_id": "a1", "_current_version": 1, "type": "text",
                "dateline": {"located": {}}}"#,
        );
        let doc = format_to_value(&formatter(), &article);
        assert!(doc.get("located").is_none());
    }

    #[test]
    fn test_located_omitted_without_dateline() {
        let mut article = base_article();
        article.dateline = Some(Dateline { located: None });
        let doc = format_to_value(&formatter(), &article);
        assert!(doc.get("located").is_none());
    }

    #[test]
    fn test_direct_copy_fields_pass_through_verbatim() {
        let mut article = base_article();
        article.headline = Some("Budget passes senate".to_string());
        article.language = Some("en".to_string());
        article.urgency = Some(2);
        article.subject = Some(json!([{ "qcode": "04000000", "name": "economy" }]));
        article.renditions = Some(json!({ "original": { "href": "http://x/1.jpg" } }));

        let doc = format_to_value(&formatter(), &article);
        assert_eq!(doc["headline"], "Budget passes senate");
        assert_eq!(doc["language"], "en");
        assert_eq!(doc["urgency"], 2);
        assert_eq!(doc["subject"][0]["qcode"], "04000000");
        assert_eq!(doc["renditions"]["original"]["href"], "http://x/1.jpg");
        // Absent members of the direct-copy set stay absent.
        assert!(doc.get("usageterms").is_none());
        assert!(doc.get("body_html").is_none());
    }

    #[test]
    fn test_description_copied_to_description_text() {
        let mut article = base_article();
        article.description = Some("A short abstract.".to_string());
        let doc = format_to_value(&formatter(), &article);
        assert_eq!(doc["description_text"], "A short abstract.");
        assert!(doc.get("description").is_none());
    }

    #[test]
    fn test_embargo_rendered_as_iso8601() {
        let mut article = base_article();
        article.embargo = Some(Utc.with_ymd_and_hms(2026, 9, 1, 6, 0, 0).unwrap());
        let doc = format_to_value(&formatter(), &article);
        assert_eq!(doc["embargoed"], "2026-09-01T06:00:00+00:00");
    }

    #[test]
    fn test_no_embargo_no_embargoed_key() {
        let doc = format_to_value(&formatter(), &base_article());
        assert!(doc.get("embargoed").is_none());
    }

    #[test]
    fn test_priority_preserved_when_present() {
        let mut article = base_article();
        article.priority = Some(1);
        let doc = format_to_value(&formatter(), &article);
        assert_eq!(doc["priority"], 1);
    }

    #[test]
    fn test_composite_associations() {
        let mut article = base_article();
        article.item_type = Some(content_type::COMPOSITE.to_string());
        article.groups = Some(vec![
            Group {
                id: "root".to_string(),
                refs: vec![],
            },
            Group {
                id: "g1".to_string(),
                refs: vec![Reference {
                    residref: Some("X".to_string()),
                    item_type: Some("text".to_string()),
                }],
            },
        ]);

        let doc = format_to_value(&formatter(), &article);
        assert_eq!(
            doc["associations"],
            json!({ "g1": [{ "_id": "X", "type": "text" }] })
        );
    }

    #[test]
    fn test_associations_skip_refs_without_residref() {
        let mut article = base_article();
        article.item_type = Some(content_type::COMPOSITE.to_string());
        article.groups = Some(vec![Group {
            id: "g1".to_string(),
            refs: vec![
                Reference {
                    residref: None,
                    item_type: Some("text".to_string()),
                },
                Reference {
                    residref: Some("Y".to_string()),
                    item_type: Some("picture".to_string()),
                },
            ],
        }]);

        let doc = format_to_value(&formatter(), &article);
        assert_eq!(
            doc["associations"],
            json!({ "g1": [{ "_id": "Y", "type": "picture" }] })
        );
    }

    #[test]
    fn test_associations_preserve_group_and_ref_order() {
        let mut article = base_article();
        article.item_type = Some(content_type::COMPOSITE.to_string());
        article.groups = Some(vec![
            Group {
                id: "zeta".to_string(),
                refs: vec![Reference {
                    residref: Some("Z1".to_string()),
                    item_type: Some("text".to_string()),
                }],
            },
            Group {
                id: "alpha".to_string(),
                refs: vec![
                    Reference {
                        residref: Some("A1".to_string()),
                        item_type: Some("text".to_string()),
                    },
                    Reference {
                        residref: Some("A2".to_string()),
                        item_type: Some("picture".to_string()),
                    },
                ],
            },
        ]);

        let doc = format_to_value(&formatter(), &article);
        let groups: Vec<&str> = doc["associations"]
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(groups, vec!["zeta", "alpha"]);
        assert_eq!(doc["associations"]["alpha"][0]["_id"], "A1");
        assert_eq!(doc["associations"]["alpha"][1]["_id"], "A2");
    }

    #[test]
    fn test_non_composite_has_no_associations_key() {
        let mut article = base_article();
        article.groups = Some(vec![Group {
            id: "g1".to_string(),
            refs: vec![Reference {
                residref: Some("X".to_string()),
                item_type: Some("text".to_string()),
            }],
        }]);
        let doc = format_to_value(&formatter(), &article);
        assert!(doc.get("associations").is_none());
    }

    #[test]
    fn test_composite_without_groups_is_an_error() {
        let mut article = base_article();
        article.item_type = Some(content_type::COMPOSITE.to_string());
        let err = formatter()
            .format(&article, &Subscriber::new("wire-1"))
            .unwrap_err();
        assert_eq!(err.subscriber_id, "wire-1");
        assert!(matches!(err.source, FormatterError::MissingField("groups")));
    }

    #[test]
    fn test_missing_required_fields_wrap_as_conversion_error() {
        let f = formatter();
        let sub = Subscriber::new("wire-1");

        let mut no_id = base_article();
        no_id.id = None;
        let err = f.format(&no_id, &sub).unwrap_err();
        assert!(matches!(err.source, FormatterError::MissingField("_id")));

        let mut no_version = base_article();
        no_version.current_version = None;
        let err = f.format(&no_version, &sub).unwrap_err();
        assert!(matches!(
            err.source,
            FormatterError::MissingField("_current_version")
        ));

        let mut no_type = base_article();
        no_type.item_type = None;
        let err = f.format(&no_type, &sub).unwrap_err();
        assert!(matches!(err.source, FormatterError::MissingField("type")));
    }

    #[test]
    fn test_sequencer_failure_wraps_with_subscriber() {
        struct FailingSequencer;
        impl Sequencer for FailingSequencer {
            fn generate_sequence_number(
                &self,
                _subscriber: &Subscriber,
            ) -> Result<u64, SequencerError> {
                Err("sequence store unavailable".into())
            }
        }

        let f = NinjsFormatter::new(
            Arc::new(FailingSequencer),
            Arc::new(InMemoryUserDirectory::empty()),
        );
        let err = f
            .format(&base_article(), &Subscriber::new("wire-1"))
            .unwrap_err();
        assert_eq!(err.subscriber_id, "wire-1");
        assert!(matches!(err.source, FormatterError::Sequencer(_)));
    }

    #[test]
    fn test_repeat_formatting_is_deterministic_with_fresh_sequence() {
        let f = formatter();
        let article = base_article();
        let sub = Subscriber::new("wire-1");

        let (seq1, doc1) = f.format(&article, &sub).unwrap();
        let (seq2, doc2) = f.format(&article, &sub).unwrap();

        assert!(seq2 > seq1);
        assert_eq!(doc1, doc2);
    }

    #[test]
    fn test_document_key_order_is_fixed() {
        let mut article = base_article();
        article.byline = Some(Some("Jane Doe".to_string()));
        article.headline = Some("Headline".to_string());
        article.embargo = Some(Utc.with_ymd_and_hms(2026, 9, 1, 6, 0, 0).unwrap());

        let (_, doc) = formatter()
            .format(&article, &Subscriber::new("wire-1"))
            .unwrap();
        let id_pos = doc.find("\"_id\"").unwrap();
        let version_pos = doc.find("\"version\"").unwrap();
        let byline_pos = doc.find("\"byline\"").unwrap();
        let priority_pos = doc.find("\"priority\"").unwrap();
        assert!(id_pos < version_pos);
        assert!(version_pos < byline_pos);
        assert!(byline_pos < priority_pos);
    }
}

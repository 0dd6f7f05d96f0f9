//! Data models for article records and their collaborators.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`Article`]: The sparse article record handed to the formatter by the
//!   publishing pipeline
//! - [`Dateline`] / [`Located`]: Nested dateline structure for the `located` field
//! - [`Group`] / [`Reference`]: Package groups for composite articles
//! - [`Subscriber`]: Opaque subscriber identity used for sequencing
//! - [`User`]: A user-directory record used for byline enrichment
//!
//! Field names follow the newsroom wire format (`_id`, `_current_version`,
//! `residRef`, ...), hence the `#[serde(rename = ...)]` attributes. Every
//! article field is optional at the schema level; the formatter decides which
//! absences are contract violations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Deserialize a field so that a present value, including an explicit JSON
/// null, lands in `Some(...)`.
///
/// Plain serde folds `"field": null` and a missing key into the same `None`;
/// wrapping the inner deserialization restores the distinction for double
/// `Option` fields (missing → `None`, null → `Some(None)`, value →
/// `Some(Some(v))`). The field must also carry `#[serde(default)]`.
fn some_if_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Content-type constants for the article `type` field.
pub mod content_type {
    /// Plain text article.
    pub const TEXT: &str = "text";
    /// Preformatted text; rendered as `text` in NINJS output.
    pub const PREFORMATTED: &str = "preformatted";
    /// A package aggregating other items via named groups of references.
    pub const COMPOSITE: &str = "composite";
}

/// The designated top-level group identifier, excluded from association output.
pub const ROOT_GROUP: &str = "root";

/// An article record as produced by the publishing pipeline.
///
/// Records are sparse: apart from `_id`, `_current_version`, and `type`
/// (which the formatter requires), any field may be absent. The record is
/// read-only to this crate.
///
/// # Byline tri-state
///
/// `byline` is a double `Option` so that a key that is *present but null*
/// (formatted as an empty byline) can be told apart from a key that is
/// *absent* (byline resolved through the user directory instead):
///
/// - missing key → `None`
/// - `"byline": null` → `Some(None)`
/// - `"byline": "Jane Doe"` → `Some(Some("Jane Doe"))`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Article {
    /// Unique article identifier.
    #[serde(rename = "_id")]
    pub id: Option<String>,
    /// Version counter, rendered as a string in the output document.
    #[serde(rename = "_current_version")]
    pub current_version: Option<i64>,
    /// Enumerated item type (see [`content_type`]).
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    /// Author credit line. See the tri-state note above.
    #[serde(default, deserialize_with = "some_if_present")]
    pub byline: Option<Option<String>>,
    /// User id of the article's creator, used for byline enrichment when
    /// `byline` itself is absent.
    pub original_creator: Option<String>,
    /// Dateline carrying the `located` sub-structure.
    pub dateline: Option<Dateline>,
    pub versioncreated: Option<DateTime<Utc>>,
    pub usageterms: Option<String>,
    pub subject: Option<Value>,
    pub language: Option<String>,
    pub headline: Option<String>,
    pub urgency: Option<i64>,
    pub pubstatus: Option<String>,
    pub mimetype: Option<String>,
    pub renditions: Option<Value>,
    pub place: Option<Value>,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
    /// Abstract; copied to `description_text` in the output document.
    pub description: Option<String>,
    /// Package groups; consulted only for composite articles.
    pub groups: Option<Vec<Group>>,
    /// Timestamp before which the article must not be published.
    pub embargo: Option<DateTime<Utc>>,
    /// Editorial priority; the output document defaults this to 5.
    pub priority: Option<i64>,
}

/// Dateline information attached to an article.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Dateline {
    /// Where the story was filed from.
    pub located: Option<Located>,
}

/// The place a story was filed from.
///
/// Only the city feeds the output document, but the remaining located
/// fields (state, country, ...) are captured so that an empty `located`
/// object can be told apart from one that simply lacks a city. An empty
/// located is skipped; a non-empty one without a city renders as `""`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Located {
    /// City name; the output `located` field defaults to `""` when absent.
    #[serde(default, deserialize_with = "some_if_present")]
    pub city: Option<Option<String>>,
    /// Remaining located fields, kept only for the emptiness check.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Located {
    /// True when the located structure carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.extra.is_empty()
    }
}

/// A named group of item references inside a composite article.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Group {
    /// Group identifier; the [`ROOT_GROUP`] is excluded from associations.
    pub id: String,
    /// References to the items aggregated under this group.
    #[serde(default)]
    pub refs: Vec<Reference>,
}

/// A reference to another content item inside a group.
///
/// References without a `residRef` are navigational placeholders and are
/// skipped when building associations.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Reference {
    /// Identifier of the referenced content item.
    #[serde(rename = "residRef")]
    pub residref: Option<String>,
    /// Item type of the referenced content item.
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}

/// An opaque subscriber identity.
///
/// The formatter never inspects anything beyond the identifier; it only
/// forwards the subscriber to the sequencing collaborator and attaches the
/// identifier to conversion errors.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Subscriber {
    /// Subscriber identifier, unique within the delivery system.
    #[serde(rename = "_id")]
    pub id: String,
}

impl Subscriber {
    /// Create a subscriber handle from an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A user-directory record, consulted for byline enrichment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    /// User identifier matching `Article::original_creator`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Human-readable name used as the byline.
    pub display_name: Option<String>,
}

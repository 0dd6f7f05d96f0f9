//! Output formatters for subscriber distribution.
//!
//! Each formatter turns an article record into one serialized interchange
//! document plus a publish sequence number for the requesting subscriber.
//! The publishing pipeline probes formatters with [`Formatter::can_format`]
//! and dispatches to the first one that accepts the requested format name.
//!
//! # Submodules
//!
//! - [`ninjs`]: NINJS (JSON news-interchange) formatter

pub mod ninjs;

use crate::error::FormatConversionError;
use crate::models::{Article, Subscriber};

/// A record-to-interchange-format transcoder.
///
/// Implementations hold no mutable state between calls; `format` may be
/// invoked concurrently for different article/subscriber pairs.
pub trait Formatter {
    /// Return `true` when this formatter produces documents for
    /// `format_type`. The article is available for formatters that key on
    /// content type; the NINJS formatter ignores it.
    fn can_format(&self, format_type: &str, article: &Article) -> bool;

    /// Convert `article` into a serialized document for `subscriber`.
    ///
    /// Returns the subscriber's next publish sequence number together with
    /// the document text. Any failure aborts the whole conversion; no
    /// partial document is ever returned.
    fn format(
        &self,
        article: &Article,
        subscriber: &Subscriber,
    ) -> Result<(u64, String), FormatConversionError>;
}

//! Conversions between documents and HTML, Markdown and plain text.
//!
//! Serializers are pure functions of a document snapshot. Deserializers
//! return the raw converted tree; loading it into an [`Editor`](crate::Editor)
//! normalizes it.

pub mod html;
mod html_dom;
pub mod markdown;
pub mod plaintext;

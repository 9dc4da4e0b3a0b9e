//! Field kinds and the mime types they are translated as

use crate::error::MtError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the provider should treat the submitted text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MimeType {
    #[default]
    PlainText,
    /// Markup; tags are kept out of translation
    Html,
}

impl MimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::PlainText => "text/plain",
            MimeType::Html => "text/html",
        }
    }

    /// Google Translate v2 `format` parameter
    pub fn google_format(&self) -> &'static str {
        match self {
            MimeType::PlainText => "text",
            MimeType::Html => "html",
        }
    }
}

impl FromStr for MimeType {
    type Err = MtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text/plain" => Ok(MimeType::PlainText),
            "text/html" => Ok(MimeType::Html),
            other => Err(MtError::InvalidMimeType(other.to_string())),
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of field kinds an entry can expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    PlainText,
    RichText,
    Title,
    Unsupported,
}

impl FieldKind {
    /// `None` means the field cannot be autotranslated
    pub fn mime_type(&self) -> Option<MimeType> {
        match self {
            FieldKind::PlainText | FieldKind::Title => Some(MimeType::PlainText),
            FieldKind::RichText => Some(MimeType::Html),
            FieldKind::Unsupported => None,
        }
    }

    pub fn is_translatable(&self) -> bool {
        self.mime_type().is_some()
    }
}

//! Metadata codecs
//!
//! A codec turns the header block of a document into an ordered key/value
//! map and back. The store only talks to [`MetadataCodec`], so the concrete
//! text format can change without touching storage or query code.

use super::frontmatter::{split_header, Split};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered header contents
pub type Metadata = IndexMap<String, MetaValue>;

/// A single header value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MetaValue::Null)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl<T: Into<String>> From<Option<T>> for MetaValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(MetaValue::Null, |v| MetaValue::Text(v.into()))
    }
}

impl From<Vec<String>> for MetaValue {
    fn from(value: Vec<String>) -> Self {
        MetaValue::List(value)
    }
}

/// Errors raised while reading or writing a header
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Header not properly closed (delimiter must be on its own line)")]
    Unclosed,

    #[error("Failed to decode header: {0}")]
    Decode(String),

    #[error("Failed to encode header: {0}")]
    Encode(String),

    #[error("Header delimiter must not be empty")]
    EmptyDelimiter,
}

/// Document with its header decoded and body separated
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub metadata: Metadata,
    pub body: String,
}

/// Reads and writes a delimited metadata header
pub trait MetadataCodec {
    /// Line that opens and closes the header
    fn delimiter(&self) -> &str;

    /// Decode the raw text between the delimiter lines
    fn decode(&self, raw: &str) -> Result<Metadata, CodecError>;

    /// Encode metadata into header text
    fn encode(&self, metadata: &Metadata) -> Result<String, CodecError>;

    /// Split a document into raw header and body without decoding
    fn split<'a>(&self, content: &'a str) -> Result<Option<Split<'a>>, CodecError> {
        split_header(content, self.delimiter())
    }

    /// Parse a document
    ///
    /// Returns `Ok(None)` when the document has no header at all; a header
    /// that is present but unreadable is an error.
    fn parse(&self, content: &str) -> Result<Option<ParsedDocument>, CodecError> {
        let Some(split) = self.split(content)? else {
            return Ok(None);
        };

        let metadata = if split.header.trim().is_empty() {
            Metadata::new()
        } else {
            // The splitter drops the line break that precedes the closing delimiter
            self.decode(&format!("{}\n", split.header))?
        };

        Ok(Some(ParsedDocument {
            metadata,
            body: split.body.to_string(),
        }))
    }

    /// Render `<delimiter>\n<header>\n<delimiter>\n<body>`
    fn serialize(&self, metadata: &Metadata, body: &str) -> Result<String, CodecError> {
        let encoded = self.encode(metadata)?;
        let encoded = encoded.strip_suffix('\n').unwrap_or(&encoded);
        let delimiter = self.delimiter();
        Ok(format!("{delimiter}\n{encoded}\n{delimiter}\n{body}"))
    }
}

/// YAML header between `---` lines
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl MetadataCodec for YamlCodec {
    fn delimiter(&self) -> &str {
        "---"
    }

    fn decode(&self, raw: &str) -> Result<Metadata, CodecError> {
        serde_yaml::from_str(raw).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn encode(&self, metadata: &Metadata) -> Result<String, CodecError> {
        serde_yaml::to_string(metadata).map_err(|e| CodecError::Encode(e.to_string()))
    }
}

/// JSON object header between `;;;` lines
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl MetadataCodec for JsonCodec {
    fn delimiter(&self) -> &str {
        ";;;"
    }

    fn decode(&self, raw: &str) -> Result<Metadata, CodecError> {
        serde_json::from_str(raw).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn encode(&self, metadata: &Metadata) -> Result<String, CodecError> {
        serde_json::to_string_pretty(metadata).map_err(|e| CodecError::Encode(e.to_string()))
    }
}

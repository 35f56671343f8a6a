//! Header block splitting
//!
//! Finds a delimited metadata header at the very start of a document:
//! - A UTF-8 BOM before the opening delimiter is tolerated
//! - Delimiter lines may carry trailing blanks and end in LF or CRLF
//! - The body after the closing delimiter line is returned untouched

use super::CodecError;

/// A document cut into its raw header and its body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    /// Text between the delimiter lines, without the final line break
    pub header: &'a str,
    /// Everything after the closing delimiter line
    pub body: &'a str,
}

/// Split a header delimited by `delimiter` from the rest of `content`
///
/// # Returns
/// * `Ok(None)` if the document does not start with a delimiter line
/// * `Ok(Some(split))` if a complete header was found
///
/// # Errors
/// * [`CodecError::Unclosed`] if the opening delimiter is never closed
pub fn split_header<'a>(content: &'a str, delimiter: &str) -> Result<Option<Split<'a>>, CodecError> {
    if delimiter.is_empty() {
        return Err(CodecError::EmptyDelimiter);
    }

    let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);

    // Opening line: the delimiter at byte 0
    let Some(after_open) = strip_delimiter_line(content, delimiter) else {
        return Ok(None);
    };

    // Closing line: a delimiter line at the start of the header or after a line break
    if let Some(body) = strip_delimiter_line(after_open, delimiter) {
        return Ok(Some(Split { header: "", body }));
    }
    let mut line_start = 0;
    while let Some(offset) = after_open[line_start..].find('\n') {
        let newline = line_start + offset;
        line_start = newline + 1;
        if let Some(body) = strip_delimiter_line(&after_open[line_start..], delimiter) {
            let header = &after_open[..newline];
            let header = header.strip_suffix('\r').unwrap_or(header);
            return Ok(Some(Split { header, body }));
        }
    }

    Err(CodecError::Unclosed)
}

/// Text after a leading delimiter line (trailing blanks, then LF, CRLF or end of input)
fn strip_delimiter_line<'a>(text: &'a str, delimiter: &str) -> Option<&'a str> {
    let rest = text
        .strip_prefix(delimiter)?
        .trim_start_matches(|c: char| c == ' ' || c == '\t');
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

/// Check whether a document starts with a complete header
pub fn has_header(content: &str, delimiter: &str) -> bool {
    matches!(split_header(content, delimiter), Ok(Some(_)))
}

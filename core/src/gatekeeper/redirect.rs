use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes left alone by JavaScript's `encodeURIComponent`; the warning page
/// decodes with its counterpart.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Where a blocked tab gets sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub block_page_url: String,
    /// Percent-encoded.
    pub original_url: String,
    /// Percent-encoded, reasons joined with `", "`.
    pub reason: String,
}

impl RedirectTarget {
    pub fn build<S: AsRef<str>>(block_page_url: &str, original_url: &str, reasons: &[S]) -> Self {
        let joined = reasons
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            block_page_url: block_page_url.to_string(),
            original_url: encode_component(original_url),
            reason: encode_component(&joined),
        }
    }

    pub fn to_url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.block_page_url.contains('?') { '&' } else { '?' };
        write!(
            f,
            "{}{}url={}&reason={}",
            self.block_page_url, sep, self.original_url, self.reason
        )
    }
}

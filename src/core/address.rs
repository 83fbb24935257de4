//! # Address Validation
//!
//! Turns free-form user text into a [`TargetUrl`] the browser surface can load.
//!
//! ```text
//! "  apple.com "  →  trim  →  "apple.com"
//!                 →  no http(s):// prefix  →  "https://apple.com"
//!                 →  parse + scheme check  →  TargetUrl("https://apple.com")
//! ```
//!
//! Only `http` and `https` are accepted. Input that already names some other
//! scheme (`ftp://`, `file://`) is rejected rather than wrapped in `https://`.

use std::fmt;

use url::Url;

const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// Why a piece of user input could not be turned into a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing left after trimming whitespace.
    EmptyInput,
    /// Not parseable, no host, or a scheme other than http/https.
    InvalidUrl,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyInput => write!(f, "Please enter a URL"),
            ValidationError::InvalidUrl => {
                write!(f, "Please enter a valid URL (starting with http:// or https://)")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// An absolute http/https URL requested by the user.
///
/// Equality is on the normalized text, which is what the browser adapter
/// compares to decide whether a new load is needed. No URL canonicalization
/// happens here: `example.com` and `example.com/` are different targets and
/// each gets its own load.
#[derive(Debug, Clone)]
pub struct TargetUrl {
    text: String,
    parsed: Url,
}

impl TargetUrl {
    /// The normalized text, exactly as shown back in the input field.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn url(&self) -> &Url {
        &self.parsed
    }

    pub fn host(&self) -> Option<&str> {
        self.parsed.host_str()
    }
}

impl PartialEq for TargetUrl {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for TargetUrl {}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Validate and normalize raw user input.
pub fn validate(raw: &str) -> Result<TargetUrl, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let text = if has_http_prefix(trimmed) {
        trimmed.to_string()
    } else if explicit_scheme(trimmed).is_some() {
        // Some other scheme was typed on purpose; don't paper over it.
        return Err(ValidationError::InvalidUrl);
    } else {
        format!("{DEFAULT_SCHEME_PREFIX}{trimmed}")
    };

    let parsed = Url::parse(&text).map_err(|_| ValidationError::InvalidUrl)?;
    let scheme_ok = matches!(parsed.scheme(), "http" | "https");
    if !scheme_ok || parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::InvalidUrl);
    }

    Ok(TargetUrl { text, parsed })
}

fn has_http_prefix(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Returns the scheme if `s` starts with `scheme://` (RFC 3986 scheme chars).
fn explicit_scheme(s: &str) -> Option<&str> {
    let (scheme, _) = s.split_once("://")?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

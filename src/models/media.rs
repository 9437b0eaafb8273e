//! Image reference resolution.
//!
//! A reference is one of:
//! - an absolute URL (`http://…`, `https://…`), used as is;
//! - an inline data URI (`data:…`), used as is;
//! - a bare filename, served from the media base URL.

/// Classification of an image reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaRef<'a> {
    Url(&'a str),
    Inline(&'a str),
    File(&'a str),
}

impl<'a> MediaRef<'a> {
    pub fn classify(reference: &'a str) -> Self {
        let reference = reference.trim();
        if reference.starts_with("http") {
            MediaRef::Url(reference)
        } else if reference.starts_with("data:") {
            MediaRef::Inline(reference)
        } else {
            MediaRef::File(reference)
        }
    }
}

/// Turns stored references into something the renderer can load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    base_url: String,
}

impl MediaResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve one reference.
    pub fn resolve(&self, reference: &str) -> String {
        match MediaRef::classify(reference) {
            MediaRef::Url(url) => url.to_string(),
            MediaRef::Inline(data) => data.to_string(),
            MediaRef::File(name) => {
                format!("{}/{}", self.base_url, name.trim_start_matches('/'))
            }
        }
    }

    /// Resolve a list, dropping blank references.
    pub fn resolve_all<S: AsRef<str>>(&self, references: &[S]) -> Vec<String> {
        valid_refs(references)
            .iter()
            .map(|r| self.resolve(r))
            .collect()
    }
}

/// Non-blank references, in order.
pub fn valid_refs<S: AsRef<str>>(references: &[S]) -> Vec<String> {
    references
        .iter()
        .map(|r| r.as_ref().trim())
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

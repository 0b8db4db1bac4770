use crate::foundation::error::{VfxError, VfxResult};
use std::path::PathBuf;

const PLAIN_PREFIX: &str = "plain:";
const INLINE_PREFIX: &str = "json:";
const FILE_PREFIX: &str = "file://";

/// Where effect content comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResourceLocator {
    /// `plain:<path>`: plain content that does not opt out of preview scaling.
    Plain(PathBuf),
    /// `json:<document>`: an inline document.
    Inline(String),
    /// `file://<path>` or a bare path.
    File(PathBuf),
}

impl ResourceLocator {
    /// Parse a `resource` property value.
    pub fn parse(resource: &str) -> VfxResult<Self> {
        let resource = resource.trim();
        if resource.is_empty() {
            return Err(VfxError::validation("resource must be non-empty"));
        }
        if let Some(rest) = resource.strip_prefix(PLAIN_PREFIX) {
            return Ok(Self::Plain(PathBuf::from(rest)));
        }
        if let Some(rest) = resource.strip_prefix(INLINE_PREFIX) {
            return Ok(Self::Inline(rest.to_string()));
        }
        if let Some(rest) = resource.strip_prefix(FILE_PREFIX) {
            return Ok(Self::File(PathBuf::from(rest)));
        }
        Ok(Self::File(PathBuf::from(resource)))
    }

    /// Whether the resource was given with the `plain:` prefix.
    pub fn is_plain(&self) -> bool {
        matches!(self, Self::Plain(_))
    }

    /// Read the resource into a string.
    pub fn read_to_string(&self) -> VfxResult<String> {
        match self {
            Self::Inline(doc) => Ok(doc.clone()),
            Self::Plain(path) | Self::File(path) => std::fs::read_to_string(path).map_err(|e| {
                VfxError::content(format!("read resource '{}': {e}", path.display()))
            }),
        }
    }
}

impl std::fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(path) => write!(f, "{PLAIN_PREFIX}{}", path.display()),
            Self::Inline(_) => write!(f, "{INLINE_PREFIX}<inline>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/locator.rs"]
mod tests;

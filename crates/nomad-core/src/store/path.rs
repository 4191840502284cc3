//! Document store paths.

use std::fmt;

use crate::error::{NomadError, Result};

/// Path to a collection: an odd number of segments (`users`, `users/u1/chats`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    segments: Vec<String>,
}

/// Path to a document: an even number of segments (`users/u1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// A top-level collection.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// The document `id` inside this collection.
    pub fn doc(&self, id: impl Into<String>) -> DocumentPath {
        let mut segments = self.segments.clone();
        segments.push(id.into());
        DocumentPath { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Rejects segments that cannot be used as storage keys.
    pub fn validate(&self) -> Result<()> {
        validate_segments(&self.segments)
    }
}

impl DocumentPath {
    /// A sub-collection below this document.
    pub fn collection(&self, name: impl Into<String>) -> CollectionPath {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        CollectionPath { segments }
    }

    /// The collection holding this document.
    pub fn parent(&self) -> CollectionPath {
        CollectionPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        }
    }

    /// The document id (last segment).
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Rejects segments that cannot be used as storage keys.
    pub fn validate(&self) -> Result<()> {
        validate_segments(&self.segments)
    }
}

fn validate_segments(segments: &[String]) -> Result<()> {
    for segment in segments {
        let invalid = segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains(['/', '\\'])
            || segment.chars().any(char::is_control);
        if invalid {
            return Err(NomadError::validation(format!(
                "invalid document path segment: {segment:?}"
            )));
        }
    }
    Ok(())
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_paths() {
        let user = CollectionPath::root("users").doc("u1");
        let chat = user.collection("chats").doc("c1");

        assert_eq!(user.to_string(), "users/u1");
        assert_eq!(chat.to_string(), "users/u1/chats/c1");
        assert_eq!(chat.id(), "c1");
        assert_eq!(chat.parent().to_string(), "users/u1/chats");
    }

    #[test]
    fn test_validate_rejects_traversal() {
        let bad = CollectionPath::root("users").doc("..");
        assert!(bad.validate().is_err());
        let bad = CollectionPath::root("users").doc("a/b");
        assert!(bad.validate().is_err());
        let bad = CollectionPath::root("users").doc("");
        assert!(bad.validate().is_err());
        assert!(CollectionPath::root("users").doc("u-1").validate().is_ok());
    }
}

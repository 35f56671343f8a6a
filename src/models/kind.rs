//! Artifact kinds
//!
//! Kinds are an open set: the registry is built from configuration, so a
//! project can track a new kind of document without a new build.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Kinds every project knows about
pub const BUILTIN_KINDS: &[&str] = &["feature", "experiment", "ships-log", "quality-assessment"];

/// A kind name that has been checked against a [`KindRegistry`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ArtifactKind(String);

impl ArtifactKind {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of looking a kind name up in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindLookup {
    Known(ArtifactKind),
    Unknown(String),
}

impl KindLookup {
    pub fn known(self) -> Option<ArtifactKind> {
        match self {
            KindLookup::Known(kind) => Some(kind),
            KindLookup::Unknown(_) => None,
        }
    }
}

/// Set of kind names the engine accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindRegistry {
    kinds: BTreeSet<String>,
}

impl KindRegistry {
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self {
            kinds: BTreeSet::new(),
        };
        for kind in kinds.into_iter().map(Into::into) {
            if Self::is_valid_name(&kind) {
                registry.kinds.insert(kind);
            } else {
                tracing::warn!(kind = %kind, "ignoring kind name that is not lowercase kebab-case");
            }
        }
        registry
    }

    /// Lowercase kebab-case, e.g. `quality-assessment`
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('-')
            && !name.ends_with('-')
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }

    pub fn resolve(&self, name: &str) -> KindLookup {
        if self.kinds.contains(name) {
            KindLookup::Known(ArtifactKind(name.to_string()))
        } else {
            KindLookup::Unknown(name.to_string())
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(String::as_str)
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new(BUILTIN_KINDS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_knows_builtins() {
        let registry = KindRegistry::default();
        for kind in BUILTIN_KINDS {
            assert!(registry.contains(kind));
        }
        assert_eq!(registry.iter().count(), 4);
    }

    #[test]
    fn test_resolve_unknown_kind() {
        let registry = KindRegistry::default();
        assert_eq!(
            registry.resolve("retrospective"),
            KindLookup::Unknown("retrospective".to_string())
        );
        assert!(registry.resolve("retrospective").known().is_none());
    }

    #[test]
    fn test_registry_extends_with_new_kinds() {
        let registry = KindRegistry::new(["feature", "retrospective"]);
        let kind = registry.resolve("retrospective").known().unwrap();
        assert_eq!(kind.as_str(), "retrospective");
    }

    #[test]
    fn test_invalid_names_are_dropped() {
        let registry = KindRegistry::new(["Feature", "", "-x", "ok-kind", "with space"]);
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec!["ok-kind"]);
    }
}

//! QueryEngine - find artifacts matching criteria across a corpus
//!
//! Queries are best-effort scans: documents without a header, or with one
//! that cannot be read, are left out of the results and only logged.

use super::criteria::QueryCriteria;
use crate::models::{StatusRecord, TrackerConfig};
use crate::parser::{MetadataCodec, YamlCodec};
use crate::store::ArtifactStore;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A matching record and the document it came from
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub path: PathBuf,
    pub record: StatusRecord,
}

/// Query engine over the documents below one root directory
#[derive(Debug, Clone)]
pub struct QueryEngine<C = YamlCodec> {
    root: PathBuf,
    config: TrackerConfig,
    store: ArtifactStore<C>,
}

impl QueryEngine {
    pub fn new(root: impl Into<PathBuf>, config: TrackerConfig) -> Self {
        let store = ArtifactStore::new(config.registry());
        Self::with_store(root, config, store)
    }

    /// Engine for `root` using `<root>/tracker.toml` (or the defaults)
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        let config = TrackerConfig::load(&root)?;
        Ok(Self::new(root, config))
    }
}

impl<C: MetadataCodec> QueryEngine<C> {
    pub fn with_store(root: impl Into<PathBuf>, config: TrackerConfig, store: ArtifactStore<C>) -> Self {
        Self {
            root: root.into(),
            config,
            store,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore<C> {
        &self.store
    }

    /// Document paths that may hold artifacts of `kind` (all kinds if `None`)
    pub fn candidates(&self, kind: Option<&str>) -> impl Iterator<Item = PathBuf> {
        self.search_dirs(kind)
            .into_iter()
            .flat_map(|(dir, extension)| walk_documents(dir, extension))
    }

    /// Lazily yield matching records, one document at a time, unsorted
    pub fn scan<'a>(
        &'a self,
        kind: Option<&str>,
        criteria: &'a QueryCriteria,
    ) -> impl Iterator<Item = QueryHit> + 'a {
        let wanted = kind.map(str::to_string);
        if let Some(kind) = &wanted {
            if self.config.layout(kind).is_none() {
                tracing::warn!(kind = %kind, "no layout configured for kind");
            }
        }

        self.candidates(kind)
            .filter_map(move |path| self.load_candidate(path))
            .filter(move |hit| {
                wanted
                    .as_deref()
                    .map_or(true, |kind| hit.record.kind().as_str() == kind)
                    && criteria.matches(&hit.record)
            })
    }

    /// Matching records, most recently updated first, ties by id
    pub fn query(&self, kind: Option<&str>, criteria: &QueryCriteria) -> Vec<QueryHit> {
        let mut hits: Vec<QueryHit> = self.scan(kind, criteria).collect();
        hits.sort_by(|a, b| {
            b.record
                .updated_at()
                .cmp(&a.record.updated_at())
                .then_with(|| a.record.id().cmp(b.record.id()))
        });
        hits
    }

    /// Directory and extension pairs to walk, without repeats
    fn search_dirs(&self, kind: Option<&str>) -> Vec<(PathBuf, String)> {
        let layouts: Vec<_> = match kind {
            Some(kind) => self.config.layout(kind).into_iter().collect(),
            None => self.config.kinds.values().collect(),
        };

        let mut dirs: Vec<(PathBuf, String)> = Vec::new();
        for layout in layouts {
            let entry = (self.root.join(&layout.dir), layout.extension.clone());
            if !dirs.contains(&entry) {
                dirs.push(entry);
            }
        }
        dirs
    }

    fn load_candidate(&self, path: PathBuf) -> Option<QueryHit> {
        match self.store.load(&path) {
            Ok(record) => Some(QueryHit { path, record }),
            Err(err) if err.is_not_found() => {
                tracing::debug!(path = %path.display(), "skipping document without header");
                None
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable document");
                None
            }
        }
    }
}

/// Files below `dir` with the given extension; names starting with `_` are templates
fn walk_documents(dir: PathBuf, extension: String) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(move |e| e.path().extension().map_or(false, |ext| ext == extension.as_str()))
        .filter(|e| !e.file_name().to_string_lossy().starts_with('_'))
        .map(|e| e.into_path())
}

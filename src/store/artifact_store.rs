//! ArtifactStore - binds status records to documents on disk
//!
//! Nothing is cached: every call reads the document as it is on disk right
//! now. Writes go to a temp file in the target's directory which is then
//! renamed over the target, so readers never see a half-written document.
//!
//! There is no cross-process locking. Two processes that update the same
//! document between one's read and the other's write can lose an update.

use crate::error::{StatusError, StatusResult};
use crate::models::{KindLookup, KindRegistry, NewArtifact, StateReason, Status, StatusRecord};
use crate::parser::{MetadataCodec, YamlCodec};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// File-backed store of status records
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore<C = YamlCodec> {
    codec: C,
    registry: KindRegistry,
}

impl ArtifactStore {
    /// Store using the YAML header format
    pub fn new(registry: KindRegistry) -> Self {
        Self::with_codec(YamlCodec, registry)
    }
}

impl<C: MetadataCodec> ArtifactStore<C> {
    pub fn with_codec(codec: C, registry: KindRegistry) -> Self {
        Self { codec, registry }
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Load the record stored in the header of `path`
    pub fn load(&self, path: &Path) -> StatusResult<StatusRecord> {
        let content = fs::read_to_string(path).map_err(|e| StatusError::io(path, e))?;

        let doc = self
            .codec
            .parse(&content)
            .map_err(|e| StatusError::malformed(path, e))?
            .ok_or_else(|| StatusError::NotFound {
                path: path.to_path_buf(),
            })?;

        StatusRecord::from_metadata(&doc.metadata, &self.registry)
            .map_err(|e| StatusError::malformed(path, e))
    }

    /// Register a new artifact in the document at `path`
    ///
    /// The document keeps its current body; a missing file is created empty.
    /// A document that already has a header is never overwritten.
    pub fn create(
        &self,
        path: &Path,
        id: &str,
        kind: &str,
        fields: NewArtifact,
    ) -> StatusResult<StatusRecord> {
        self.create_at(path, id, kind, fields, Utc::now())
    }

    /// [`create`](Self::create) with an explicit creation time
    pub fn create_at(
        &self,
        path: &Path,
        id: &str,
        kind: &str,
        fields: NewArtifact,
        now: DateTime<Utc>,
    ) -> StatusResult<StatusRecord> {
        if id.trim().is_empty() {
            return Err(StatusError::InvalidId);
        }
        let kind = match self.registry.resolve(kind) {
            KindLookup::Known(kind) => kind,
            KindLookup::Unknown(kind) => return Err(StatusError::UnknownKind { kind }),
        };

        let content = read_document(path)?.unwrap_or_default();
        let body = match self.codec.split(&content) {
            Ok(None) => strip_bom(&content),
            Ok(Some(_)) => {
                return Err(StatusError::AlreadyInitialized {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(StatusError::malformed(path, e)),
        };

        let record = StatusRecord::with_timestamp(id, kind, now).with_fields(fields);
        self.write(path, &record, body)?;

        tracing::debug!(id = record.id(), kind = %record.kind(), path = %path.display(), "created artifact");
        Ok(record)
    }

    /// Write `record` into the header of `path`
    ///
    /// The body is re-read right before writing so edits made by other tools
    /// since the record was loaded are kept. `updated_at` is written as-is.
    pub fn save(&self, path: &Path, record: &StatusRecord) -> StatusResult<()> {
        let content = read_document(path)?.unwrap_or_default();
        let body = match self.codec.split(&content) {
            Ok(Some(split)) => split.body,
            Ok(None) => strip_bom(&content),
            Err(e) => return Err(StatusError::malformed(path, e)),
        };

        self.write(path, record, body)?;

        tracing::debug!(id = record.id(), status = %record.status(), path = %path.display(), "saved artifact");
        Ok(())
    }

    /// Load, transition and save; nothing is written when the move is refused
    pub fn transition(
        &self,
        path: &Path,
        target: Status,
        reason: Option<StateReason>,
    ) -> StatusResult<StatusRecord> {
        let mut record = self.load(path)?;
        record.try_transition_to(target, reason)?;
        self.save(path, &record)?;
        Ok(record)
    }

    /// Like [`transition`](Self::transition) but a refused move is `Ok(false)`
    pub fn update_status(
        &self,
        path: &Path,
        target: Status,
        reason: Option<StateReason>,
    ) -> StatusResult<bool> {
        match self.transition(path, target, reason) {
            Ok(_) => Ok(true),
            Err(StatusError::InvalidTransition(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Apply a field update; saves only when `update` reports a change
    ///
    /// ```no_run
    /// # use artifact_status::{ArtifactStore, KindRegistry};
    /// # use std::path::Path;
    /// let store = ArtifactStore::new(KindRegistry::default());
    /// store.modify(Path::new("features/search.md"), |r| r.add_assignee("alice"))?;
    /// # Ok::<(), artifact_status::StatusError>(())
    /// ```
    pub fn modify<F>(&self, path: &Path, update: F) -> StatusResult<bool>
    where
        F: FnOnce(&mut StatusRecord) -> bool,
    {
        let mut record = self.load(path)?;
        if !update(&mut record) {
            return Ok(false);
        }
        self.save(path, &record)?;
        Ok(true)
    }

    fn write(&self, path: &Path, record: &StatusRecord, body: &str) -> StatusResult<()> {
        let content = self
            .codec
            .serialize(&record.to_metadata(), body)
            .map_err(|e| StatusError::malformed(path, e))?;
        write_atomic(path, &content)
    }
}

/// Read a document; a missing file is `None`
fn read_document(path: &Path) -> StatusResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StatusError::io(path, e)),
    }
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{FEFF}').unwrap_or(content)
}

/// Atomic write: temp file in the same directory, then persist (rename over target)
fn write_atomic(path: &Path, content: &str) -> StatusResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| StatusError::io(path, e))?;

    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| StatusError::io(path, e))?;
    fill_temp(&mut temp_file, content).map_err(|e| StatusError::io(path, e))?;

    // The temp file is owner-only; an existing document keeps its own mode
    match fs::metadata(path) {
        Ok(metadata) => temp_file
            .as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| StatusError::io(path, e))?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(StatusError::io(path, e)),
    }

    // On failure the temp file is dropped and removed; the target is untouched
    temp_file
        .persist(path)
        .map_err(|e| StatusError::io(path, e.error))?;

    Ok(())
}

fn fill_temp(temp_file: &mut NamedTempFile, content: &str) -> std::io::Result<()> {
    temp_file.write_all(content.as_bytes())?;
    temp_file.flush()?;
    temp_file.as_file().sync_all()
}

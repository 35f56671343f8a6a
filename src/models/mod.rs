pub mod config;
pub mod kind;
pub mod record;
pub mod status;

pub use config::{KindLayout, TrackerConfig, CONFIG_FILE};
pub use kind::{ArtifactKind, KindLookup, KindRegistry, BUILTIN_KINDS};
pub use record::{NewArtifact, RecordError, StatusRecord, STATUS_KEYS};
pub use status::{StateReason, Status};

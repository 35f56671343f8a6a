// Artifact Status - lifecycle tracking for project artifacts
// Status lives in a metadata header at the top of each document

pub mod error;
pub mod models;
pub mod parser;
pub mod query;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use error::{MalformedCause, StatusError, StatusResult};
pub use models::{
    ArtifactKind, KindLayout, KindRegistry, NewArtifact, StateReason, Status, StatusRecord,
    TrackerConfig,
};
pub use parser::{JsonCodec, MetadataCodec, YamlCodec};
pub use query::{QueryCriteria, QueryEngine, QueryHit};
pub use state::{TransitionError, TransitionValidator};
pub use store::ArtifactStore;

pub mod codec;
pub mod frontmatter;

pub use codec::{CodecError, JsonCodec, MetaValue, Metadata, MetadataCodec, ParsedDocument, YamlCodec};
pub use frontmatter::{has_header, split_header, Split};

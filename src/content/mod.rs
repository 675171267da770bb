//! Content module - reading, converting and writing posts

mod assets;
pub mod frontmatter;
mod normalize;
mod post;
pub mod shortcode;

pub use assets::AssetRelocator;
pub use frontmatter::{MatterFormat, SourceMeta};
pub use normalize::{parse_published, CoverImage, DestinationMatter, Normalizer};
pub use post::{DestinationPost, SourcePost};
pub use shortcode::{ShortcodeRewriter, ShortcodeRule};

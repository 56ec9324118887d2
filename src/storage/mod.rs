//! On-disk artifact storage
//!
//! Artifacts live at `<root>/<collection_slug>/<item_slug>.<ext>`. The mere
//! presence of an artifact, at any size, means the item is done:
//! - non-empty files hold normalized transcript text
//! - zero-length files are permanent negative-cache markers
//!
//! There is no other persisted state. [`ArtifactIndex`] pre-loads directory
//! listings so the dedup pass does not stat every item individually.

mod artifacts;
mod index;

pub use artifacts::{validate_slug, ArtifactStore};
pub use index::ArtifactIndex;

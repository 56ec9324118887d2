//! Embedded page payload handling
//!
//! Collection and item pages carry their data as a JSON blob embedded in the
//! markup. This module covers:
//! - Locating and parsing that blob ([`PayloadExtractor`])
//! - Decoding the collection and item views of it
//! - Normalizing the raw description markup into plain text

mod extractor;
mod normalize;
mod pages;

pub use extractor::{NextDataExtractor, PayloadExtractor};
pub use normalize::{is_substantive, normalize_description};
pub use pages::{CollectionPayload, ItemPayload};

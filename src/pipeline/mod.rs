//! The harvesting pipeline
//!
//! This module contains the three stages and the pool they run on:
//! - Discovery: partition keys → collection descriptors
//! - Resolution: descriptors → manifest entries with item slugs
//! - Harvest: manifest → dedup → fetch, extract, and persist each item
//!
//! Data flows strictly downstream; no stage feeds an earlier one.

mod discover;
mod harvest;
mod pool;
mod resolve;
mod runner;

pub use discover::{discover, CollectionDescriptor};
pub use harvest::{HarvestJob, HarvestPlan, Harvester};
pub use pool::WorkerPool;
pub use resolve::{ResolvedManifestEntry, Resolver};
pub use runner::{run_harvest, Pipeline};

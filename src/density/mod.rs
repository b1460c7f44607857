//! Density fields: generation, persistence and the tiered store.
//!
//! - [`field`]: `DensityField` samples and their `FieldLayout`
//! - [`generator`]: procedural sources and `DensityGenerator`
//! - [`storage`]: raw little-endian field files
//! - [`store`]: `DensityStore` - overlay → cache → file → procedural

pub mod field;
pub mod generator;
pub mod storage;
pub mod store;

pub use field::{DensityField, FieldLayout};
pub use generator::{offset_rng, source_from_settings, DensityGenerator, DensitySource, NoiseBuilder, PlaneBuilder};
pub use store::DensityStore;

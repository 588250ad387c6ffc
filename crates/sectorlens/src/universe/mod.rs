//! Sector universe.
//!
//! The run iterates an immutable, ordered [`SectorCatalog`]. The built-in
//! catalog mirrors the sector filter of the source site; a JSON file can
//! replace it.

pub mod catalog;

pub use catalog::SectorCatalog;

// Battle Schema - shared content records
// Everything in this crate is immutable catalog data: the engine reads it,
// authoring tools and RON catalogs produce it. No battle behavior lives here.

// Re-export the main types
pub use battle_data::*;
pub use element_types::*;
pub use move_types::*;
pub use species_data::*;

pub mod battle_data;
pub mod element_types;
pub mod move_types;
pub mod species_data;

//! Layered damage calculation.
//!
//! A `DamageContext` is built per hit and handed through a fixed chain of
//! `DamageStep`s. Each step reads and writes the context; the final integer
//! is produced once, after every step has run.

pub mod context;
pub mod pipeline;
pub mod steps;

pub use context::DamageContext;
pub use pipeline::{DamageOverrides, DamagePipeline};
pub use steps::DamageStep;

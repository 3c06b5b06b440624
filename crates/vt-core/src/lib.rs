//! vt-core: shared types, IDs, errors, configuration, and clocks.
//!
//! This crate is the foundational dependency for all other vt-* crates,
//! providing type-safe identifiers, a unified error type, the catalog
//! records for stored videos and share links, the upload policy with its
//! size parser, and application configuration.

pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod models;
pub mod policy;
pub mod size;

// Re-export the most commonly used items at the crate root.
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, ErrorKind, Result};
pub use ids::*;
pub use models::{Artifact, NewArtifact, ShareLink};
pub use policy::UploadPolicy;
pub use size::parse_size;

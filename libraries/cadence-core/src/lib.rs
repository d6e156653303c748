//! Cadence Core
//!
//! Domain types and collaborator traits shared by every Cadence crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`
//! - **Collaborator Traits**: `Catalog` (track listing, recently-played and favorite writes)
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Track, TrackId};
//!
//! let track = Track::new(TrackId::new(1), "/media/first.mp3", 215.0)
//!     .with_name("First Light")
//!     .with_artist("The Wanderers");
//!
//! assert_eq!(track.id, TrackId::new(1));
//! assert_eq!(track.duration, 215.0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::{Catalog, MemoryCatalog};
pub use error::{CoreError, Result};
pub use types::{Track, TrackId};

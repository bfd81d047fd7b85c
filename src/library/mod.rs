//! Media library snapshots.
//!
//! The platform media index is an external collaborator behind
//! [`MediaSource`]. [`MediaLibrary`] queries it, derives date sections,
//! albums and the timeline index, and publishes the result as one immutable
//! [`LibrarySnapshot`] so readers never see a half-built index.

pub mod media_library;
pub mod source;

pub use media_library::*;
pub use source::*;

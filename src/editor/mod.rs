//! Photo edit planning.
//!
//! The editor only records what the user asked for (crop, quarter-turn
//! rotation, flips) and produces an [`EditPlan`]; decoding and encoding the
//! pixels belongs to the image codec of the host.

pub mod crop;
pub mod session;

pub use crop::*;
pub use session::*;

pub mod index;
pub mod scrubber;

pub use index::*;
pub use scrubber::*;

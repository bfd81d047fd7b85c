pub mod album;
pub mod date_section;
pub mod media_item;

pub use album::*;
pub use date_section::*;
pub use media_item::*;

pub mod animation;
pub mod pager;
pub mod presentation;
pub mod surface;

pub use animation::*;
pub use pager::*;
pub use presentation::*;
pub use surface::*;

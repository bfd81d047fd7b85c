pub mod preference_store;
pub mod settings;

pub use preference_store::*;
pub use settings::*;

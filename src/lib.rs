//! Headless core of the glint gallery.
//!
//! - `timeline`: scroll-fraction <-> slot mapping and section labels for the
//!   fast-scroll scrubber
//! - `gesture`: per-surface pointer state machine (tap, double-tap, vertical
//!   dismiss drag, pinch/pan)
//! - `viewer`: zoom state, animations, touch surfaces, pager and presentation
//! - `library`: immutable media snapshots rebuilt on source changes
//! - `editor`: crop/rotate/flip edit planning
//! - `config`: persisted settings

pub mod config;
pub mod editor;
pub mod geometry;
pub mod gesture;
pub mod library;
pub mod models;
pub mod state;
pub mod timeline;
pub mod viewer;

pub use config::{PreferenceStore, ScrollerPosition, Settings};
pub use editor::{EditPlan, EditSession};
pub use geometry::{Rect, Size, Vec2};
pub use gesture::{GestureAction, GestureConfig, GestureResolver, PointerSample};
pub use library::{MediaLibrary, MediaSource};
pub use models::{DateSection, MediaId, MediaKind, MediaRecord};
pub use timeline::{Scrubber, TimelineIndex};
pub use viewer::{TouchSurface, ViewCoordinator, ViewerPager};

/// Installs the fmt subscriber used by hosts and tests.
///
/// `RUST_LOG` is honored; `glint=info` is added as the default directive.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "glint=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    // A second call (tests, embedding hosts) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

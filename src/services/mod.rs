//! Service layer: filters, conflict detection, and script emission.
//!
//! Services are pure functions over event lists; the only I/O in this
//! layer is template loading in [`script`].

pub mod conflicts;
pub mod night_window;
pub mod script;
pub mod telescope;

pub use conflicts::conflict_groups;
pub use night_window::in_night_window;
pub use script::{render_script, ScriptTemplates};
pub use telescope::Telescope;

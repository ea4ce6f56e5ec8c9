//! Session state: live measurement, snapshots, colors

pub mod manager;
pub mod palette;
pub mod state;

pub use manager::SessionManager;
pub use palette::{Palette, Rgba};
pub use state::MeasurementState;

//! Bevy front end for the editor AR simulation.
//!
//! Drives an [`ar_core::ArInterface`] from the frame clock, moves the AR
//! camera rig from polled input, composites the passthrough background and
//! mirrors detected planes into the `World`.

pub mod background;
pub mod camera;
pub mod overlay;
pub mod planes;
pub mod plugin;
pub mod point_cloud;
pub mod session;

pub use plugin::{ArSet, ArSimPlugin};
pub use session::{ArSession, SessionCommand};

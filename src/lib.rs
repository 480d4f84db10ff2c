//! Star Striker - a 3D arcade space shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, game state)
//! - `host`: Collaborator traits the browser shell implements (scene, HUD, audio)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `error`: Error types

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod error;
pub mod host;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{CollaboratorError, TuningError};
pub use host::{
    AssetProvider, AssetStatus, HitBanner, Notifier, Scene, SessionAction, confirm_action, dispatch,
};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Simulation rate
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep (one 60 Hz display frame)
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

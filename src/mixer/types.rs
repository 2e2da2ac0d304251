// Core mixer types and data structures
//
// This module contains the fundamental data structures for the volume
// engine: lifecycle states, the composite decibel range, engine
// configuration, status reporting, and the error taxonomy.

use serde::{Deserialize, Serialize};

/// Returned by volume reads when the engine is not ready or a hardware read
/// fails. Far below the native range of any real element.
pub const SILENCE_DB: f64 = -200.0;

/// Lifecycle of one mixer engine instance.
///
/// `InError` is never stored: it is what callers observe when the stored
/// state reads `Ready` but the card handle is gone or no longer alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MixerState {
    Uninitialized,
    Initializing,
    Ready,
    ShuttingDown,
    InError,
}

/// Composite volume limits in decibels: master range plus PCM trim range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeRange {
    pub min_db: f64,
    pub max_db: f64,
}

/// Engine construction parameters: which card to open and the fixed names
/// of the two physical elements it composes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixerEngineConfig {
    pub card_name: String,
    /// Name of the required coarse attenuator.
    pub master_element: String,
    /// Name of the optional fine trim attenuator.
    pub pcm_element: String,
}

impl Default for MixerEngineConfig {
    fn default() -> Self {
        Self {
            card_name: "default".to_string(),
            master_element: "Master".to_string(),
            pcm_element: "PCM".to_string(),
        }
    }
}

/// Point-in-time engine status for monitoring surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct MixerStatus {
    pub state: MixerState,
    pub volume_db: f64,
    pub muted: bool,
    pub limits: Option<VolumeRange>,
}

/// Errors surfaced by driver backends and the conversion layer.
///
/// None of these are fatal to a running engine: the public facade degrades
/// to no-ops/defaults and logs instead of propagating.
#[derive(Debug, thiserror::Error)]
pub enum MixerError {
    #[error("Failed to open mixer device: {0}")]
    DeviceOpen(String),

    #[error("Mixer element not found: {name}")]
    ElementNotFound { name: String },

    #[error("Element volume range is degenerate")]
    DegenerateRange,

    #[error("Element handle does not belong to this device")]
    UnknownElement,

    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}

/// Convenience Result type for mixer operations
pub type MixerResult<T> = std::result::Result<T, MixerError>;

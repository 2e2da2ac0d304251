// Mixer module - hardware volume engine for a single sound card
//
// This module provides the volume engine broken down into logical components:
// - types: Core data types, configuration, status, and errors
// - driver: Driver traits plus the ALSA and in-memory backends
// - element_volume: Raw-step <-> decibel conversion per element
// - compositor: Master + PCM trim volume splitting
// - lifecycle: Guarded engine state machine
// - init_worker: Hardware probe and the dedicated init thread
// - engine_core: Public MixerEngine facade

pub mod types;
pub mod driver;
pub mod element_volume;
pub mod compositor;
pub(crate) mod lifecycle;
pub(crate) mod init_worker;
pub mod engine_core;

// Re-export commonly used types for easier imports
pub use types::{
    MixerEngineConfig, MixerError, MixerResult, MixerState, MixerStatus, VolumeRange, SILENCE_DB,
};

pub use driver::{ElementHandle, MixerDevice, MixerDriver};
pub use driver::fake::{FakeCardState, FakeElement, FakeMixerDriver};

#[cfg(all(target_os = "linux", feature = "alsa-backend"))]
pub use driver::alsa_backend::AlsaMixerDriver;

pub use engine_core::MixerEngine;

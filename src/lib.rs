pub mod log;
pub mod mixer;

// Re-export mixer types for testing and external use
pub use mixer::{
    ElementHandle, FakeCardState, FakeElement, FakeMixerDriver, MixerDevice, MixerDriver,
    MixerEngine, MixerEngineConfig, MixerError, MixerResult, MixerState, MixerStatus, VolumeRange,
    SILENCE_DB,
};

#[cfg(all(target_os = "linux", feature = "alsa-backend"))]
pub use mixer::AlsaMixerDriver;

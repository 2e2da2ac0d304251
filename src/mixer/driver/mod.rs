// Mixer driver abstraction
//
// The engine never talks to a sound card directly. All hardware access goes
// through the MixerDriver/MixerDevice traits so the platform layer can be
// swapped for the in-memory backend in tests:
// - alsa_backend: real ALSA simple-mixer backend (Linux, `alsa-backend` feature)
// - fake: configurable in-memory card used by the test-suite

use crate::mixer::types::MixerResult;

#[cfg(test)]
use mockall::automock;

#[cfg(all(target_os = "linux", feature = "alsa-backend"))]
pub mod alsa_backend;
pub mod fake;

/// Handle to one physical mixer control, issued by a `MixerDevice`.
///
/// Only valid for the device that issued it; the device keeps the backing
/// element alive for as long as the session is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub(crate) u32);

/// One open mixer session on a sound card.
#[cfg_attr(test, automock)]
pub trait MixerDevice: Send {
    /// Whether the underlying card handle is still usable.
    fn is_alive(&self) -> bool;

    /// Resolve a simple mixer element by its fixed name.
    fn find_element(&mut self, name: &str) -> Option<ElementHandle>;

    /// Raw integer step range `(lo, hi)` of the element's playback volume.
    fn raw_volume_range(&self, element: ElementHandle) -> MixerResult<(i64, i64)>;

    /// Native decibel range `(lo, hi)` of the element's playback volume.
    fn db_volume_range(&self, element: ElementHandle) -> MixerResult<(f64, f64)>;

    /// Current playback volume in decibels, as the driver reports it.
    fn db_volume(&self, element: ElementHandle) -> MixerResult<f64>;

    /// Current raw playback volume step.
    fn raw_volume(&self, element: ElementHandle) -> MixerResult<i64>;

    /// Set the raw playback volume on all channels of the element.
    fn set_raw_volume_all(&mut self, element: ElementHandle, raw: i64) -> MixerResult<()>;

    /// Current playback switch state (true = audible).
    fn playback_switch(&self, element: ElementHandle) -> MixerResult<bool>;

    /// Set the playback switch on all channels of the element.
    fn set_playback_switch_all(&mut self, element: ElementHandle, on: bool) -> MixerResult<()>;
}

/// Factory for mixer sessions. `open` covers the whole open/attach/register/
/// load sequence of the underlying mixer API for one named card.
#[cfg_attr(test, automock)]
pub trait MixerDriver: Send + Sync {
    fn open(&self, card_name: &str) -> MixerResult<Box<dyn MixerDevice>>;
}

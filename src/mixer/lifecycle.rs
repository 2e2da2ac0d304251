// Mixer lifecycle state
//
// Everything the engine mutates lives in `MixerShared`, behind the engine's
// single lock: the lifecycle state, the open card handle, the resolved
// element handles, the cached composite range, and the saved mute volume.
// The handle is `Some` exactly while the stored state is `Ready`.

use super::driver::{ElementHandle, MixerDevice};
use super::types::{MixerState, VolumeRange};

pub(crate) struct MixerShared {
    pub(crate) state: MixerState,
    pub(crate) device: Option<Box<dyn MixerDevice>>,
    pub(crate) master: Option<ElementHandle>,
    pub(crate) pcm: Option<ElementHandle>,
    pub(crate) limits: Option<VolumeRange>,
    /// Composite dB captured when mute engages, restored on unmute.
    pub(crate) save_volume_db: f64,
}

impl MixerShared {
    pub(crate) fn new() -> Self {
        Self {
            state: MixerState::Uninitialized,
            device: None,
            master: None,
            pcm: None,
            limits: None,
            save_volume_db: 0.0,
        }
    }

    /// UNINITIALIZED → INITIALIZING. Refused from any other state.
    pub(crate) fn begin_initialization(&mut self) -> bool {
        if self.state != MixerState::Uninitialized {
            return false;
        }
        self.state = MixerState::Initializing;
        true
    }

    /// INITIALIZING → READY with the probed card installed.
    pub(crate) fn complete_initialization(
        &mut self,
        device: Box<dyn MixerDevice>,
        master: ElementHandle,
        pcm: Option<ElementHandle>,
        limits: VolumeRange,
    ) {
        self.device = Some(device);
        self.master = Some(master);
        self.pcm = pcm;
        self.limits = Some(limits);
        self.state = MixerState::Ready;
    }

    /// READY → SHUTTING_DOWN: drop the card handle and clear the element
    /// handles scoped to it. Returns true when a handle was actually closed.
    pub(crate) fn begin_shutdown(&mut self) -> bool {
        let had_device = self.device.take().is_some();
        if had_device || self.state == MixerState::Ready {
            self.state = MixerState::ShuttingDown;
        }
        self.master = None;
        self.pcm = None;
        had_device
    }

    /// True when volume/mute operations are allowed.
    pub(crate) fn is_ready(&self) -> bool {
        self.state == MixerState::Ready && self.device.is_some()
    }

    /// State as reported to callers. READY with a dead or missing handle is
    /// reported as IN_ERROR without rewriting the stored state.
    pub(crate) fn observed_state(&self) -> MixerState {
        if self.state == MixerState::Ready {
            match &self.device {
                Some(device) if device.is_alive() => MixerState::Ready,
                _ => MixerState::InError,
            }
        } else {
            self.state
        }
    }
}

// Mixer engine facade
//
// Public surface of the volume engine. Every operation takes the engine
// lock for its whole duration and checks the lifecycle state; operations
// outside READY degrade to no-ops or defaults instead of failing hard, so
// a mixer that never came up is inert rather than fatal.

use std::sync::{Arc, Mutex, MutexGuard};

use colored::Colorize;
use tracing::{info, warn};

use super::compositor;
use super::driver::MixerDriver;
use super::element_volume;
use super::init_worker::{self, InitWorker};
use super::lifecycle::MixerShared;
use super::types::{MixerEngineConfig, MixerState, MixerStatus, VolumeRange, SILENCE_DB};
use crate::mixer_debug;

/// Hardware volume-mixer engine for one sound card.
///
/// Composes the card's master attenuator and optional PCM trim attenuator
/// into a single decibel-scale volume/mute interface. Safe to share across
/// threads; all state is guarded by one exclusive lock.
pub struct MixerEngine {
    config: MixerEngineConfig,
    driver: Arc<dyn MixerDriver>,
    shared: Arc<Mutex<MixerShared>>,
    init_worker: Mutex<Option<InitWorker>>,
}

impl std::fmt::Debug for MixerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixerEngine")
            .field("config", &self.config)
            .finish()
    }
}

impl MixerEngine {
    /// Create an engine over the given driver. No hardware is touched until
    /// one of the init entry points runs.
    pub fn new(config: MixerEngineConfig, driver: Arc<dyn MixerDriver>) -> Self {
        Self {
            config,
            driver,
            shared: Arc::new(Mutex::new(MixerShared::new())),
            init_worker: Mutex::new(None),
        }
    }

    /// Engine over the real ALSA driver.
    #[cfg(all(target_os = "linux", feature = "alsa-backend"))]
    pub fn with_alsa(config: MixerEngineConfig) -> Self {
        Self::new(config, Arc::new(super::driver::alsa_backend::AlsaMixerDriver))
    }

    pub fn config(&self) -> &MixerEngineConfig {
        &self.config
    }

    fn lock_shared(&self) -> MutexGuard<'_, MixerShared> {
        self.shared.lock().unwrap()
    }

    /// Begin asynchronous initialization on the dedicated worker thread.
    ///
    /// `on_complete` fires with the probe outcome. Returns false (after
    /// firing the callback with false) when the engine is not
    /// UNINITIALIZED or the worker thread cannot start.
    pub fn init<F>(&self, on_complete: F) -> bool
    where
        F: FnOnce(bool) + Send + 'static,
    {
        if !self.lock_shared().begin_initialization() {
            warn!("🎛️ MIXER: init requested on an already-initialized engine, ignoring");
            on_complete(false);
            return false;
        }

        let worker = InitWorker::spawn(
            self.driver.clone(),
            self.config.clone(),
            self.shared.clone(),
            Box::new(on_complete),
        );
        match worker {
            Some(worker) => {
                *self.init_worker.lock().unwrap() = Some(worker);
                true
            }
            None => false,
        }
    }

    /// Run the probe on the calling thread, blocking until it finishes.
    /// Returns true iff the engine reached READY.
    pub fn init_sync(&self) -> bool {
        if !self.lock_shared().begin_initialization() {
            warn!("🎛️ MIXER: init requested on an already-initialized engine, ignoring");
            return false;
        }
        init_worker::run_probe(self.driver.as_ref(), &self.config, &self.shared)
    }

    /// Composite volume in decibels. Returns the silence floor when the
    /// engine is not ready or the hardware read fails.
    pub fn volume_db(&self) -> f64 {
        let inner = self.lock_shared();
        if !inner.is_ready() {
            return SILENCE_DB;
        }
        match (&inner.device, inner.master) {
            (Some(device), Some(master)) => {
                compositor::composite_volume_db(device.as_ref(), master, inner.pcm)
                    .unwrap_or(SILENCE_DB)
            }
            _ => SILENCE_DB,
        }
    }

    /// Apply a composite volume request. No-op outside READY.
    pub fn set_volume_db(&self, target_db: f64) {
        let mut guard = self.lock_shared();
        let inner = &mut *guard;
        if !inner.is_ready() {
            mixer_debug!("🎛️ MIXER: set_volume_db({:.2}) ignored, not ready", target_db);
            return;
        }
        let pcm = inner.pcm;
        if let (Some(device), Some(master)) = (inner.device.as_deref_mut(), inner.master) {
            match compositor::set_composite_volume_db(device, master, pcm, target_db) {
                Ok(()) => mixer_debug!("🎛️ MIXER: volume set to {:.2} dB", target_db),
                Err(e) => warn!("🎛️ MIXER: failed to set volume to {:.2} dB: {}", target_db, e),
            }
        }
    }

    /// Whether playback is muted. False outside READY.
    pub fn is_muted(&self) -> bool {
        let inner = self.lock_shared();
        if !inner.is_ready() {
            return false;
        }
        match (&inner.device, inner.master) {
            (Some(device), Some(master)) => {
                element_volume::element_muted(device.as_ref(), master).unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Engage or release mute. No-op outside READY.
    ///
    /// Disabling the playback switch does not reliably silence every
    /// element, so engaging mute also saves the composite volume and drives
    /// it to the range floor; releasing mute restores the saved volume.
    pub fn set_muted(&self, mute: bool) {
        let mut guard = self.lock_shared();
        let inner = &mut *guard;
        if !inner.is_ready() {
            mixer_debug!("🔇 MIXER: set_muted({}) ignored, not ready", mute);
            return;
        }
        let pcm = inner.pcm;
        let limits = inner.limits;
        let (device, master) = match (inner.device.as_deref_mut(), inner.master) {
            (Some(device), Some(master)) => (device, master),
            _ => return,
        };

        if mute {
            match compositor::composite_volume_db(device, master, pcm) {
                Ok(current) => inner.save_volume_db = current,
                Err(e) => warn!("🔇 MIXER: could not read volume before mute: {}", e),
            }
            if let Err(e) = element_volume::set_element_muted(device, master, true) {
                warn!("🔇 MIXER: failed to switch master off: {}", e);
            }
            if let Some(pcm) = pcm {
                if let Err(e) = element_volume::set_element_muted(device, pcm, true) {
                    warn!("🔇 MIXER: failed to switch pcm off: {}", e);
                }
            }
            if let Some(limits) = limits {
                if let Err(e) =
                    compositor::set_composite_volume_db(device, master, pcm, limits.min_db)
                {
                    warn!("🔇 MIXER: failed to drive volume to floor: {}", e);
                }
            }
            mixer_debug!("🔇 MIXER: muted, saved {:.2} dB", inner.save_volume_db);
        } else {
            if let Err(e) = element_volume::set_element_muted(device, master, false) {
                warn!("🔊 MIXER: failed to switch master on: {}", e);
            }
            if let Some(pcm) = pcm {
                if let Err(e) = element_volume::set_element_muted(device, pcm, false) {
                    warn!("🔊 MIXER: failed to switch pcm on: {}", e);
                }
            }
            let restore_db = inner.save_volume_db;
            if let Err(e) = compositor::set_composite_volume_db(device, master, pcm, restore_db) {
                warn!("🔊 MIXER: failed to restore {:.2} dB: {}", restore_db, e);
            }
            mixer_debug!("🔊 MIXER: unmuted, restored {:.2} dB", restore_db);
        }
    }

    /// Composite volume limits computed at initialization. None outside READY.
    pub fn volume_limits(&self) -> Option<VolumeRange> {
        let inner = self.lock_shared();
        if inner.is_ready() {
            inner.limits
        } else {
            None
        }
    }

    /// Current lifecycle state, self-correcting to IN_ERROR when the card
    /// handle has been invalidated underneath a READY engine.
    pub fn state(&self) -> MixerState {
        self.lock_shared().observed_state()
    }

    /// Comprehensive engine status for monitoring
    pub fn status(&self) -> MixerStatus {
        MixerStatus {
            state: self.state(),
            volume_db: self.volume_db(),
            muted: self.is_muted(),
            limits: self.volume_limits(),
        }
    }

    /// Stop the worker thread and close the card handle. Idempotent; also
    /// runs on drop. The worker is joined before the handle is released so
    /// an in-flight probe can never outlive the card.
    pub fn shutdown(&self) {
        if let Some(mut worker) = self.init_worker.lock().unwrap().take() {
            worker.join();
        }
        if self.lock_shared().begin_shutdown() {
            info!(
                "{}: closed mixer card '{}'",
                "MIXER_SHUTDOWN".on_blue().cyan(),
                self.config.card_name
            );
        }
    }
}

impl Drop for MixerEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::driver::MockMixerDriver;
    use crate::mixer::types::MixerError;

    #[test]
    fn init_sync_fails_when_driver_cannot_open() {
        let mut driver = MockMixerDriver::new();
        driver.expect_open().times(1).returning(|card| {
            Err(MixerError::DeviceOpen(format!("no such card '{}'", card)))
        });

        let engine = MixerEngine::new(MixerEngineConfig::default(), Arc::new(driver));
        assert!(!engine.init_sync());
        assert_eq!(engine.state(), MixerState::Initializing);
        assert_eq!(engine.volume_db(), SILENCE_DB);
    }

    #[test]
    fn failed_engine_never_reopens_the_card() {
        let mut driver = MockMixerDriver::new();
        driver
            .expect_open()
            .times(1)
            .returning(|_| Err(MixerError::DeviceOpen("gone".to_string())));

        let engine = MixerEngine::new(MixerEngineConfig::default(), Arc::new(driver));
        assert!(!engine.init_sync());

        // Further calls are rejected before the driver is touched.
        assert!(!engine.init_sync());
        engine.set_volume_db(-10.0);
        engine.set_muted(true);
        assert!(engine.volume_limits().is_none());
    }
}

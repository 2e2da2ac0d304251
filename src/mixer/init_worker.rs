// Hardware probe and initialization worker
//
// The probe opens the named card, resolves the master element (required)
// and the PCM trim element (optional), and computes the composite volume
// range. The same routine backs the blocking and the worker-thread entry
// points; only the execution context differs.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use colored::Colorize;
use tracing::{info, warn};

use super::driver::{ElementHandle, MixerDevice, MixerDriver};
use super::lifecycle::MixerShared;
use super::types::{MixerEngineConfig, MixerError, MixerResult, MixerState, VolumeRange};

struct ProbedCard {
    device: Box<dyn MixerDevice>,
    master: ElementHandle,
    pcm: Option<ElementHandle>,
    limits: VolumeRange,
}

fn probe_device(driver: &dyn MixerDriver, config: &MixerEngineConfig) -> MixerResult<ProbedCard> {
    let mut device = driver.open(&config.card_name)?;

    let master = device
        .find_element(&config.master_element)
        .ok_or_else(|| MixerError::ElementNotFound {
            name: config.master_element.clone(),
        })?;
    let (mut min_db, mut max_db) = device.db_volume_range(master)?;

    // A missing trim element degrades to single-element control.
    let pcm = device.find_element(&config.pcm_element);
    if let Some(pcm) = pcm {
        let (pcm_lo, pcm_hi) = device.db_volume_range(pcm)?;
        min_db += pcm_lo;
        max_db += pcm_hi;
    }

    if min_db >= max_db {
        return Err(MixerError::DegenerateRange);
    }

    Ok(ProbedCard {
        device,
        master,
        pcm,
        limits: VolumeRange { min_db, max_db },
    })
}

/// Run the probe under the engine lock. Returns true iff the engine reached
/// READY. A false return leaves the stored state where it was; a failed
/// probe stays INITIALIZING and the engine never retries.
pub(crate) fn run_probe(
    driver: &dyn MixerDriver,
    config: &MixerEngineConfig,
    shared: &Mutex<MixerShared>,
) -> bool {
    let mut inner = shared.lock().unwrap();
    if inner.state != MixerState::Initializing {
        warn!(
            "{}: probe requested in state {:?}, ignoring",
            "MIXER_INIT".on_blue().cyan(),
            inner.state
        );
        return false;
    }

    match probe_device(driver, config) {
        Ok(card) => {
            info!(
                "{}: card '{}' ready, {:.1} dB .. {:.1} dB (pcm trim: {})",
                "MIXER_INIT".on_blue().cyan(),
                config.card_name,
                card.limits.min_db,
                card.limits.max_db,
                card.pcm.is_some()
            );
            inner.complete_initialization(card.device, card.master, card.pcm, card.limits);
            true
        }
        Err(e) => {
            warn!(
                "{}: probe of card '{}' failed: {}",
                "MIXER_INIT".on_red().white(),
                config.card_name,
                e
            );
            false
        }
    }
}

/// Dedicated probe thread, one per engine instance.
pub(crate) struct InitWorker {
    handle: Option<JoinHandle<()>>,
}

impl InitWorker {
    /// Spawn the probe on its own thread; `on_complete` fires with the
    /// outcome once the probe finishes, or with false right away when the
    /// thread cannot be started (in which case no worker is returned).
    pub(crate) fn spawn(
        driver: Arc<dyn MixerDriver>,
        config: MixerEngineConfig,
        shared: Arc<Mutex<MixerShared>>,
        on_complete: Box<dyn FnOnce(bool) + Send>,
    ) -> Option<Self> {
        // The callback is parked where both outcomes can reach it: the
        // worker thread on success, this thread if the spawn fails.
        let callback = Arc::new(Mutex::new(Some(on_complete)));
        let worker_callback = callback.clone();

        let spawned = thread::Builder::new()
            .name("mixer-init".to_string())
            .spawn(move || {
                let ok = run_probe(driver.as_ref(), &config, &shared);
                if let Some(on_complete) = worker_callback.lock().unwrap().take() {
                    on_complete(ok);
                }
            });

        match spawned {
            Ok(handle) => Some(Self {
                handle: Some(handle),
            }),
            Err(e) => {
                warn!("Failed to start mixer init thread: {}", e);
                if let Some(on_complete) = callback.lock().unwrap().take() {
                    on_complete(false);
                }
                None
            }
        }
    }

    /// Wait for the probe to finish. Idempotent.
    pub(crate) fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for InitWorker {
    fn drop(&mut self) {
        self.join();
    }
}

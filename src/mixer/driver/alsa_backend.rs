// ALSA mixer backend (Linux)
//
// Implements the driver traits over alsa-lib's simple mixer interface.
// `Mixer::new` performs the full open/attach/register/load sequence for the
// named card; elements are resolved once by name and re-looked-up per call
// through their stored selem id.

use alsa::mixer::{Mixer, Selem, SelemChannelId, SelemId};

use super::{ElementHandle, MixerDevice, MixerDriver};
use crate::mixer::types::{MixerError, MixerResult};

/// alsa-lib reports element volumes in hundredths of a decibel.
const MILLIBELS_PER_DB: f64 = 100.0;

/// Driver backed by the system ALSA library.
#[derive(Debug, Default)]
pub struct AlsaMixerDriver;

impl MixerDriver for AlsaMixerDriver {
    fn open(&self, card_name: &str) -> MixerResult<Box<dyn MixerDevice>> {
        let mixer = Mixer::new(card_name, false).map_err(|e| {
            MixerError::DeviceOpen(format!("ALSA open of card '{}' failed: {}", card_name, e))
        })?;
        Ok(Box::new(AlsaMixerDevice {
            mixer,
            elements: Vec::new(),
        }))
    }
}

/// One open ALSA mixer session. Element handles index into `elements`.
pub struct AlsaMixerDevice {
    mixer: Mixer,
    elements: Vec<SelemId>,
}

// The card handle never crosses threads concurrently: every access is
// serialized by the engine lock.
unsafe impl Send for AlsaMixerDevice {}

impl AlsaMixerDevice {
    fn selem(&self, element: ElementHandle) -> MixerResult<Selem<'_>> {
        let id = self
            .elements
            .get(element.0 as usize)
            .ok_or(MixerError::UnknownElement)?;
        self.mixer.find_selem(id).ok_or(MixerError::UnknownElement)
    }
}

impl MixerDevice for AlsaMixerDevice {
    fn is_alive(&self) -> bool {
        self.mixer.handle_events().is_ok()
    }

    fn find_element(&mut self, name: &str) -> Option<ElementHandle> {
        let id = SelemId::new(name, 0);
        self.mixer.find_selem(&id)?;
        let handle = ElementHandle(self.elements.len() as u32);
        self.elements.push(id);
        Some(handle)
    }

    fn raw_volume_range(&self, element: ElementHandle) -> MixerResult<(i64, i64)> {
        Ok(self.selem(element)?.get_playback_volume_range())
    }

    fn db_volume_range(&self, element: ElementHandle) -> MixerResult<(f64, f64)> {
        let (lo, hi) = self.selem(element)?.get_playback_db_range();
        Ok((
            lo.0 as f64 / MILLIBELS_PER_DB,
            hi.0 as f64 / MILLIBELS_PER_DB,
        ))
    }

    fn db_volume(&self, element: ElementHandle) -> MixerResult<f64> {
        let millibels = self
            .selem(element)?
            .get_playback_vol_db(SelemChannelId::FrontLeft)
            .map_err(anyhow::Error::new)?;
        Ok(millibels.0 as f64 / MILLIBELS_PER_DB)
    }

    fn raw_volume(&self, element: ElementHandle) -> MixerResult<i64> {
        Ok(self
            .selem(element)?
            .get_playback_volume(SelemChannelId::FrontLeft)
            .map_err(anyhow::Error::new)?)
    }

    fn set_raw_volume_all(&mut self, element: ElementHandle, raw: i64) -> MixerResult<()> {
        let selem = self.selem(element)?;
        let (lo, hi) = selem.get_playback_volume_range();
        selem
            .set_playback_volume_all(raw.clamp(lo, hi))
            .map_err(anyhow::Error::new)?;
        Ok(())
    }

    fn playback_switch(&self, element: ElementHandle) -> MixerResult<bool> {
        let value = self
            .selem(element)?
            .get_playback_switch(SelemChannelId::FrontLeft)
            .map_err(anyhow::Error::new)?;
        Ok(value != 0)
    }

    fn set_playback_switch_all(&mut self, element: ElementHandle, on: bool) -> MixerResult<()> {
        self.selem(element)?
            .set_playback_switch_all(on as i32)
            .map_err(anyhow::Error::new)?;
        Ok(())
    }
}

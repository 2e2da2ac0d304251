// Dual-element volume compositing
//
// The master element usually has coarser steps than the PCM trim element.
// A split request biases the master up to the nearest step at or above the
// target, then trims the remainder on the finer PCM element, so the
// composite converges on the request without the master undershooting.

use super::driver::{ElementHandle, MixerDevice};
use super::element_volume::{self, ROUND_TO_NEAREST_BIAS, ROUND_UP_BIAS};
use crate::mixer::types::MixerResult;

/// Logical volume: master dB plus the PCM trim contribution when present.
pub fn composite_volume_db(
    device: &dyn MixerDevice,
    master: ElementHandle,
    pcm: Option<ElementHandle>,
) -> MixerResult<f64> {
    let mut volume_db = element_volume::element_volume_db(device, master)?;
    if let Some(pcm) = pcm {
        volume_db += element_volume::element_volume_db(device, pcm)?;
    }
    Ok(volume_db)
}

/// Split one logical volume request across the two physical elements.
pub fn set_composite_volume_db(
    device: &mut dyn MixerDevice,
    master: ElementHandle,
    pcm: Option<ElementHandle>,
    target_db: f64,
) -> MixerResult<()> {
    match pcm {
        None => {
            element_volume::set_element_volume_db(device, master, target_db, ROUND_TO_NEAREST_BIAS)?;
        }
        Some(pcm) => {
            let actual_master_db =
                element_volume::set_element_volume_db(device, master, target_db, ROUND_UP_BIAS)?;
            element_volume::set_element_volume_db(
                device,
                pcm,
                target_db - actual_master_db,
                ROUND_TO_NEAREST_BIAS,
            )?;
        }
    }
    Ok(())
}

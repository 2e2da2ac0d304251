// Element-level volume conversion
//
// Converts between a mixer element's raw integer step range and the decibel
// domain, and applies volume/switch changes through the driver. The rounding
// bias pre-shifts the value before truncation: 0.5 gives conventional
// round-to-nearest, a bias just under 1.0 rounds up.

use super::driver::{ElementHandle, MixerDevice};
use crate::mixer::types::{MixerError, MixerResult};

/// Conventional round-to-nearest when converting dB to a raw step.
pub const ROUND_TO_NEAREST_BIAS: f64 = 0.5;

/// Bias the raw step upward so the element never lands below the request.
pub const ROUND_UP_BIAS: f64 = 0.9999;

/// Set one element's playback volume, returning the dB value actually
/// achieved after raw-step rounding.
///
/// The request is clamped to the element's dB floor; the ceiling is enforced
/// by the driver when the raw step is applied. Elements with a zero-width
/// step or dB range are rejected before any hardware write.
pub fn set_element_volume_db(
    device: &mut dyn MixerDevice,
    element: ElementHandle,
    target_db: f64,
    rounding_bias: f64,
) -> MixerResult<f64> {
    let (step_lo, step_hi) = device.raw_volume_range(element)?;
    let total_steps = step_hi - step_lo;
    if total_steps <= 0 {
        return Err(MixerError::DegenerateRange);
    }
    let (db_lo, db_hi) = device.db_volume_range(element)?;
    let db_step = (db_hi - db_lo) / total_steps as f64;
    if db_step <= 0.0 {
        return Err(MixerError::DegenerateRange);
    }

    let target_db = target_db.max(db_lo);
    let raw = (rounding_bias + (target_db - db_lo) / db_step).floor() as i64 + step_lo;
    device.set_raw_volume_all(element, raw)?;

    // The achieved value comes from the raw step actually applied, which the
    // driver may have clamped.
    let applied = device.raw_volume(element)?;
    Ok(db_lo + (applied - step_lo) as f64 * db_step)
}

/// Element playback volume in dB, as the driver reports it.
pub fn element_volume_db(device: &dyn MixerDevice, element: ElementHandle) -> MixerResult<f64> {
    device.db_volume(element)
}

/// Toggle the element's playback switch on all channels.
pub fn set_element_muted(
    device: &mut dyn MixerDevice,
    element: ElementHandle,
    mute: bool,
) -> MixerResult<()> {
    device.set_playback_switch_all(element, !mute)
}

/// Whether the element's playback switch is currently off.
pub fn element_muted(device: &dyn MixerDevice, element: ElementHandle) -> MixerResult<bool> {
    Ok(!device.playback_switch(element)?)
}

// In-memory mixer backend
//
// A configurable sound card used by the test-suite: elements carry the same
// raw-step and decibel ranges a real simple element reports, the card can
// refuse to open, and it can be invalidated underneath a live engine.

use std::sync::{Arc, Mutex};

use super::{ElementHandle, MixerDevice, MixerDriver};
use crate::mixer::types::{MixerError, MixerResult};

/// One fake mixer control.
#[derive(Debug, Clone)]
pub struct FakeElement {
    pub name: String,
    pub raw_range: (i64, i64),
    pub db_range: (f64, f64),
    pub raw_value: i64,
    pub switch_on: bool,
}

impl FakeElement {
    pub fn new(name: &str, raw_range: (i64, i64), db_range: (f64, f64)) -> Self {
        Self {
            name: name.to_string(),
            raw_range,
            db_range,
            raw_value: raw_range.0,
            switch_on: true,
        }
    }

    /// Decibels per raw step; zero when the range is degenerate.
    pub fn db_step(&self) -> f64 {
        let steps = self.raw_range.1 - self.raw_range.0;
        if steps <= 0 {
            return 0.0;
        }
        (self.db_range.1 - self.db_range.0) / steps as f64
    }

    /// dB equivalent of the current raw value.
    pub fn db_value(&self) -> f64 {
        self.db_range.0 + (self.raw_value - self.raw_range.0) as f64 * self.db_step()
    }
}

/// Card state shared between the driver, its open devices, and the test.
#[derive(Debug)]
pub struct FakeCardState {
    pub elements: Vec<FakeElement>,
    pub alive: bool,
    pub fail_open: bool,
    pub open_count: u32,
}

/// Driver producing sessions over one shared in-memory card.
#[derive(Debug, Clone)]
pub struct FakeMixerDriver {
    state: Arc<Mutex<FakeCardState>>,
}

impl FakeMixerDriver {
    pub fn new(elements: Vec<FakeElement>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeCardState {
                elements,
                alive: true,
                fail_open: false,
                open_count: 0,
            })),
        }
    }

    /// A card that refuses to open, for initialization-failure paths.
    pub fn failing() -> Self {
        let driver = Self::new(Vec::new());
        driver.state.lock().unwrap().fail_open = true;
        driver
    }

    /// Shared card state, for inspection and fault injection from tests.
    pub fn state(&self) -> Arc<Mutex<FakeCardState>> {
        self.state.clone()
    }
}

impl MixerDriver for FakeMixerDriver {
    fn open(&self, card_name: &str) -> MixerResult<Box<dyn MixerDevice>> {
        let mut state = self.state.lock().unwrap();
        state.open_count += 1;
        if state.fail_open {
            return Err(MixerError::DeviceOpen(format!(
                "fake card '{}' refused to open",
                card_name
            )));
        }
        Ok(Box::new(FakeMixerDevice {
            state: self.state.clone(),
        }))
    }
}

/// One open session on the fake card.
pub struct FakeMixerDevice {
    state: Arc<Mutex<FakeCardState>>,
}

impl FakeMixerDevice {
    fn read<T>(&self, element: ElementHandle, read: impl FnOnce(&FakeElement) -> T) -> MixerResult<T> {
        let state = self.state.lock().unwrap();
        state
            .elements
            .get(element.0 as usize)
            .map(read)
            .ok_or(MixerError::UnknownElement)
    }

    fn write<T>(
        &mut self,
        element: ElementHandle,
        write: impl FnOnce(&mut FakeElement) -> T,
    ) -> MixerResult<T> {
        let mut state = self.state.lock().unwrap();
        state
            .elements
            .get_mut(element.0 as usize)
            .map(write)
            .ok_or(MixerError::UnknownElement)
    }
}

impl MixerDevice for FakeMixerDevice {
    fn is_alive(&self) -> bool {
        self.state.lock().unwrap().alive
    }

    fn find_element(&mut self, name: &str) -> Option<ElementHandle> {
        let state = self.state.lock().unwrap();
        state
            .elements
            .iter()
            .position(|element| element.name == name)
            .map(|index| ElementHandle(index as u32))
    }

    fn raw_volume_range(&self, element: ElementHandle) -> MixerResult<(i64, i64)> {
        self.read(element, |e| e.raw_range)
    }

    fn db_volume_range(&self, element: ElementHandle) -> MixerResult<(f64, f64)> {
        self.read(element, |e| e.db_range)
    }

    fn db_volume(&self, element: ElementHandle) -> MixerResult<f64> {
        self.read(element, |e| e.db_value())
    }

    fn raw_volume(&self, element: ElementHandle) -> MixerResult<i64> {
        self.read(element, |e| e.raw_value)
    }

    fn set_raw_volume_all(&mut self, element: ElementHandle, raw: i64) -> MixerResult<()> {
        self.write(element, |e| {
            // Clamped to the element range, as alsa-lib does.
            e.raw_value = raw.clamp(e.raw_range.0, e.raw_range.1);
        })
    }

    fn playback_switch(&self, element: ElementHandle) -> MixerResult<bool> {
        self.read(element, |e| e.switch_on)
    }

    fn set_playback_switch_all(&mut self, element: ElementHandle, on: bool) -> MixerResult<()> {
        self.write(element, |e| {
            e.switch_on = on;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_fails_when_configured() {
        let driver = FakeMixerDriver::failing();
        assert!(driver.open("default").is_err());
        assert_eq!(driver.state().lock().unwrap().open_count, 1);
    }

    #[test]
    fn raw_writes_clamp_to_element_range() {
        let driver = FakeMixerDriver::new(vec![FakeElement::new("Master", (0, 100), (-90.0, 0.0))]);
        let mut device = driver.open("default").unwrap();
        let master = device.find_element("Master").unwrap();

        device.set_raw_volume_all(master, 250).unwrap();
        assert_eq!(device.raw_volume(master).unwrap(), 100);

        device.set_raw_volume_all(master, -5).unwrap();
        assert_eq!(device.raw_volume(master).unwrap(), 0);
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let driver = FakeMixerDriver::new(vec![FakeElement::new("Master", (0, 10), (-10.0, 0.0))]);
        let device = driver.open("default").unwrap();
        assert!(matches!(
            device.raw_volume(ElementHandle(7)),
            Err(MixerError::UnknownElement)
        ));
    }
}

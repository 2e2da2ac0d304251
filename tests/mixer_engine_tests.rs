use std::sync::Arc;
use std::time::Duration;

use volume_deck_lib::{
    FakeElement, FakeMixerDriver, MixerEngine, MixerEngineConfig, MixerState, SILENCE_DB,
};

// Master: 0.9 dB per raw step, PCM trim: 0.5 dB per raw step.
fn two_element_driver() -> FakeMixerDriver {
    FakeMixerDriver::new(vec![
        FakeElement::new("Master", (0, 100), (-90.0, 0.0)),
        FakeElement::new("PCM", (0, 40), (0.0, 20.0)),
    ])
}

fn master_only_driver() -> FakeMixerDriver {
    FakeMixerDriver::new(vec![FakeElement::new("Master", (0, 100), (-90.0, 0.0))])
}

fn ready_engine(driver: FakeMixerDriver) -> MixerEngine {
    let engine = MixerEngine::new(MixerEngineConfig::default(), Arc::new(driver));
    assert!(engine.init_sync());
    engine
}

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    #[test]
    fn engine_starts_uninitialized() {
        let engine = MixerEngine::new(MixerEngineConfig::default(), Arc::new(two_element_driver()));
        assert_eq!(engine.state(), MixerState::Uninitialized);
    }

    #[test]
    fn init_sync_reaches_ready() {
        let engine = ready_engine(two_element_driver());
        assert_eq!(engine.state(), MixerState::Ready);
    }

    #[test]
    fn init_sync_fails_when_card_wont_open() {
        let engine = MixerEngine::new(
            MixerEngineConfig::default(),
            Arc::new(FakeMixerDriver::failing()),
        );
        assert!(!engine.init_sync());
        assert_ne!(engine.state(), MixerState::Ready);

        // Every subsequent operation stays a safe no-op.
        assert_eq!(engine.volume_db(), SILENCE_DB);
        engine.set_volume_db(-10.0);
        engine.set_muted(true);
        assert!(!engine.is_muted());
        assert!(engine.volume_limits().is_none());
    }

    #[test]
    fn missing_master_element_is_fatal() {
        let driver = FakeMixerDriver::new(vec![FakeElement::new("PCM", (0, 40), (0.0, 20.0))]);
        let engine = MixerEngine::new(MixerEngineConfig::default(), Arc::new(driver));
        assert!(!engine.init_sync());
        assert_ne!(engine.state(), MixerState::Ready);
    }

    #[test]
    fn missing_pcm_element_degrades_to_master_only() {
        let engine = ready_engine(master_only_driver());
        let limits = engine.volume_limits().unwrap();
        assert!((limits.min_db - -90.0).abs() < 1e-9);
        assert!(limits.max_db.abs() < 1e-9);
    }

    #[test]
    fn limits_sum_master_and_pcm_ranges() {
        let engine = ready_engine(two_element_driver());
        let limits = engine.volume_limits().unwrap();
        assert!((limits.min_db - -90.0).abs() < 1e-9);
        assert!((limits.max_db - 20.0).abs() < 1e-9);
    }

    #[test]
    fn second_init_is_rejected() {
        let engine = ready_engine(two_element_driver());
        assert!(!engine.init_sync());
        assert_eq!(engine.state(), MixerState::Ready);
    }

    #[test]
    fn async_init_reports_success() {
        let driver = two_element_driver();
        let engine = MixerEngine::new(MixerEngineConfig::default(), Arc::new(driver));

        let (tx, rx) = crossbeam::channel::bounded(1);
        assert!(engine.init(move |ok| {
            let _ = tx.send(ok);
        }));

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(true));
        assert_eq!(engine.state(), MixerState::Ready);
    }

    #[test]
    fn async_init_reports_failure() {
        let engine = MixerEngine::new(
            MixerEngineConfig::default(),
            Arc::new(FakeMixerDriver::failing()),
        );

        let (tx, rx) = crossbeam::channel::bounded(1);
        assert!(engine.init(move |ok| {
            let _ = tx.send(ok);
        }));

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(false));
        assert_ne!(engine.state(), MixerState::Ready);
    }

    #[test]
    fn async_init_on_initialized_engine_fires_callback_with_false() {
        let engine = ready_engine(two_element_driver());

        let (tx, rx) = crossbeam::channel::bounded(1);
        assert!(!engine.init(move |ok| {
            let _ = tx.send(ok);
        }));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(false));
    }

    #[test]
    fn in_error_observed_when_card_dies_under_ready_engine() {
        let driver = two_element_driver();
        let card = driver.state();
        let engine = ready_engine(driver);
        assert_eq!(engine.state(), MixerState::Ready);

        card.lock().unwrap().alive = false;
        assert_eq!(engine.state(), MixerState::InError);
    }

    #[test]
    fn custom_element_names_are_honored() {
        let driver = FakeMixerDriver::new(vec![
            FakeElement::new("Speaker", (0, 64), (-64.0, 0.0)),
            FakeElement::new("Digital", (0, 120), (-30.0, 30.0)),
        ]);
        let config = MixerEngineConfig {
            card_name: "hw:1".to_string(),
            master_element: "Speaker".to_string(),
            pcm_element: "Digital".to_string(),
        };
        let engine = MixerEngine::new(config, Arc::new(driver));
        assert!(engine.init_sync());
        let limits = engine.volume_limits().unwrap();
        assert!((limits.min_db - -94.0).abs() < 1e-9);
        assert!((limits.max_db - 30.0).abs() < 1e-9);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let engine = ready_engine(two_element_driver());
        engine.shutdown();
        assert_eq!(engine.state(), MixerState::ShuttingDown);
        assert_eq!(engine.volume_db(), SILENCE_DB);
        assert!(engine.volume_limits().is_none());

        engine.shutdown();
        assert_eq!(engine.state(), MixerState::ShuttingDown);
    }

    #[test]
    fn shutdown_joins_an_in_flight_probe() {
        let driver = two_element_driver();
        let engine = MixerEngine::new(MixerEngineConfig::default(), Arc::new(driver));
        assert!(engine.init(|_| {}));
        // Shutdown must wait for the probe before closing, whatever the
        // probe ends up deciding.
        engine.shutdown();
        assert_ne!(engine.state(), MixerState::Ready);
    }
}

#[cfg(test)]
mod volume_tests {
    use super::*;

    #[test]
    fn composite_split_matches_hardware_step_math() {
        let driver = two_element_driver();
        let card = driver.state();
        let engine = ready_engine(driver);

        engine.set_volume_db(-3.3);

        // Master rounds up to -2.7 dB (raw 97); the -0.6 dB remainder is
        // below the PCM floor, so the trim clamps to 0.0 dB (raw 0).
        {
            let card = card.lock().unwrap();
            assert_eq!(card.elements[0].raw_value, 97);
            assert_eq!(card.elements[1].raw_value, 0);
        }
        assert!((engine.volume_db() - -2.7).abs() < 1e-9);
    }

    #[test]
    fn master_only_set_rounds_to_nearest() {
        let engine = ready_engine(master_only_driver());
        engine.set_volume_db(-10.0);
        assert!((engine.volume_db() - -9.9).abs() < 1e-9);
    }

    #[test]
    fn request_below_floor_pins_to_floor() {
        let engine = ready_engine(two_element_driver());
        engine.set_volume_db(-500.0);
        assert!((engine.volume_db() - -90.0).abs() < 1e-9);
    }

    #[test]
    fn request_above_ceiling_pins_to_ceiling() {
        let engine = ready_engine(two_element_driver());
        engine.set_volume_db(75.0);
        assert!((engine.volume_db() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn volume_read_without_init_returns_silence_floor() {
        let engine = MixerEngine::new(MixerEngineConfig::default(), Arc::new(two_element_driver()));
        assert_eq!(engine.volume_db(), SILENCE_DB);
    }
}

#[cfg(test)]
mod mute_tests {
    use super::*;

    #[test]
    fn mute_saves_volume_and_drives_to_floor() {
        let driver = two_element_driver();
        let card = driver.state();
        let engine = ready_engine(driver);

        engine.set_volume_db(-10.0);
        let premute_db = engine.volume_db();

        engine.set_muted(true);
        assert!(engine.is_muted());
        assert!((engine.volume_db() - -90.0).abs() < 1e-9);
        {
            let card = card.lock().unwrap();
            assert!(!card.elements[0].switch_on);
            assert!(!card.elements[1].switch_on);
        }

        engine.set_muted(false);
        assert!(!engine.is_muted());
        // Restored composite within one PCM step of the pre-mute value;
        // with this card the restore is exact.
        assert!((engine.volume_db() - premute_db).abs() < 1e-6);
        assert!((engine.volume_db() - -10.0).abs() <= 0.5);
        {
            let card = card.lock().unwrap();
            assert!(card.elements[0].switch_on);
            assert!(card.elements[1].switch_on);
        }
    }

    #[test]
    fn mute_works_without_pcm_trim() {
        let engine = ready_engine(master_only_driver());
        engine.set_volume_db(-27.0);
        let premute_db = engine.volume_db();

        engine.set_muted(true);
        assert!((engine.volume_db() - -90.0).abs() < 1e-9);

        engine.set_muted(false);
        assert!((engine.volume_db() - premute_db).abs() < 1e-6);
    }

    #[test]
    fn mute_state_reads_false_before_ready() {
        let engine = MixerEngine::new(MixerEngineConfig::default(), Arc::new(two_element_driver()));
        assert!(!engine.is_muted());
    }
}

#[cfg(test)]
mod status_tests {
    use super::*;

    #[test]
    fn status_snapshot_serializes_for_monitoring() {
        let engine = ready_engine(two_element_driver());
        engine.set_volume_db(-3.3);

        let status = serde_json::to_value(engine.status()).unwrap();
        assert_eq!(status["state"], "Ready");
        assert_eq!(status["muted"], false);
        assert!((status["volume_db"].as_f64().unwrap() - -2.7).abs() < 1e-9);
        assert!((status["limits"]["min_db"].as_f64().unwrap() - -90.0).abs() < 1e-9);
    }

    #[test]
    fn status_before_init_reports_uninitialized() {
        let engine = MixerEngine::new(MixerEngineConfig::default(), Arc::new(two_element_driver()));
        let status = engine.status();
        assert_eq!(status.state, MixerState::Uninitialized);
        assert_eq!(status.volume_db, SILENCE_DB);
        assert!(status.limits.is_none());
    }
}

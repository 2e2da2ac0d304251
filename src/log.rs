use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag to control mixer debug logging
pub static MIXER_DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Set mixer debug logging on/off
pub fn set_mixer_debug(enabled: bool) {
    MIXER_DEBUG_ENABLED.store(enabled, Ordering::Relaxed);
    println!("🔧 Mixer debug logging {}", if enabled { "ENABLED" } else { "DISABLED" });
}

/// Check if mixer debug logging is enabled
pub fn is_mixer_debug_enabled() -> bool {
    MIXER_DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Install the tracing subscriber, honoring RUST_LOG. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Mixer debug macro - only prints if mixer debug is enabled
#[macro_export]
macro_rules! mixer_debug {
    ($($arg:tt)*) => {
        if $crate::log::MIXER_DEBUG_ENABLED.load(std::sync::atomic::Ordering::Relaxed) {
            println!($($arg)*);
        }
    };
}

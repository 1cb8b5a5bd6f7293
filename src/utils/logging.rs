//! Conditional, prefixed logging macros that check a module-level `ENABLE_LOGS` flag.
//!
//! Every line is tagged with [`LOG_PREFIX`] so extension output can be filtered
//! out of the host page's console noise.
//!
//! Usage:
//! ```ignore
//! // In your module, define the flag first:
//! const ENABLE_LOGS: bool = true;
//!
//! // Then use the macros (they're exported at the crate root):
//! use crate::{log_debug, log_info, log_warn};
//!
//! log_info!("This will log if ENABLE_LOGS is true");
//! ```

/// Tag prepended to every diagnostic line.
pub const LOG_PREFIX: &str = "[TikTok-Skipper]";

/// Install the platform logger.
///
/// Natively this is `env_logger` (reads `RUST_LOG`, defaults to info). Safe to
/// call more than once; later calls are ignored.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Install the platform logger.
///
/// On the web, records go to the browser console and panics are reported
/// with a readable stack instead of `unreachable`.
#[cfg(target_arch = "wasm32")]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

/// Macro for conditional info logging.
/// Checks the `ENABLE_LOGS` const in the calling module.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!("{} {}", $crate::utils::logging::LOG_PREFIX, format_args!($($arg)*));
        }
    };
}

/// Macro for conditional warn logging.
/// Checks the `ENABLE_LOGS` const in the calling module.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!("{} {}", $crate::utils::logging::LOG_PREFIX, format_args!($($arg)*));
        }
    };
}

/// Macro for conditional debug logging.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!("{} {}", $crate::utils::logging::LOG_PREFIX, format_args!($($arg)*));
        }
    };
}

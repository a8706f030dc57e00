//! Optional process-wide configuration.
//!
//! A program installs one [`Config`] at startup (usually through
//! [`LoadOptions::init_global`](crate::LoadOptions::init_global)) and reads
//! it from anywhere afterwards. The installed store is immutable.

use crate::config::Config;
use once_cell::sync::{Lazy, OnceCell};

static GLOBAL: OnceCell<Config> = OnceCell::new();

static EMPTY: Lazy<Config> = Lazy::new(Config::new);

/// Install `config` as the process-wide configuration.
///
/// Only the first call succeeds; later calls hand their config back.
pub fn install(config: Config) -> Result<(), Config> {
    GLOBAL.set(config)
}

/// The process-wide configuration, or an empty one if none was installed.
///
/// Accessors on the empty store return their defaults.
pub fn config() -> &'static Config {
    GLOBAL.get().unwrap_or(&EMPTY)
}

/// Whether a configuration has been installed.
pub fn is_installed() -> bool {
    GLOBAL.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the global is shared by every test in this binary.
    #[test]
    fn test_install_once() {
        assert!(!is_installed());
        assert!(config().is_empty());
        assert_eq!(config().as_int("app.port", 80), 80);

        let mut first = Config::new();
        first.load_args(&["-app.port=8080"]);
        assert!(install(first).is_ok());

        let mut second = Config::new();
        second.load_args(&["-app.port=9090"]);
        let rejected = install(second).unwrap_err();
        assert_eq!(rejected.as_int("app.port", 0), 9090);

        assert!(is_installed());
        assert_eq!(config().as_int("app.port", 0), 8080);
    }
}

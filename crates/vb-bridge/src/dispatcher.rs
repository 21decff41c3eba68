//! Configuration dispatcher
//!
//! Validates option changes against the engine and routes failures into the
//! error channel. Reads never fail.

use crate::capture::ErrorChannel;
use std::sync::Arc;
use tracing::debug;
use vb_core::{ConfigOption, Opt, OptionError, Result};
use vb_engine::Engine;

pub struct ConfigDispatcher {
    engine: Arc<dyn Engine>,
    errors: Arc<ErrorChannel>,
}

impl ConfigDispatcher {
    pub fn new(engine: Arc<dyn Engine>, errors: Arc<ErrorChannel>) -> Self {
        Self { engine, errors }
    }

    /// Apply `options` in order, stopping at the first rejection
    pub fn bootstrap(&self, options: &[ConfigOption]) -> Result<()> {
        debug!("Applying {} bootstrap options", options.len());
        for option in options {
            self.apply(option)?;
        }
        Ok(())
    }

    pub fn apply(&self, option: &ConfigOption) -> Result<()> {
        match option.index {
            Some(index) => self.set_indexed(option.key, index, option.value),
            None => self.set(option.key, option.value),
        }
    }

    fn resolve(&self, operation: &str, key: i64) -> Result<Opt> {
        self.errors.capture(
            operation,
            Opt::from_raw(key).ok_or_else(|| OptionError::Unknown(key).into()),
        )
    }

    // Raw host surface

    pub fn set_option(&self, key: i64, value: i64) -> Result<()> {
        let option = self.resolve("configure", key)?;
        self.set(option, value)
    }

    pub fn set_indexed_option(&self, key: i64, index: i64, value: i64) -> Result<()> {
        let option = self.resolve("configure", key)?;
        self.set_indexed(option, index, value)
    }

    pub fn get_option(&self, key: i64) -> i64 {
        Opt::from_raw(key).map_or(0, |option| self.get(option))
    }

    pub fn get_indexed_option(&self, key: i64, index: i64) -> i64 {
        Opt::from_raw(key).map_or(0, |option| self.get_indexed(option, index))
    }

    // Typed surface

    pub fn set(&self, option: Opt, value: i64) -> Result<()> {
        self.errors
            .capture("configure", self.engine.configure(option, value))
    }

    pub fn set_indexed(&self, option: Opt, index: i64, value: i64) -> Result<()> {
        self.errors.capture(
            "configure",
            self.engine.configure_indexed(option, index, value),
        )
    }

    pub fn get(&self, option: Opt) -> i64 {
        self.engine.config_item(option)
    }

    pub fn get_indexed(&self, option: Opt, index: i64) -> i64 {
        self.engine.config_item_indexed(option, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vb_core::{BridgeError, ErrorCode};
    use vb_engine::HeadlessAmiga;

    fn setup() -> (ConfigDispatcher, Arc<ErrorChannel>) {
        let errors = Arc::new(ErrorChannel::new());
        let engine: Arc<dyn Engine> = Arc::new(HeadlessAmiga::new());
        (ConfigDispatcher::new(engine, Arc::clone(&errors)), errors)
    }

    #[test]
    fn test_set_then_get() {
        let (dispatcher, errors) = setup();
        dispatcher.set_option(Opt::ChipRam.raw(), 512).unwrap();
        assert_eq!(dispatcher.get_option(Opt::ChipRam.raw()), 512);

        dispatcher.set_indexed(Opt::Audpan, 2, 100).unwrap();
        assert_eq!(dispatcher.get_indexed(Opt::Audpan, 2), 100);
        assert_eq!(dispatcher.get_indexed(Opt::Audpan, 1), 0);
        assert_eq!(errors.error_code(), ErrorCode::Ok);
    }

    #[test]
    fn test_unknown_key() {
        let (dispatcher, errors) = setup();
        let err = dispatcher.set_option(99_999, 1).unwrap_err();
        assert!(matches!(err, BridgeError::Option(OptionError::Unknown(99_999))));
        assert_eq!(errors.error_code(), ErrorCode::OptUnsupported);

        assert_eq!(dispatcher.get_option(99_999), 0);
        assert_eq!(dispatcher.get_indexed_option(99_999, 0), 0);
    }

    #[test]
    fn test_invalid_index_keeps_value() {
        let (dispatcher, errors) = setup();
        dispatcher.set_indexed(Opt::Audvol, 3, 40).unwrap();

        for index in [-1, 4, 100] {
            assert!(dispatcher.set_indexed(Opt::Audvol, index, 10).is_err());
            assert_eq!(errors.error_code(), ErrorCode::OptInvId);
        }
        assert_eq!(dispatcher.get_indexed(Opt::Audvol, 3), 40);
        assert_eq!(dispatcher.get_indexed(Opt::Audvol, 4), 0);
    }

    #[test]
    fn test_bootstrap_stops_at_first_failure() {
        let (dispatcher, errors) = setup();
        let options = [
            ConfigOption::scalar(Opt::SlowRam, 256),
            ConfigOption::scalar(Opt::ChipRam, 333),
            ConfigOption::scalar(Opt::FastRam, 1024),
        ];
        assert!(dispatcher.bootstrap(&options).is_err());
        assert_eq!(errors.error_code(), ErrorCode::OptInvArg);
        assert_eq!(dispatcher.get(Opt::SlowRam), 256);
        assert_eq!(dispatcher.get(Opt::FastRam), 0);
    }
}

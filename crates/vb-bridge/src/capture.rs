//! Error capture channel

use parking_lot::Mutex;
use tracing::warn;
use vb_core::{BridgeError, ErrorCode, Result};

/// The most recent failure seen by a bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&BridgeError> for ErrorRecord {
    fn from(err: &BridgeError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Single-slot store for the last captured failure
///
/// A new failure overwrites the previous one. Successful calls leave the
/// slot untouched.
#[derive(Debug, Default)]
pub struct ErrorChannel {
    last: Mutex<Option<ErrorRecord>>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `result`'s error, if any, then hand the result back
    pub fn capture<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.record(operation, err);
        }
        result
    }

    /// Run `f` and capture its failure
    pub fn guard<T, F>(&self, operation: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.capture(operation, f())
    }

    pub fn record(&self, operation: &str, err: &BridgeError) {
        let record = ErrorRecord::from(err);
        warn!("{} failed: {} ({})", operation, record.message, record.code);
        *self.last.lock() = Some(record);
    }

    pub fn last_error(&self) -> Option<ErrorRecord> {
        self.last.lock().clone()
    }

    /// Code of the last failure, `ErrorCode::Ok` if there was none
    pub fn error_code(&self) -> ErrorCode {
        self.last
            .lock()
            .as_ref()
            .map_or(ErrorCode::Ok, |record| record.code)
    }

    /// Message of the last failure, empty if there was none
    pub fn what(&self) -> String {
        self.last
            .lock()
            .as_ref()
            .map(|record| record.message.clone())
            .unwrap_or_default()
    }
}

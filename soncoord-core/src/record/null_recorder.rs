//! A recorder that discards records.
use super::{Record, Recorder};

/// A recorder that ignores any record. Useful for tests.
pub struct NullRecorder {}

impl Recorder for NullRecorder {
    fn write(&mut self, _record: Record) {}

    fn store(&mut self, _record: Record) {}

    fn flush(&mut self, _step: i64) {}
}

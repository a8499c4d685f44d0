//! Recorder.
use super::Record;

/// Writes records to an output destination.
pub trait Recorder {
    /// Writes a record immediately.
    fn write(&mut self, record: Record);

    /// Stores a record for later aggregation.
    fn store(&mut self, record: Record);

    /// Writes values aggregated from the stored records.
    ///
    /// `step` is an opaque counter, typically the optimization or episode
    /// count.
    fn flush(&mut self, step: i64);
}

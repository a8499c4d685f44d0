//! A recorder that keeps records in memory.
use super::{Record, Recorder};

/// A recorder that keeps all records in memory.
///
/// Used to inspect training traces after the fact, e.g. in tests.
#[derive(Default)]
pub struct BufferedRecorder(Vec<Record>);

impl BufferedRecorder {
    /// Constructs the recorder.
    pub fn new() -> Self {
        Self(Vec::default())
    }

    /// Returns an iterator over the stored records.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.0.iter()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, record: Record) {
        self.0.push(record);
    }

    fn store(&mut self, record: Record) {
        self.0.push(record);
    }

    fn flush(&mut self, _step: i64) {}
}

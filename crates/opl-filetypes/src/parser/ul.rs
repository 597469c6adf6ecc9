use crate::{BinReader, ULRecord, UL_RECORD_SIZE};

/// Splits the contents of `ul.cfg` into records. A trailing partial record
/// is ignored, the same way the loader only ever reads `len / 64` entries.
pub struct ULParser {
    bytes: Vec<u8>,
}

impl ULParser {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn record_count(&self) -> usize {
        self.bytes.len() / UL_RECORD_SIZE
    }

    pub fn parse(&self) -> std::io::Result<Vec<ULRecord>> {
        self.bytes
            .chunks_exact(UL_RECORD_SIZE)
            .map(ULRecord::read)
            .collect()
    }
}

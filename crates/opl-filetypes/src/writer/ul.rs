use crate::{BinWriter, ULRecord};

pub struct ULWriter {
    records: Vec<ULRecord>,
}

impl ULWriter {
    pub fn new(records: Vec<ULRecord>) -> Self {
        Self { records }
    }

    pub fn to_bytes(&self) -> std::io::Result<Vec<u8>> {
        let mut data = vec![];

        for record in &self.records {
            data.extend(record.write()?);
        }

        Ok(data)
    }
}

use crate::{BinReader, BinWriter};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Cursor, ErrorKind, Read, Write};

/// Size of the common settings block embedded in every cdvdman module.
pub const CDVDMAN_SETTINGS_SIZE: usize = 16;
pub const DISC_ID_LEN: usize = 5;

pub const IOPCORE_COMPAT_ALT_READ: u16 = 0x0001;
pub const IOPCORE_COMPAT_0_PSS: u16 = 0x0002;
pub const IOPCORE_COMPAT_DISABLE_DVDDL: u16 = 0x0004;
pub const IOPCORE_ENABLE_POFF: u16 = 0x0008;

/// Boot parameters read by cdvdman once the loader hands over.
///
/// The module ships with the block filled in with [`CdvdmanSettings::SAMPLE`],
/// which doubles as the marker used to find it in the loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdvdmanSettings {
    pub num_parts: u8,
    pub media: u8,
    pub flags: u16,
    pub cb_timer: u32,
    pub disc_id: [u8; DISC_ID_LEN],
}

impl CdvdmanSettings {
    pub const SAMPLE: CdvdmanSettings = CdvdmanSettings {
        num_parts: 0x69,
        media: 0x69,
        flags: 0x1234,
        cb_timer: 0x3939_3939,
        disc_id: *b"B00BS",
    };
}

impl BinReader<CdvdmanSettings> for CdvdmanSettings {
    fn read(data: &[u8]) -> std::io::Result<CdvdmanSettings> {
        if data.len() < CDVDMAN_SETTINGS_SIZE {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "cdvdman settings block is truncated",
            ));
        }

        let mut c = Cursor::new(data);
        let num_parts = c.read_u8()?;
        let media = c.read_u8()?;
        let flags = c.read_u16::<LE>()?;
        let cb_timer = c.read_u32::<LE>()?;
        let mut disc_id = [0u8; DISC_ID_LEN];
        c.read_exact(&mut disc_id)?;

        Ok(CdvdmanSettings {
            num_parts,
            media,
            flags,
            cb_timer,
            disc_id,
        })
    }
}

impl BinWriter for CdvdmanSettings {
    fn write(&self) -> std::io::Result<Vec<u8>> {
        let mut data = Vec::with_capacity(CDVDMAN_SETTINGS_SIZE);
        data.write_u8(self.num_parts)?;
        data.write_u8(self.media)?;
        data.write_u16::<LE>(self.flags)?;
        data.write_u32::<LE>(self.cb_timer)?;
        data.write_all(&self.disc_id)?;
        data.resize(CDVDMAN_SETTINGS_SIZE, 0); // Padding

        Ok(data)
    }
}

use crate::util::{fixed_field, parse_cstring};
use crate::{BinReader, BinWriter};
use byteorder::{ReadBytesExt, WriteBytesExt};
use serde::{Serialize, Serializer};
use std::io::{Cursor, ErrorKind, Read, Seek, Write};

pub const UL_RECORD_SIZE: usize = 0x40;

pub const UL_GAME_NAME_MAX: usize = 32;
/// Startup id field width: 11 significant characters and a terminator.
pub const GAME_STARTUP_MAX: usize = 12;

pub const UL_MAGIC: &[u8; 3] = b"ul.";
pub const UL_STARTUP_OFFSET: usize = UL_GAME_NAME_MAX + UL_MAGIC.len();
pub const UL_PARTS_OFFSET: usize = 47;
pub const UL_MEDIA_OFFSET: usize = 48;
/// Byte 53 is always 0x08 in files written by USBUtil.
pub const UL_COMPAT_OFFSET: usize = 53;
pub const UL_COMPAT_BYTE: u8 = 0x08;

pub const MEDIA_CD: u8 = 0x12;
pub const MEDIA_DVD: u8 = 0x14;

const _: () = assert!(UL_STARTUP_OFFSET + GAME_STARTUP_MAX == UL_PARTS_OFFSET);
const _: () = assert!(UL_PARTS_OFFSET + 1 == UL_MEDIA_OFFSET);
const _: () = assert!(UL_COMPAT_OFFSET < UL_RECORD_SIZE);

/// Media byte of a game. Bytes other than the two markers come from third
/// party tools; they are kept as-is and boot as DVD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Cd,
    Dvd,
    Other(u8),
}

impl MediaType {
    pub fn is_cd(self) -> bool {
        self == MediaType::Cd
    }

    /// Directory holding the ISO images of this media type, also the tag
    /// shown for it.
    pub fn dir_name(self) -> &'static str {
        if self.is_cd() {
            "CD"
        } else {
            "DVD"
        }
    }
}

impl From<u8> for MediaType {
    fn from(value: u8) -> Self {
        match value {
            MEDIA_CD => MediaType::Cd,
            MEDIA_DVD => MediaType::Dvd,
            other => MediaType::Other(other),
        }
    }
}

impl From<MediaType> for u8 {
    fn from(value: MediaType) -> Self {
        match value {
            MediaType::Cd => MEDIA_CD,
            MediaType::Dvd => MEDIA_DVD,
            MediaType::Other(other) => other,
        }
    }
}

impl Serialize for MediaType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.dir_name())
    }
}

/// One game of `ul.cfg`. Text fields are the raw field bytes up to the
/// first NUL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ULRecord {
    pub name: Vec<u8>,
    pub startup: Vec<u8>,
    pub parts: u8,
    pub media: MediaType,
}

impl BinReader<ULRecord> for ULRecord {
    fn read(data: &[u8]) -> std::io::Result<ULRecord> {
        if data.len() < UL_RECORD_SIZE {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("ul.cfg record needs {UL_RECORD_SIZE} bytes, got {}", data.len()),
            ));
        }

        let mut c = Cursor::new(data);
        let mut name = [0u8; UL_GAME_NAME_MAX];
        c.read_exact(&mut name)?;
        c.seek_relative(UL_MAGIC.len() as i64)?;
        let mut startup = [0u8; GAME_STARTUP_MAX];
        c.read_exact(&mut startup)?;
        let parts = c.read_u8()?;
        let media = c.read_u8()?;

        Ok(ULRecord {
            name: parse_cstring(&name),
            startup: parse_cstring(&startup),
            parts,
            media: media.into(),
        })
    }
}

impl BinWriter for ULRecord {
    fn write(&self) -> std::io::Result<Vec<u8>> {
        let mut data = Vec::with_capacity(UL_RECORD_SIZE);
        data.write_all(&fixed_field(&self.name, UL_GAME_NAME_MAX))?;
        data.write_all(UL_MAGIC)?;
        data.write_all(&fixed_field(&self.startup, GAME_STARTUP_MAX))?;
        data.write_u8(self.parts)?;
        data.write_u8(self.media.into())?;
        data.resize(UL_COMPAT_OFFSET, 0);
        data.write_u8(UL_COMPAT_BYTE)?;
        data.resize(UL_RECORD_SIZE, 0);

        debug_assert_eq!(data.len(), UL_RECORD_SIZE);
        Ok(data)
    }
}

use crate::DISC_ID_LEN;
use indexmap::IndexMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CONFIG_ITEM_NAME: &str = "#Name";
pub const CONFIG_ITEM_SIZE: &str = "#Size";
pub const CONFIG_ITEM_FORMAT: &str = "#Format";
pub const CONFIG_ITEM_MEDIA: &str = "#Media";
pub const CONFIG_ITEM_STARTUP: &str = "#Startup";

pub const CONFIG_ITEM_COMPAT: &str = "$Compatibility";
pub const CONFIG_ITEM_CDVDMAN_TIMER: &str = "$CDVDMAN_Timer";
pub const CONFIG_ITEM_DNAS: &str = "$DNAS";

pub const CONFIG_ITEM_ENABLEGSM: &str = "$EnableGSM";
pub const CONFIG_ITEM_GSMVMODE: &str = "$GSMVMode";
pub const CONFIG_ITEM_GSMXOFFSET: &str = "$GSMXOffset";
pub const CONFIG_ITEM_GSMYOFFSET: &str = "$GSMYOffset";
pub const CONFIG_ITEM_GSMSKIPVIDEOS: &str = "$GSMSkipVideos";

/// Per-game `key=value` settings file as kept under `CFG/` on the device.
#[derive(Debug, Clone, Default)]
pub struct ConfigSet {
    pub index_map: IndexMap<String, String>,
    path: Option<PathBuf>,
}

impl ConfigSet {
    pub fn new(contents: &str) -> Self {
        let mut index_map: IndexMap<String, String> = IndexMap::new();

        for line in contents.lines() {
            let line = line.trim_end_matches('\r');
            // lines without a separator carry nothing we could store
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if !key.is_empty() {
                    index_map.insert(key.to_string(), value.to_string());
                }
            }
        }

        Self {
            index_map,
            path: None,
        }
    }

    /// Reads `path`, or starts an empty set bound to it when the file does
    /// not exist yet.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let mut config = match std::fs::read(path) {
            Ok(bytes) => Self::new(&String::from_utf8_lossy(&bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => return Err(err),
        };
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn write(&self) -> std::io::Result<()> {
        let path = self.path.as_deref().ok_or_else(|| {
            std::io::Error::new(ErrorKind::InvalidInput, "config set has no backing file")
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_bytes())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut contents: String = "".to_string();
        for (key, value) in self.index_map.iter() {
            contents.push_str(&format!("{key}={value}\n"));
        }
        contents.into_bytes()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.index_map.get(key).map(String::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.get_str(key)?.trim().parse().ok()
    }

    /// Unsigned reading of a value. Bit masks may be stored either as an
    /// unsigned number or as the signed value with the same bits.
    pub fn get_uint(&self, key: &str) -> Option<u32> {
        let value = self.get_str(key)?.trim();
        value
            .parse::<u32>()
            .ok()
            .or_else(|| value.parse::<i32>().ok().map(|v| v as u32))
    }

    pub fn set_str(&mut self, key: &str, value: &str) {
        self.index_map.insert(key.to_string(), value.to_string());
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.set_str(key, &value.to_string());
    }

    /// Binary disc id from the `$DNAS` hex string. Non-hex characters are
    /// skipped and at most ten digits are consumed; missing digits stay zero.
    pub fn disc_id_binary(&self) -> Option<[u8; DISC_ID_LEN]> {
        let value = self.get_str(CONFIG_ITEM_DNAS)?;
        let mut disc_id = [0u8; DISC_ID_LEN];

        let digits = value.chars().filter_map(|c| c.to_digit(16));
        for (nibble, digit) in digits.take(DISC_ID_LEN * 2).enumerate() {
            let byte = &mut disc_id[nibble / 2];
            *byte = (*byte << 4) | digit as u8;
        }

        Some(disc_id)
    }
}

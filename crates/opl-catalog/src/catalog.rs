use crate::{scan_for_iso, Error, ISO_GAME_NAME_MAX};
use colored::Colorize;
use opl_filetypes::crc::usba_crc32;
use opl_filetypes::util::truncate_to_bytes;
use opl_filetypes::{MediaType, ULParser, ULRecord, ULWriter, UL_GAME_NAME_MAX};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const UL_CFG_NAME: &str = "ul.cfg";

/// One game on the device, either an ISO image under `CD/`/`DVD/` or a
/// split game listed in `ul.cfg`.
///
/// `name` and `startup` are the bytes found on disk. They are hashed and
/// written back untouched and only decoded for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleEntry {
    #[serde(serialize_with = "serialize_lossy")]
    pub name: Vec<u8>,
    #[serde(serialize_with = "serialize_lossy")]
    pub startup: Vec<u8>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub extension: String,
    pub parts: u8,
    pub media: MediaType,
    pub is_iso: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_mb: Option<u32>,
}

fn serialize_lossy<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

/// File name from raw bytes. Only unix can represent every byte sequence.
#[cfg(unix)]
fn os_name(bytes: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn os_name(bytes: Vec<u8>) -> OsString {
    String::from_utf8_lossy(&bytes).into_owned().into()
}

impl TitleEntry {
    pub fn format(&self) -> &'static str {
        if self.is_iso {
            "ISO"
        } else {
            "UL"
        }
    }

    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn startup_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.startup)
    }

    pub fn iso_path(&self, root: &Path) -> PathBuf {
        self.iso_path_named(root, &self.name)
    }

    fn iso_path_named(&self, root: &Path, name: &[u8]) -> PathBuf {
        let mut file_name = self.startup.clone();
        file_name.push(b'.');
        file_name.extend_from_slice(name);
        file_name.extend_from_slice(self.extension.as_bytes());
        root.join(self.media.dir_name()).join(os_name(file_name))
    }

    /// `ul.<CRC>.<startup>.<part>` file holding one chunk of a `ul.cfg` game.
    pub fn ul_part_path(&self, root: &Path, crc: u32, part: u8) -> PathBuf {
        let mut file_name = format!("ul.{crc:08X}.").into_bytes();
        file_name.extend_from_slice(&self.startup);
        file_name.extend_from_slice(format!(".{part:02x}").as_bytes());
        root.join(os_name(file_name))
    }

    /// Paths of every part file, named after the current game name.
    pub fn ul_part_paths(&self, root: &Path) -> Vec<PathBuf> {
        let crc = usba_crc32(&self.name);
        (0..self.parts.max(1))
            .map(|part| self.ul_part_path(root, crc, part))
            .collect()
    }

    fn to_ul_record(&self) -> ULRecord {
        ULRecord {
            name: self.name.clone(),
            startup: self.startup.clone(),
            parts: self.parts,
            media: self.media,
        }
    }
}

impl From<ULRecord> for TitleEntry {
    fn from(record: ULRecord) -> Self {
        Self {
            name: record.name,
            startup: record.startup,
            extension: String::new(),
            parts: record.parts,
            media: record.media,
            is_iso: false,
            size_mb: None,
        }
    }
}

#[derive(Serialize)]
struct CatalogFile<'a> {
    root: String,
    games: &'a [TitleEntry],
}

/// Game list of one device root. Indices are only meaningful until the next
/// [`Catalog::reload`].
#[derive(Debug)]
pub struct Catalog {
    root: PathBuf,
    entries: Vec<TitleEntry>,
    ul_cfg_size: Option<u64>,
}

impl Catalog {
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let mut catalog = Self {
            root: root.into(),
            entries: vec![],
            ul_cfg_size: None,
        };
        catalog.reload()?;
        Ok(catalog)
    }

    /// Rebuilds the list from disk: `ul.cfg` games first in file order, then
    /// the images of `CD/` and `DVD/`. Returns the number of games.
    pub fn reload(&mut self) -> Result<usize, Error> {
        self.entries = vec![];
        self.ul_cfg_size = None;

        let mut images = vec![];
        for media in [MediaType::Cd, MediaType::Dvd] {
            let dir = self.root.join(media.dir_name());
            match scan_for_iso(&dir, media, &mut images) {
                Ok(_) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => eprintln!(
                    "{} {} {}",
                    dir.display().to_string().dimmed(),
                    "could not be scanned, skipping:".dimmed(),
                    err.to_string().dimmed()
                ),
            }
        }

        let records = match std::fs::read(self.ul_cfg_path()) {
            Ok(bytes) => {
                self.ul_cfg_size = Some(bytes.len() as u64);
                ULParser::new(bytes).parse()?
            }
            Err(err) if err.kind() == ErrorKind::NotFound => vec![],
            Err(err) => return Err(err.into()),
        };

        let mut entries = Vec::with_capacity(records.len() + images.len());
        entries.extend(records.into_iter().map(TitleEntry::from));
        entries.extend(images.into_iter().rev());
        self.entries = entries;

        Ok(self.entries.len())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[TitleEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TitleEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ul_cfg_path(&self) -> PathBuf {
        self.root.join(UL_CFG_NAME)
    }

    /// Size of `ul.cfg` when the list was built, `None` if it was absent.
    pub fn ul_cfg_size(&self) -> Option<u64> {
        self.ul_cfg_size
    }

    /// Whether `ul.cfg` changed size behind our back since the last load.
    pub fn is_stale(&self) -> bool {
        !is_same_size(&self.root, self.ul_cfg_size)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&CatalogFile {
            root: self.root.display().to_string(),
            games: &self.entries,
        })
    }

    /// Rewrites `ul.cfg` from every non-ISO game in the list.
    pub fn rebuild_ul_cfg(&mut self) -> Result<(), Error> {
        self.write_ul_cfg(None)
    }

    fn write_ul_cfg(&mut self, exclude: Option<usize>) -> Result<(), Error> {
        let records = self
            .entries
            .iter()
            .enumerate()
            .filter(|(index, game)| !game.is_iso && Some(*index) != exclude)
            .map(|(_, game)| game.to_ul_record())
            .collect::<Vec<_>>();

        // truncates first, an interrupted write loses the old list
        let bytes = ULWriter::new(records).to_bytes()?;
        std::fs::write(self.ul_cfg_path(), &bytes)?;
        self.ul_cfg_size = Some(bytes.len() as u64);
        Ok(())
    }

    /// Removes the game's files from the device and drops it from the list.
    ///
    /// Split games are removed part by part. A part that cannot be removed
    /// does not stop the others, and `ul.cfg` is rewritten without the game
    /// either way; the first failure is returned afterwards.
    pub fn delete(&mut self, index: usize) -> Result<TitleEntry, Error> {
        let game = self.entries.get(index).ok_or(Error::InvalidIndex(index))?;

        if game.is_iso {
            remove_file(&game.iso_path(&self.root))?;
            return Ok(self.entries.remove(index));
        }

        let mut failed = None;
        for path in game.ul_part_paths(&self.root) {
            if let Err(err) = remove_file(&path) {
                failed.get_or_insert(err);
            }
        }
        let written = self.write_ul_cfg(Some(index));
        let game = self.entries.remove(index);

        match failed {
            Some(err) => Err(err),
            None => written.map(|()| game),
        }
    }

    /// Renames the game on the device. `ul.cfg` names are cut to 32 bytes.
    ///
    /// Split games keep going past a part that fails to rename, then
    /// `ul.cfg` is rewritten with the new name and the first failure is
    /// returned.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<(), Error> {
        check_name(new_name)?;
        let root = self.root.clone();
        let game = self
            .entries
            .get_mut(index)
            .ok_or(Error::InvalidIndex(index))?;

        if game.is_iso {
            if new_name.len() > ISO_GAME_NAME_MAX {
                return Err(Error::NameError(new_name.to_string()));
            }
            let old_path = game.iso_path(&root);
            let new_path = game.iso_path_named(&root, new_name.as_bytes());
            rename_file(&old_path, &new_path)?;
            game.name = new_name.as_bytes().to_vec();
            return Ok(());
        }

        let old_crc = usba_crc32(&game.name);
        game.name = truncate_to_bytes(new_name, UL_GAME_NAME_MAX)
            .as_bytes()
            .to_vec();
        let new_crc = usba_crc32(&game.name);

        let mut failed = None;
        for part in 0..game.parts.max(1) {
            let renamed = rename_file(
                &game.ul_part_path(&root, old_crc, part),
                &game.ul_part_path(&root, new_crc, part),
            );
            if let Err(err) = renamed {
                failed.get_or_insert(err);
            }
        }
        let written = self.write_ul_cfg(None);

        match failed {
            Some(err) => Err(err),
            None => written,
        }
    }
}

/// Compares the current size of `ul.cfg` with one seen earlier. `None`
/// stands for "absent" on both sides.
pub fn is_same_size(root: &Path, previous: Option<u64>) -> bool {
    let current = std::fs::metadata(root.join(UL_CFG_NAME))
        .ok()
        .map(|metadata| metadata.len());
    current == previous
}

fn check_name(name: &str) -> Result<(), Error> {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(Error::NameError(name.to_string()));
    }
    Ok(())
}

fn remove_file(path: &Path) -> Result<(), Error> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            eprintln!(
                "{} {}",
                path.display().to_string().dimmed(),
                "does not exist, skipping".dimmed()
            );
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn rename_file(from: &Path, to: &Path) -> Result<(), Error> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            eprintln!(
                "{} {}",
                from.display().to_string().dimmed(),
                "does not exist, skipping rename".dimmed()
            );
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

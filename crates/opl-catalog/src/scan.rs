use crate::TitleEntry;
use opl_filetypes::{MediaType, GAME_STARTUP_MAX};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::path::Path;

pub const ISO_GAME_NAME_MAX: usize = 64;

// "SCUS_XXX.XX." in front, ".iso" behind
const ISO_NAME_OVERHEAD: usize = GAME_STARTUP_MAX + 4;
const ISO_NAME_MIN: usize = ISO_NAME_OVERHEAD + 1;

/// Checks `SCUS_XXX.XX.<name>.iso` and returns the length of `<name>`.
pub fn is_valid_iso_name(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < ISO_NAME_MIN
        || bytes[4] != b'_'
        || bytes[8] != b'.'
        || bytes[11] != b'.'
        || !bytes[bytes.len() - 4..].eq_ignore_ascii_case(b".iso")
    {
        return None;
    }

    let len = bytes.len() - ISO_NAME_OVERHEAD;
    (len <= ISO_GAME_NAME_MAX).then_some(len)
}

/// Splits a valid image file name into startup id, display name and
/// extension. Size is left unknown.
pub fn parse_iso_name(name: &[u8], media: MediaType) -> Option<TitleEntry> {
    let len = is_valid_iso_name(name)?;

    Some(TitleEntry {
        name: name[GAME_STARTUP_MAX..GAME_STARTUP_MAX + len].to_vec(),
        startup: name[..GAME_STARTUP_MAX - 1].to_vec(),
        // ".iso" in any letter case, validated above
        extension: String::from_utf8_lossy(&name[GAME_STARTUP_MAX + len..]).into_owned(),
        parts: 1,
        media,
        is_iso: true,
        size_mb: None,
    })
}

#[cfg(unix)]
fn name_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(name.as_bytes())
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    match name.to_string_lossy() {
        Cow::Borrowed(name) => Cow::Borrowed(name.as_bytes()),
        Cow::Owned(name) => Cow::Owned(name.into_bytes()),
    }
}

/// Size in MiB from a length split into its low and high 32-bit words, the
/// way the device reports files past 4 GiB.
pub fn size_mb(len: u64) -> u32 {
    let low = len as u32;
    let high = (len >> 32) as u32;
    (low >> 20) | (high << 12)
}

/// Pushes every image found in `dir` onto `games` and returns how many were
/// accepted. The result is a stack: callers pop it, so images come out in
/// reverse enumeration order.
pub fn scan_for_iso(
    dir: &Path,
    media: MediaType,
    games: &mut Vec<TitleEntry>,
) -> std::io::Result<usize> {
    let mut count = 0;

    for entry in std::fs::read_dir(dir)?.flatten() {
        let file_name = entry.file_name();
        let Some(mut game) = parse_iso_name(&name_bytes(&file_name), media) else {
            continue;
        };

        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        game.size_mb = Some(size_mb(metadata.len()));
        games.push(game);
        count += 1;
    }

    Ok(count)
}

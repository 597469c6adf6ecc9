use crate::{Error, TitleEntry};
use opl_filetypes::{
    BinReader, BinWriter, CdvdmanSettings, ConfigSet, CDVDMAN_SETTINGS_SIZE,
    CONFIG_ITEM_CDVDMAN_TIMER, CONFIG_ITEM_COMPAT, CONFIG_ITEM_ENABLEGSM, CONFIG_ITEM_GSMSKIPVIDEOS,
    CONFIG_ITEM_GSMVMODE, CONFIG_ITEM_GSMXOFFSET, CONFIG_ITEM_GSMYOFFSET, DISC_ID_LEN,
    IOPCORE_COMPAT_0_PSS, IOPCORE_COMPAT_ALT_READ, IOPCORE_COMPAT_DISABLE_DVDDL,
    IOPCORE_ENABLE_POFF,
};

pub const COMPAT_MODE_1: u32 = 0x01;
pub const COMPAT_MODE_2: u32 = 0x02;
pub const COMPAT_MODE_3: u32 = 0x04;
pub const COMPAT_MODE_4: u32 = 0x08;
pub const COMPAT_MODE_5: u32 = 0x10;
pub const COMPAT_MODE_6: u32 = 0x20;
pub const COMPAT_MODE_7: u32 = 0x40;
pub const COMPAT_MODE_8: u32 = 0x80;

/// Compatibility modes that cdvdman handles itself. The others are applied
/// by the EE core and pass through untouched.
const CDVDMAN_COMPAT_FLAGS: [(u32, u16); 4] = [
    (COMPAT_MODE_2, IOPCORE_COMPAT_ALT_READ),
    (COMPAT_MODE_4, IOPCORE_COMPAT_0_PSS),
    (COMPAT_MODE_5, IOPCORE_COMPAT_DISABLE_DVDDL),
    (COMPAT_MODE_6, IOPCORE_ENABLE_POFF),
];

const CDVDMAN_TIMER_SCALE: i32 = 250;

/// Per-game GS mode selector options, only loaded when `$EnableGSM` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GsmSettings {
    pub v_mode: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub skip_videos: i32,
}

impl GsmSettings {
    pub fn from_config(config: &ConfigSet) -> Option<Self> {
        match config.get_int(CONFIG_ITEM_ENABLEGSM) {
            Some(enabled) if enabled != 0 => Some(Self {
                v_mode: config.get_int(CONFIG_ITEM_GSMVMODE).unwrap_or_default(),
                x_offset: config.get_int(CONFIG_ITEM_GSMXOFFSET).unwrap_or_default(),
                y_offset: config.get_int(CONFIG_ITEM_GSMYOFFSET).unwrap_or_default(),
                skip_videos: config.get_int(CONFIG_ITEM_GSMSKIPVIDEOS).unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Raw `$Compatibility` value, all bits included.
    pub compat_mask: u32,
    /// Offset of the settings block inside the image.
    pub offset: usize,
    pub gsm: Option<GsmSettings>,
}

/// First 4-byte aligned offset where `needle` occurs in `haystack`.
pub fn find_signature(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }

    (0..=haystack.len() - needle.len())
        .step_by(4)
        .find(|&offset| &haystack[offset..offset + needle.len()] == needle)
}

pub fn cdvdman_flags(compat_mask: u32) -> u16 {
    CDVDMAN_COMPAT_FLAGS
        .iter()
        .filter(|(mode, _)| compat_mask & mode != 0)
        .fold(0, |flags, (_, flag)| flags | flag)
}

/// Writes the boot parameters of `game` and `config` into the cdvdman
/// module loaded in `image`.
///
/// Without a game only the game independent fields are written. When the
/// settings block cannot be found the image is left untouched and
/// [`Error::SignatureNotFound`] is returned; the module is unknown and must
/// not be booted.
pub fn patch_cdvdman(
    image: &mut [u8],
    game: Option<&TitleEntry>,
    config: &ConfigSet,
) -> Result<PatchOutcome, Error> {
    let signature = CdvdmanSettings::SAMPLE.write()?;
    let offset = find_signature(image, &signature).ok_or(Error::SignatureNotFound)?;
    let block = &mut image[offset..offset + CDVDMAN_SETTINGS_SIZE];

    let compat_mask = config.get_uint(CONFIG_ITEM_COMPAT).unwrap_or_default();

    let mut settings = CdvdmanSettings::read(block)?;
    if let Some(game) = game {
        settings.num_parts = game.parts;
        settings.media = game.media.into();
    }
    settings.flags = cdvdman_flags(compat_mask);
    settings.cb_timer = config
        .get_int(CONFIG_ITEM_CDVDMAN_TIMER)
        .map(|timer| timer.wrapping_mul(CDVDMAN_TIMER_SCALE) as u32)
        .unwrap_or(0);
    settings.disc_id = config.disc_id_binary().unwrap_or([0; DISC_ID_LEN]);

    block.copy_from_slice(&settings.write()?);

    Ok(PatchOutcome {
        compat_mask,
        offset,
        gsm: GsmSettings::from_config(config),
    })
}

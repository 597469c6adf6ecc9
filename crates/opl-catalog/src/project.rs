use crate::{Error, TitleEntry};
use opl_filetypes::{
    ConfigSet, CONFIG_ITEM_FORMAT, CONFIG_ITEM_MEDIA, CONFIG_ITEM_NAME,
    CONFIG_ITEM_SIZE, CONFIG_ITEM_STARTUP,
};
use std::path::{Path, PathBuf};

pub const CFG_DIR: &str = "CFG";

pub fn config_path(game: &TitleEntry, root: &Path) -> PathBuf {
    root.join(CFG_DIR).join(format!("{}.cfg", game.startup_str()))
}

/// Loads the game's `CFG/<startup>.cfg` (or an empty set bound to that path)
/// and fills in the fields describing the game itself. Nothing is written;
/// call [`ConfigSet::write`] to persist.
pub fn populate_config(game: &TitleEntry, root: &Path) -> Result<ConfigSet, Error> {
    let mut config = ConfigSet::read(&config_path(game, root))?;

    config.set_str(CONFIG_ITEM_NAME, &game.display_name());
    if let Some(size_mb) = game.size_mb {
        config.set_int(CONFIG_ITEM_SIZE, size_mb as i32);
    }
    config.set_str(CONFIG_ITEM_FORMAT, game.format());
    config.set_str(CONFIG_ITEM_MEDIA, game.media.dir_name());
    config.set_str(CONFIG_ITEM_STARTUP, &game.startup_str());

    Ok(config)
}

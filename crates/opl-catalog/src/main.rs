use argh::FromArgs;
use colored::Colorize;
use opl_catalog::{config_path, patch_cdvdman, populate_config, Catalog, Error};
use opl_filetypes::ConfigSet;
use std::path::PathBuf;

#[derive(Debug, FromArgs)]
/// manage the games of an OPL device root (the folder holding ul.cfg, CD/ and DVD/)
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    List(ListArgs),
    Rename(RenameArgs),
    Delete(DeleteArgs),
    Config(ConfigArgs),
    Patch(PatchArgs),
}

#[derive(Debug, FromArgs)]
/// list every game found on the device
#[argh(subcommand, name = "list")]
struct ListArgs {
    /// device root
    #[argh(positional)]
    root: String,
    /// print the list as TOML
    #[argh(switch)]
    toml: bool,
}

#[derive(Debug, FromArgs)]
/// rename a game
#[argh(subcommand, name = "rename")]
struct RenameArgs {
    /// device root
    #[argh(positional)]
    root: String,
    /// index shown by `list`
    #[argh(positional)]
    index: usize,
    /// new game name
    #[argh(positional)]
    name: String,
}

#[derive(Debug, FromArgs)]
/// delete a game and its files
#[argh(subcommand, name = "delete")]
struct DeleteArgs {
    /// device root
    #[argh(positional)]
    root: String,
    /// index shown by `list`
    #[argh(positional)]
    index: usize,
}

#[derive(Debug, FromArgs)]
/// show the per-game configuration, optionally saving it
#[argh(subcommand, name = "config")]
struct ConfigArgs {
    /// device root
    #[argh(positional)]
    root: String,
    /// index shown by `list`
    #[argh(positional)]
    index: usize,
    /// write CFG/<startup>.cfg back
    #[argh(switch, short = 'w')]
    write: bool,
}

#[derive(Debug, FromArgs)]
/// write a game's boot parameters into a cdvdman module image
#[argh(subcommand, name = "patch")]
struct PatchArgs {
    /// device root
    #[argh(positional)]
    root: String,
    /// cdvdman module image
    #[argh(positional)]
    module: String,
    /// game index shown by `list`, omit to patch only the common fields
    #[argh(option, short = 'i')]
    index: Option<usize>,
    /// output path, defaults to overwriting the module
    #[argh(option, short = 'o')]
    output: Option<String>,
}

fn main() -> Result<(), Error> {
    let args: Args = argh::from_env();

    match args.command {
        Command::List(args) => list(args),
        Command::Rename(args) => rename(args),
        Command::Delete(args) => delete(args),
        Command::Config(args) => config(args),
        Command::Patch(args) => patch(args),
    }
}

fn list(args: ListArgs) -> Result<(), Error> {
    let catalog = Catalog::load(&args.root)?;

    if args.toml {
        let toml = catalog
            .to_toml_string()
            .map_err(|err| Error::ConfigError(err.to_string()))?;
        print!("{toml}");
        return Ok(());
    }

    if catalog.is_empty() {
        println!("{}", "No games found".dimmed());
        return Ok(());
    }

    for (index, game) in catalog.entries().iter().enumerate() {
        let size = game
            .size_mb
            .map(|size| format!("{size} MB"))
            .unwrap_or_default();
        println!(
            "{:>3} {} {} {:<3} {} {}",
            index,
            game.startup_str().cyan(),
            game.format(),
            game.media.dir_name(),
            game.display_name().green(),
            size.dimmed()
        );
    }

    Ok(())
}

fn rename(args: RenameArgs) -> Result<(), Error> {
    let mut catalog = Catalog::load(&args.root)?;
    catalog.rename(args.index, &args.name)?;
    println!("Renamed to {}", args.name.green());
    Ok(())
}

fn delete(args: DeleteArgs) -> Result<(), Error> {
    let mut catalog = Catalog::load(&args.root)?;
    let game = catalog.delete(args.index)?;
    println!("- {} {}", "Deleted", game.display_name().red());
    Ok(())
}

fn config(args: ConfigArgs) -> Result<(), Error> {
    let catalog = Catalog::load(&args.root)?;
    let game = catalog
        .get(args.index)
        .ok_or(Error::InvalidIndex(args.index))?;
    let config = populate_config(game, catalog.root())?;

    print!("{}", String::from_utf8_lossy(&config.to_bytes()));
    if args.write {
        config.write()?;
        println!(
            "Wrote {}",
            config_path(game, catalog.root()).display().to_string().green()
        );
    }
    Ok(())
}

fn patch(args: PatchArgs) -> Result<(), Error> {
    let catalog = Catalog::load(&args.root)?;
    let game = match args.index {
        Some(index) => Some(catalog.get(index).ok_or(Error::InvalidIndex(index))?),
        None => None,
    };
    let config = match game {
        Some(game) => populate_config(game, catalog.root())?,
        None => ConfigSet::default(),
    };

    let mut image = std::fs::read(&args.module)?;
    let outcome = patch_cdvdman(&mut image, game, &config)?;

    let output = PathBuf::from(args.output.unwrap_or(args.module));
    std::fs::write(&output, image)?;
    println!(
        "Patched settings at {:#x} (compat {:#04x}), wrote {}",
        outcome.offset,
        outcome.compat_mask,
        output.display().to_string().green()
    );
    if let Some(gsm) = outcome.gsm {
        println!(
            "{} mode {} offset {},{} skip videos {}",
            "GSM".cyan(),
            gsm.v_mode,
            gsm.x_offset,
            gsm.y_offset,
            gsm.skip_videos
        );
    }
    Ok(())
}

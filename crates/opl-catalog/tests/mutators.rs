use std::fs;
use std::path::Path;

use opl_catalog::{Catalog, Error};
use opl_filetypes::crc::usba_crc32;
use opl_filetypes::{MediaType, ULParser, ULRecord, ULWriter};
use tempfile::tempdir;

fn records() -> Vec<ULRecord> {
    vec![
        ULRecord {
            name: b"Gran Turismo 4".to_vec(),
            startup: b"SCUS_973.28".to_vec(),
            parts: 4,
            media: MediaType::Dvd,
        },
        ULRecord {
            name: b"Old Name".to_vec(),
            startup: b"SLUS_200.62".to_vec(),
            parts: 3,
            media: MediaType::Dvd,
        },
        ULRecord {
            name: b"Ico".to_vec(),
            startup: b"SCUS_971.13".to_vec(),
            parts: 1,
            media: MediaType::Cd,
        },
    ]
}

fn part_name(name: &[u8], startup: &[u8], part: u8) -> String {
    format!(
        "ul.{:08X}.{}.{:02x}",
        usba_crc32(name),
        String::from_utf8_lossy(startup),
        part
    )
}

fn write_games(root: &Path, records: Vec<ULRecord>) -> Vec<u8> {
    for record in &records {
        for part in 0..record.parts {
            let name = part_name(&record.name, &record.startup, part);
            fs::write(root.join(name), b"part").expect("write part file");
        }
    }

    let bytes = ULWriter::new(records).to_bytes().expect("serialize ul.cfg");
    fs::write(root.join("ul.cfg"), &bytes).expect("write ul.cfg");
    bytes
}

fn setup(root: &Path) -> Vec<u8> {
    let bytes = write_games(root, records());

    fs::create_dir_all(root.join("CD")).expect("create CD dir");
    fs::write(root.join("CD").join("SLUS_201.11.Spyro.iso"), b"iso").expect("write iso");

    bytes
}

fn ul_cfg_records(root: &Path) -> Vec<ULRecord> {
    let bytes = fs::read(root.join("ul.cfg")).expect("read ul.cfg");
    ULParser::new(bytes).parse().expect("parse ul.cfg")
}

fn part_files(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root)
        .expect("list root")
        .flatten()
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with("ul.") && name != "ul.cfg")
        .collect();
    names.sort();
    names
}

fn index_of(catalog: &Catalog, name: &[u8]) -> usize {
    catalog
        .entries()
        .iter()
        .position(|game| game.name.as_slice() == name)
        .expect("game present")
}

#[test]
fn rebuild_reproduces_ul_cfg_byte_for_byte() {
    let workspace = tempdir().expect("temp dir");
    let root = workspace.path();
    let original = setup(root);

    let mut catalog = Catalog::load(root).expect("load catalog");
    catalog.rebuild_ul_cfg().expect("rebuild ul.cfg");

    assert_eq!(fs::read(root.join("ul.cfg")).expect("read ul.cfg"), original);
    assert!(!catalog.is_stale());
}

#[test]
fn delete_ul_game_removes_its_parts_and_record() {
    let workspace = tempdir().expect("temp dir");
    let root = workspace.path();
    setup(root);

    let mut catalog = Catalog::load(root).expect("load catalog");
    let index = index_of(&catalog, b"Old Name");
    let deleted = catalog.delete(index).expect("delete game");
    assert_eq!(deleted.startup, b"SLUS_200.62");

    let crc = format!("{:08X}", usba_crc32(b"Old Name"));
    assert!(part_files(root).iter().all(|name| !name.contains(&crc)));
    // 4 + 1 parts of the other games survive
    assert_eq!(part_files(root).len(), 5);

    let mut expected = records();
    expected.remove(1);
    assert_eq!(ul_cfg_records(root), expected);

    assert_eq!(catalog.len(), 3);
    assert!(catalog.entries().iter().all(|game| game.name != b"Old Name"));
}

#[test]
fn delete_tolerates_missing_parts() {
    let workspace = tempdir().expect("temp dir");
    let root = workspace.path();
    setup(root);
    let crc = usba_crc32(b"Gran Turismo 4");
    fs::remove_file(root.join(format!("ul.{:08X}.SCUS_973.28.02", crc))).expect("remove part");

    let mut catalog = Catalog::load(root).expect("load catalog");
    catalog.delete(0).expect("delete game");

    let mut expected = records();
    expected.remove(0);
    assert_eq!(ul_cfg_records(root), expected);
}

#[test]
fn non_utf8_names_survive_rebuild_and_delete() {
    let workspace = tempdir().expect("temp dir");
    let root = workspace.path();
    let games = vec![
        ULRecord {
            name: b"Pok\xe9mon".to_vec(),
            startup: b"SLUS_200.62".to_vec(),
            parts: 2,
            media: MediaType::Dvd,
        },
        ULRecord {
            name: b"Ico".to_vec(),
            startup: b"SCUS_971.13".to_vec(),
            parts: 1,
            media: MediaType::Other(0x00),
        },
    ];
    let original = write_games(root, games.clone());

    let mut catalog = Catalog::load(root).expect("load catalog");
    assert_eq!(catalog.entries()[0].name, b"Pok\xe9mon");
    catalog.rebuild_ul_cfg().expect("rebuild ul.cfg");
    assert_eq!(fs::read(root.join("ul.cfg")).expect("read ul.cfg"), original);

    catalog.delete(0).expect("delete game");
    assert!(!root.join(part_name(b"Pok\xe9mon", b"SLUS_200.62", 0)).exists());
    assert!(!root.join(part_name(b"Pok\xe9mon", b"SLUS_200.62", 1)).exists());
    assert_eq!(part_files(root), vec![part_name(b"Ico", b"SCUS_971.13", 0)]);
    assert_eq!(ul_cfg_records(root), games[1..].to_vec());
}

#[test]
fn delete_keeps_going_past_a_part_it_cannot_remove() {
    let workspace = tempdir().expect("temp dir");
    let root = workspace.path();
    setup(root);
    let stuck = root.join(part_name(b"Old Name", b"SLUS_200.62", 1));
    fs::remove_file(&stuck).expect("remove part");
    fs::create_dir(&stuck).expect("put a directory in its place");

    let mut catalog = Catalog::load(root).expect("load catalog");
    let index = index_of(&catalog, b"Old Name");
    assert!(matches!(catalog.delete(index), Err(Error::IOError(_))));

    assert!(!root.join(part_name(b"Old Name", b"SLUS_200.62", 0)).exists());
    assert!(!root.join(part_name(b"Old Name", b"SLUS_200.62", 2)).exists());
    assert!(stuck.is_dir());

    let mut expected = records();
    expected.remove(1);
    assert_eq!(ul_cfg_records(root), expected);
    assert_eq!(catalog.len(), 3);
    assert!(!catalog.is_stale());
}

#[test]
fn rename_keeps_going_past_a_part_it_cannot_move() {
    let workspace = tempdir().expect("temp dir");
    let root = workspace.path();
    setup(root);
    let blocker = root.join(part_name(b"New Name", b"SLUS_200.62", 1));
    fs::create_dir(&blocker).expect("create blocking directory");
    fs::write(blocker.join("keep"), b"x").expect("fill blocking directory");

    let mut catalog = Catalog::load(root).expect("load catalog");
    let index = index_of(&catalog, b"Old Name");
    assert!(matches!(
        catalog.rename(index, "New Name"),
        Err(Error::IOError(_))
    ));

    assert!(root.join(part_name(b"New Name", b"SLUS_200.62", 0)).is_file());
    assert!(root.join(part_name(b"New Name", b"SLUS_200.62", 2)).is_file());
    assert!(root.join(part_name(b"Old Name", b"SLUS_200.62", 1)).is_file());

    let mut expected = records();
    expected[1].name = b"New Name".to_vec();
    assert_eq!(ul_cfg_records(root), expected);
    assert_eq!(catalog.entries()[index].name, b"New Name");
}

#[test]
fn rename_ul_game_moves_parts_to_new_crc() {
    let workspace = tempdir().expect("temp dir");
    let root = workspace.path();
    setup(root);

    let mut catalog = Catalog::load(root).expect("load catalog");
    let index = index_of(&catalog, b"Old Name");
    catalog.rename(index, "New Name").expect("rename game");

    let old_crc = format!("{:08X}", usba_crc32(b"Old Name"));
    let new_crc = format!("{:08X}", usba_crc32(b"New Name"));
    let parts = part_files(root);
    assert!(parts.iter().all(|name| !name.contains(&old_crc)));
    for part in 0..3 {
        let name = format!("ul.{new_crc}.SLUS_200.62.{part:02x}");
        assert!(parts.contains(&name), "missing {name}");
    }
    assert_eq!(parts.len(), 4 + 3 + 1);

    let mut expected = records();
    expected[1].name = b"New Name".to_vec();
    assert_eq!(ul_cfg_records(root), expected);
    assert_eq!(catalog.entries()[index].name, b"New Name");
}

#[test]
fn rename_ul_game_truncates_long_names() {
    let workspace = tempdir().expect("temp dir");
    let root = workspace.path();
    setup(root);

    let long_name = "A".repeat(40);
    let mut catalog = Catalog::load(root).expect("load catalog");
    catalog.rename(2, &long_name).expect("rename game");

    let stored = "A".repeat(32);
    assert_eq!(ul_cfg_records(root)[2].name, stored.as_bytes());
    let crc = format!("{:08X}", usba_crc32(stored.as_bytes()));
    assert!(root.join(format!("ul.{crc}.SCUS_971.13.00")).exists());
}

#[test]
fn iso_games_are_renamed_and_deleted_in_place() {
    let workspace = tempdir().expect("temp dir");
    let root = workspace.path();
    let original = setup(root);

    let mut catalog = Catalog::load(root).expect("load catalog");
    let index = index_of(&catalog, b"Spyro");
    catalog.rename(index, "Spyro the Dragon").expect("rename iso");

    assert!(!root.join("CD").join("SLUS_201.11.Spyro.iso").exists());
    let renamed = root.join("CD").join("SLUS_201.11.Spyro the Dragon.iso");
    assert!(renamed.exists());
    // ul.cfg is left alone for images
    assert_eq!(fs::read(root.join("ul.cfg")).expect("read ul.cfg"), original);

    catalog.delete(index).expect("delete iso");
    assert!(!renamed.exists());
    assert_eq!(fs::read(root.join("ul.cfg")).expect("read ul.cfg"), original);
}

#[test]
fn out_of_range_index_is_rejected() {
    let workspace = tempdir().expect("temp dir");
    let root = workspace.path();
    setup(root);

    let mut catalog = Catalog::load(root).expect("load catalog");
    assert!(matches!(catalog.delete(99), Err(Error::InvalidIndex(99))));
    assert!(matches!(
        catalog.rename(99, "Name"),
        Err(Error::InvalidIndex(99))
    ));
    assert!(matches!(catalog.rename(0, "a/b"), Err(Error::NameError(_))));
}

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;

pub const SIDECAR_JSON: &str = r#"{"title": "IMG_0001.jpg", "photoTakenTime": {"timestamp": "1622303739"}}"#;

/// Build a small takeout tree with one healthy pair, one truncated sidecar
/// and one numbered sidecar in a nested year folder.
pub fn setup_takeout(temp_dir: &TempDir) -> ChildPath {
    let takeout = temp_dir.child("Takeout");
    let year = takeout.child("Google Photos/Photos from 2021");

    year.child("IMG_0001.jpg").write_binary(b"jpeg").unwrap();
    year.child("IMG_0001.jpg.supplemental-metadat.json")
        .write_str(SIDECAR_JSON)
        .unwrap();

    year.child("20210529_155539(1).jpg").write_binary(b"jpeg").unwrap();
    year.child("20210529_155539.jpg.supplemental-metadata(1).json")
        .write_str(SIDECAR_JSON)
        .unwrap();

    year.child("IMG_0002.mp4").write_binary(b"mp4").unwrap();
    year.child("IMG_0002.mp4.supplemental-metadata.json")
        .write_str(SIDECAR_JSON)
        .unwrap();

    takeout
}

pub fn fixer() -> Command {
    Command::cargo_bin("takeout-fixer").unwrap()
}

//! Shared test fixtures for library, placement, and CLI tests.
#![allow(dead_code)] // Each test binary uses a different subset

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Writes a `.prefab` file whose parts sit on `layers`.
pub fn write_prefab(dir: &Path, name: &str, layers: &[i32]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let mut content = format!("name = \"{name}\"\n");
    for layer in layers {
        content.push_str(&format!("\n[[parts]]\nlayer = {layer}\ncolor = \"#3A7D2C\"\n"));
    }
    let path = dir.join(format!("{name}.prefab"));
    fs::write(&path, content).unwrap();
    path
}

/// Writes a placeholder sprite image.
pub fn write_sprite(dir: &Path, name: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{name}.png"));
    fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
    path
}

/// Creates a prefab library:
///
/// ```text
/// Rocks/Large/Boulder.prefab
/// Rocks/Notes/readme.txt      (group without assets)
/// Rocks/Small/Pebble.prefab
/// Trees/Birch.prefab
/// Trees/Oak.prefab
/// Water/                      (empty swatch)
/// ```
///
/// Every part sits on layer 0 so the default layer list accepts them.
pub fn prefab_library() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_prefab(&root.join("Trees"), "Oak", &[0]);
    write_prefab(&root.join("Trees"), "Birch", &[0, 0]);
    write_prefab(&root.join("Rocks").join("Small"), "Pebble", &[0]);
    write_prefab(&root.join("Rocks").join("Large"), "Boulder", &[0]);
    fs::create_dir_all(root.join("Rocks").join("Notes")).unwrap();
    fs::write(root.join("Rocks").join("Notes").join("readme.txt"), "notes").unwrap();
    fs::create_dir_all(root.join("Water")).unwrap();
    temp
}

/// Creates a library of prefabs whose parts span layers 20 and 30.
pub fn layered_library() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_prefab(&temp.path().join("Props"), "Lamp", &[20, 30]);
    temp
}

/// Creates a sectioned library with prefabs under `Outdoor` and `Indoor`.
pub fn sectioned_library() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_prefab(&root.join("Outdoor").join("Trees"), "Oak", &[0]);
    write_prefab(&root.join("Indoor").join("Furniture"), "Chair", &[0]);
    fs::create_dir_all(root.join("Unused").join("Nothing")).unwrap();
    temp
}

/// Creates a sprite library with `Tiles/Grass.png` and `Tiles/Sand.png`.
pub fn sprite_library() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_sprite(&temp.path().join("Tiles"), "Grass");
    write_sprite(&temp.path().join("Tiles"), "Sand");
    temp
}

/// Path to the objswatch binary
pub fn objswatch_bin() -> &'static str {
    env!("CARGO_BIN_EXE_objswatch")
}

/// Creates a Command with an isolated config directory.
pub fn isolated_command(args: &[&str], config_dir: &Path) -> Command {
    let mut cmd = Command::new(objswatch_bin());
    cmd.env("OBJSWATCH_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd.args(args);
    cmd
}

/// Converts a path to a `&str` for argument lists.
pub fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are valid UTF-8")
}

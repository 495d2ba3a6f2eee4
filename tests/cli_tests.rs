//! CLI integration tests for `satlas pack` and `satlas plan`.
//!
//! Builds a small asset tree in a temp directory, runs the binary and checks
//! the written pages and manifest.

use image::{Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const SCENE: &str = r#"{
    "map_id": 3,
    "items": [{ "id": 1, "amount": 1 }, { "id": 1, "amount": 50 }],
    "tiles": [{ "category": 3, "graphic": 7 }]
}"#;

/// Run satlas with the given arguments and return (stdout, stderr, success).
fn run_satlas(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_satlas"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute satlas");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Loose PNGs for the currency piles and the tile, plus the scene file.
fn fixture() -> TempDir {
    let temp = TempDir::new().expect("should create temp dir");
    let root = temp.path();

    let save = |rel: &str, image: RgbaImage| {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        image.save(path).unwrap();
    };
    save("assets/gfx/gfx023/369.png", RgbaImage::from_pixel(6, 5, Rgba([250, 200, 0, 255])));
    save("assets/gfx/gfx023/371.png", RgbaImage::from_pixel(9, 7, Rgba([250, 220, 0, 255])));
    save("assets/gfx/gfx003/107.png", RgbaImage::from_pixel(64, 32, Rgba([40, 140, 40, 255])));

    fs::write(root.join("scene.json"), SCENE).unwrap();
    temp
}

#[test]
fn test_pack_writes_pages_and_manifest() {
    let temp = fixture();
    let (stdout, stderr, ok) = run_satlas(temp.path(), &["pack", "scene.json", "--page-size", "128"]);
    assert!(ok, "pack should succeed: {}", stderr);
    assert!(stdout.contains("placed 3 frames"), "unexpected summary: {}", stdout);

    let out = temp.path().join("build");
    let page = image::open(out.join("page_0.png")).unwrap().to_rgba8();
    assert_eq!(page.dimensions(), (128, 128));

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("frames.json")).unwrap()).unwrap();
    assert_eq!(manifest["page_size"], 128);
    assert_eq!(manifest["frames"]["item/269"]["w"], 6);
    assert_eq!(manifest["frames"]["item/271"]["h"], 7);
    assert_eq!(manifest["frames"]["tile/gfx003/7"]["w"], 64);
}

#[test]
fn test_pack_reads_config_file() {
    let temp = fixture();
    fs::write(temp.path().join("atlas.toml"), "[atlas]\npage_size = 256\n\n[output]\ndir = \"atlas-out\"\n").unwrap();

    let (_, stderr, ok) = run_satlas(temp.path(), &["pack", "scene.json"]);
    assert!(ok, "pack should succeed: {}", stderr);

    let page = image::open(temp.path().join("atlas-out/page_0.png")).unwrap().to_rgba8();
    assert_eq!(page.dimensions(), (256, 256));
}

#[test]
fn test_pack_missing_bitmaps_still_succeeds() {
    let temp = fixture();
    fs::remove_file(temp.path().join("assets/gfx/gfx003/107.png")).unwrap();

    let (stdout, _, ok) = run_satlas(temp.path(), &["pack", "scene.json", "--page-size", "128"]);
    assert!(ok);
    assert!(stdout.contains("(1 failed)"), "unexpected summary: {}", stdout);
}

#[test]
fn test_pack_rejects_page_smaller_than_scratch() {
    let temp = fixture();
    let (_, stderr, ok) = run_satlas(temp.path(), &["pack", "scene.json", "--page-size", "64"]);
    assert!(!ok);
    assert!(stderr.contains("atlas.scratch"), "unexpected error: {}", stderr);
}

#[test]
fn test_pack_missing_scene_fails() {
    let temp = fixture();
    let (_, stderr, ok) = run_satlas(temp.path(), &["pack", "nope.json"]);
    assert!(!ok);
    assert!(stderr.contains("nope.json"));
}

#[test]
fn test_plan_lists_requests() {
    let temp = fixture();
    let (stdout, _, ok) = run_satlas(temp.path(), &["plan", "scene.json"]);
    assert!(ok);
    assert!(stdout.contains("gfx003#7  gfx/gfx003/107.png"));
    assert!(stdout.contains("gfx023#269  gfx/gfx023/369.png"));
    assert!(stdout.contains("3 bitmaps"));
}

#[test]
fn test_plan_json() {
    let temp = fixture();
    let (stdout, _, ok) = run_satlas(temp.path(), &["plan", "scene.json", "--json"]);
    assert!(ok);
    let requests: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let requests = requests.as_array().unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0]["category"], 3);
    assert_eq!(requests[0]["id"], 7);
}

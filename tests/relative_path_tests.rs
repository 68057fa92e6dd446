use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::tempdir;

use missing_link::scene::Image;
use missing_link::{AppConfig, AssumeYes, Engine, ScanSession, SceneGraph};

/// The working directory is process-wide; every test here changes it.
static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Runs the rest of a test inside `dir`, restoring the previous working
/// directory on drop.
struct InDir {
    previous: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl InDir {
    fn enter(dir: &Path) -> Self {
        let lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = env::current_dir().unwrap();
        env::set_current_dir(dir).unwrap();
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for InDir {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.previous);
    }
}

fn wood_scene(file_path: PathBuf) -> SceneGraph {
    SceneGraph {
        file_path: Some(file_path),
        images: vec![Image::new("wood", "//old/wood.png")],
        ..Default::default()
    }
}

#[test]
fn test_auto_search_from_relative_scene_path() {
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("textures")).unwrap();
    fs::write(tmp.path().join("textures").join("wood.png"), b"png").unwrap();
    let _cwd = InDir::enter(tmp.path());

    let graph = wood_scene(PathBuf::from("shot.json"));
    let engine = Engine::new(AppConfig::default());
    let mut session = ScanSession::new();
    assert_eq!(engine.scan(&graph, &mut session), 1);

    let stored = engine.auto_search(&graph, &mut session, 0).unwrap();
    assert_eq!(stored, "//textures/wood.png");
}

#[test]
fn test_load_anchors_relative_scene_path() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("shot.json"), r#"{ "images": [] }"#).unwrap();
    let _cwd = InDir::enter(tmp.path());

    let graph = SceneGraph::load(Path::new("shot.json")).unwrap();
    let cwd = env::current_dir().unwrap();
    assert_eq!(graph.file_path, Some(cwd.join("shot.json")));
    assert_eq!(graph.base_dir(), Some(cwd));
}

#[test]
fn test_relink_stores_cwd_relative_candidate_host_relative() {
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("found")).unwrap();
    fs::write(tmp.path().join("found").join("wood.png"), b"png").unwrap();
    let _cwd = InDir::enter(tmp.path());

    let mut graph = wood_scene(env::current_dir().unwrap().join("shot.json"));
    let engine = Engine::new(AppConfig::default());
    let mut session = ScanSession::new();
    engine.scan(&graph, &mut session);

    session.set_candidate(0, "found/wood.png").unwrap();
    let outcome = engine
        .relink(&mut graph, &mut session, 0, &AssumeYes)
        .unwrap();
    assert_eq!(outcome.stored_path, "//found/wood.png");
    assert_eq!(graph.images[0].filepath, "//found/wood.png");
    assert!(session.is_empty());
}

#[test]
fn test_relink_outside_relative_scene_keeps_plain_absolute_path() {
    let tmp = tempdir().unwrap();
    let elsewhere = tempdir().unwrap();
    let target = elsewhere.path().join("wood.png");
    fs::write(&target, b"png").unwrap();
    let _cwd = InDir::enter(tmp.path());

    let mut graph = wood_scene(PathBuf::from("shot.json"));
    let engine = Engine::new(AppConfig::default());
    let mut session = ScanSession::new();
    engine.scan(&graph, &mut session);

    session.set_candidate(0, &target.to_string_lossy()).unwrap();
    let outcome = engine
        .relink(&mut graph, &mut session, 0, &AssumeYes)
        .unwrap();
    assert_eq!(outcome.stored_path, target.to_string_lossy());
    assert!(!outcome.stored_path.starts_with("//"));
}

#[test]
fn test_relink_folder_given_relative_to_cwd() {
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("downloads").join("pack")).unwrap();
    fs::write(tmp.path().join("downloads").join("pack").join("wood.png"), b"png").unwrap();
    let _cwd = InDir::enter(tmp.path());

    let mut graph = wood_scene(PathBuf::from("shot.json"));
    let engine = Engine::new(AppConfig::default());
    let mut session = ScanSession::new();
    engine.scan(&graph, &mut session);

    let outcome = engine
        .relink_folder(&mut graph, &mut session, Path::new("downloads"))
        .unwrap();
    assert_eq!(outcome.relinked, 1);
    assert_eq!(graph.images[0].filepath, "//downloads/pack/wood.png");

    let fresh = wood_scene(PathBuf::from("shot.json"));
    engine.scan(&fresh, &mut session);
    let stored = engine
        .find_in_folder(&fresh, &mut session, 0, Path::new("downloads"))
        .unwrap();
    assert_eq!(stored, "//downloads/pack/wood.png");
}

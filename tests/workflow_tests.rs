use std::fs;
use std::path::Path;
use tempfile::tempdir;

use missing_link::report::ReportFormat;
use missing_link::view::{group_records, GroupKind};
use missing_link::{AppConfig, AssumeYes, Engine, Error, ScanSession, SceneGraph};

const SHOT_JSON: &str = r#"{
  "images": [
    { "name": "brick", "filepath": "//textures/brick.png" },
    { "name": "moss", "filepath": "//textures/moss.png" },
    { "name": "sky", "filepath": "//hdri/sky.exr", "fake_user": true },
    { "name": "decal", "filepath": "//textures/decal.png" }
  ],
  "movie_clips": [
    { "name": "plate", "filepath": "//plates/plate.mov" }
  ],
  "materials": [
    {
      "name": "Wall",
      "nodes": [
        { "name": "Base Color", "type": "image_texture", "image": "brick" },
        { "name": "Overlay", "type": "image_texture", "image": "moss" },
        { "name": "Mix", "type": "other", "type_name": "MIX_RGB" }
      ]
    },
    {
      "name": "Unused",
      "nodes": [
        { "name": "Base Color", "type": "image_texture", "image": "decal" }
      ]
    }
  ],
  "meshes": [
    { "name": "WallMesh", "materials": [ { "material": "Wall" } ] },
    { "name": "Orphan", "materials": [ { "material": "Unused" } ] }
  ],
  "objects": [
    { "name": "Wall", "kind": "mesh", "data": "WallMesh" },
    { "name": "Leftover", "kind": "mesh", "data": "Orphan" }
  ],
  "scenes": [
    { "name": "Scene", "objects": ["Wall"], "movie_clips": ["plate"] }
  ]
}"#;

/// Writes the shot next to an empty `downloads/` tree and loads it.
///
///   root/
///     shot.json
///     downloads/
fn load_shot(root: &Path) -> SceneGraph {
    let path = root.join("shot.json");
    fs::write(&path, SHOT_JSON).unwrap();
    fs::create_dir_all(root.join("downloads")).unwrap();
    SceneGraph::load(&path).unwrap()
}

#[test]
fn test_bulk_relink_two_of_three() {
    let tmp = tempdir().unwrap();
    let mut graph = load_shot(tmp.path());
    // Keep the purge candidates out of the way: only three missing files.
    graph.images.retain(|i| i.name != "decal" && i.name != "sky");

    let downloads = tmp.path().join("downloads");
    fs::create_dir_all(downloads.join("pack").join("bricks")).unwrap();
    fs::write(downloads.join("pack").join("bricks").join("brick.png"), b"png").unwrap();
    fs::write(downloads.join("plate.mov"), b"mov").unwrap();

    let engine = Engine::new(AppConfig::default());
    let mut session = ScanSession::new();
    assert_eq!(engine.scan(&graph, &mut session), 3);

    let outcome = engine
        .relink_folder(&mut graph, &mut session, &downloads)
        .unwrap();
    assert_eq!(outcome.relinked, 2);
    assert_eq!(outcome.unresolved, 1);
    assert!(outcome.issues.is_empty());

    assert_eq!(session.len(), 1);
    assert_eq!(session.records()[0].original_path, "//textures/moss.png");
    assert_eq!(graph.images[0].filepath, "//downloads/pack/bricks/brick.png");
    assert_eq!(graph.movie_clips[0].filepath, "//downloads/plate.mov");
}

#[test]
fn test_purge_twice() {
    let tmp = tempdir().unwrap();
    let mut graph = load_shot(tmp.path());
    let engine = Engine::new(AppConfig::default());
    let mut session = ScanSession::new();
    engine.scan(&graph, &mut session);

    let first = engine.purge(&mut graph, &mut session, &AssumeYes).unwrap();
    assert_eq!(first.objects_removed, 1);
    // Orphan mesh, Unused material, decal image.
    assert_eq!(first.datablocks_removed, 3);
    assert!(graph.images.iter().any(|i| i.name == "sky"));

    let second = engine.purge(&mut graph, &mut session, &AssumeYes).unwrap();
    assert_eq!(second.total(), 0);
}

#[test]
fn test_auto_search_error_kinds() {
    let tmp = tempdir().unwrap();
    let mut graph = load_shot(tmp.path());
    let engine = Engine::new(AppConfig::default());
    let mut session = ScanSession::new();
    engine.scan(&graph, &mut session);

    let err = engine.auto_search(&graph, &mut session, 0).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    fs::create_dir_all(tmp.path().join("Textures")).unwrap();
    fs::write(tmp.path().join("Textures").join("brick.png"), b"png").unwrap();
    let stored = engine.auto_search(&graph, &mut session, 0).unwrap();
    assert_eq!(stored, "//Textures/brick.png");
    assert_eq!(session.records()[0].candidate_new_path, stored);

    graph.file_path = None;
    let err = engine.auto_search(&graph, &mut session, 0).unwrap_err();
    assert!(matches!(err, Error::SaveLocationUnknown));
}

#[test]
fn test_report_written_next_to_scene() {
    let tmp = tempdir().unwrap();
    let graph = load_shot(tmp.path());
    let engine = Engine::new(AppConfig::default());
    let mut session = ScanSession::new();
    engine.scan(&graph, &mut session);

    let path = engine
        .export_report(&graph, &session, None, ReportFormat::Text)
        .unwrap();
    assert_eq!(path, tmp.path().join("missing_files_report.txt"));
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("Total missing files: 5"));
    assert!(text.contains("Original Path: //plates/plate.mov"));

    let csv_path = tmp.path().join("out").join("report.csv");
    engine
        .export_report(&graph, &session, Some(&csv_path), ReportFormat::Csv)
        .unwrap();
    assert_eq!(fs::read_to_string(&csv_path).unwrap().lines().count(), 6);
}

#[test]
fn test_report_write_failure() {
    let tmp = tempdir().unwrap();
    let graph = load_shot(tmp.path());
    let engine = Engine::new(AppConfig::default());
    let mut session = ScanSession::new();
    engine.scan(&graph, &mut session);

    // A directory cannot be opened as a file.
    let err = engine
        .export_report(&graph, &session, Some(&tmp.path().join("downloads")), ReportFormat::Text)
        .unwrap_err();
    assert!(matches!(err, Error::WriteFailed { .. }));
}

#[test]
fn test_view_groups_after_scan() {
    let tmp = tempdir().unwrap();
    let graph = load_shot(tmp.path());
    let engine = Engine::new(AppConfig::default());
    let mut session = ScanSession::new();
    engine.scan(&graph, &mut session);

    let groups = group_records(session.records(), &session.filter);
    let kinds: Vec<GroupKind> = groups.iter().map(|g| g.kind).collect();
    assert_eq!(kinds, vec![GroupKind::Images, GroupKind::Movies]);
    assert_eq!(groups[0].entries.len(), 4);

    session.filter.show_unused = false;
    let groups = group_records(session.records(), &session.filter);
    // Leftover still counts as a user of decal even outside every scene;
    // sky and the clip have no object users.
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].entries.len(), 3);
}

#[test]
fn test_saved_scene_round_trips_relinked_path() {
    let tmp = tempdir().unwrap();
    let mut graph = load_shot(tmp.path());
    fs::write(tmp.path().join("downloads").join("moss.png"), b"png").unwrap();

    let engine = Engine::new(AppConfig::default());
    let mut session = ScanSession::new();
    engine.scan(&graph, &mut session);
    engine
        .relink_folder(&mut graph, &mut session, &tmp.path().join("downloads"))
        .unwrap();

    let path = tmp.path().join("shot.toml");
    graph.save(&path).unwrap();
    let reloaded = SceneGraph::load(&path).unwrap();
    assert_eq!(reloaded.images[1].filepath, "//downloads/moss.png");
    assert_eq!(reloaded.materials[0].nodes.len(), 3);
}

//! End-to-end discovery, read, and write tests.
//!
//! Exercises the full pipeline against a synthetic home and workspace laid
//! out in a tempdir, with an injected environment snapshot so nothing
//! depends on the host's real configuration.

use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use xdg_project_conf::{
    ConfigDiscovery, DiscoverOptions, EnvSnapshot, Mapping, WriteMode,
};

const PROJECT: &str = "testproj";

/// A fake home directory with a user-level config file.
fn fake_home(temp: &TempDir) -> PathBuf {
    let home = temp.path().join("home");
    let user_conf = home.join(".config").join(PROJECT);
    fs::create_dir_all(&user_conf).expect("create user config dir");
    fs::write(
        user_conf.join("config.yml"),
        "tabs: 4\ntheme: light\npaths:\n  cache: /tmp/cache\n",
    )
    .expect("write user config");
    home
}

/// A workspace with a root manifest carrying embedded config and an rc file
/// in a subdirectory.
fn fake_workspace(temp: &TempDir) -> (PathBuf, PathBuf) {
    let ws = temp.path().join("ws");
    let src = ws.join("src");
    fs::create_dir_all(&src).expect("create workspace");
    fs::write(
        ws.join("Cargo.toml"),
        format!(
            "[package]\nname = \"{PROJECT}\"\nversion = \"0.1.0\"\n\n\
             [package.metadata.{PROJECT}]\nbanner = \"from-manifest\"\n"
        ),
    )
    .expect("write manifest");
    fs::write(src.join(format!(".{PROJECT}rc")), "tabs: 8\n").expect("write rc file");
    (ws, src)
}

fn discovery(temp: &TempDir) -> ConfigDiscovery {
    ConfigDiscovery::with_env(PROJECT, EnvSnapshot::bare(fake_home(temp)))
}

fn mapping(value: serde_json::Value) -> Mapping {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not a mapping: {other}"),
    }
}

#[test]
fn dominant_last_mirrors_dominant_first() {
    let temp = TempDir::new().unwrap();
    let d = discovery(&temp);
    let opts = DiscoverOptions::new().custom(temp.path().join("override.yml"));

    let forward = d.discover(&opts).unwrap();
    let backward = d.discover(&opts.clone().dominant_last(true)).unwrap();

    assert!(!forward.is_empty());
    assert_eq!(forward.first(), backward.last());
    assert_eq!(forward.last(), backward.first());
}

#[test]
fn workspace_rc_file_is_discovered_via_trace() {
    let temp = TempDir::new().unwrap();
    let d = discovery(&temp);
    let (_ws, src) = fake_workspace(&temp);

    let traced = d
        .discover(&DiscoverOptions::new().trace_from(&src))
        .unwrap();
    assert!(traced.contains(&src.join(format!(".{PROJECT}rc"))));

    // Without a trace the workspace contributes nothing.
    let untraced = d.discover(&DiscoverOptions::new()).unwrap();
    assert!(!untraced.contains(&src.join(format!(".{PROJECT}rc"))));
}

#[test]
fn improper_locations_are_opt_in() {
    let temp = TempDir::new().unwrap();
    let home = fake_home(&temp);
    let improper = home.join(format!(".{PROJECT}"));
    fs::create_dir_all(&improper).unwrap();
    fs::write(improper.join("config.yml"), "theme: improper\n").unwrap();

    let d = ConfigDiscovery::with_env(PROJECT, EnvSnapshot::bare(&home));
    let plain = d.discover(&DiscoverOptions::new()).unwrap();
    assert!(!plain.contains(&improper.join("config.yml")));

    let with_improper = d
        .discover(&DiscoverOptions::new().improper(true))
        .unwrap();
    assert!(with_improper.contains(&improper.join("config.yml")));
}

#[test]
fn custom_location_is_most_dominant() {
    let temp = TempDir::new().unwrap();
    let d = discovery(&temp);
    let custom = temp.path().join("customconf.yml");

    let discovered = d
        .discover(&DiscoverOptions::new().custom(&custom))
        .unwrap();
    assert_eq!(discovered.first(), Some(&custom));
    assert!(!d.discover(&DiscoverOptions::new()).unwrap().contains(&custom));
}

#[test]
fn merged_read_superimposes_all_tiers() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let d = discovery(&temp);
    let (_ws, src) = fake_workspace(&temp);

    let merged = d.read_merged(&DiscoverOptions::new().trace_from(&src))?;

    // Workspace rc dominates the user config.
    assert_eq!(merged["tabs"], json!(8));
    // User config survives where not overridden.
    assert_eq!(merged["theme"], json!("light"));
    assert_eq!(merged["paths"]["cache"], json!("/tmp/cache"));
    // Manifest metadata is the least dominant ancestor contribution.
    assert_eq!(merged["banner"], json!("from-manifest"));
    Ok(())
}

#[test]
fn shipped_defaults_lose_to_user_config() {
    let temp = TempDir::new().unwrap();
    let shipped = temp.path().join("shipped");
    fs::create_dir_all(&shipped).unwrap();
    fs::write(shipped.join("config.yml"), "tabs: 2\nshipped_only: true\n").unwrap();

    let d = discovery(&temp).with_shipped(&shipped);
    let merged = d.read_merged(&DiscoverOptions::new()).unwrap();

    assert_eq!(merged["tabs"], json!(4));
    assert_eq!(merged["shipped_only"], json!(true));
}

#[test]
fn per_file_read_is_dominance_ordered() {
    let temp = TempDir::new().unwrap();
    let d = discovery(&temp);
    let (_ws, src) = fake_workspace(&temp);

    let configs = d.read(&DiscoverOptions::new().trace_from(&src)).unwrap();
    let paths: Vec<_> = configs.iter().map(|(p, _)| p.clone()).collect();

    let rc_pos = paths
        .iter()
        .position(|p| p.ends_with(format!(".{PROJECT}rc")))
        .expect("rc file parsed");
    let user_pos = paths
        .iter()
        .position(|p| p.ends_with("config.yml"))
        .expect("user config parsed");
    assert!(rc_pos < user_pos);
}

#[test]
fn write_round_trips_each_format() {
    let temp = TempDir::new().unwrap();
    let d = discovery(&temp);
    let data = mapping(json!({"written": {"by": "test"}}));

    for ext in ["yml", "toml", "conf"] {
        let written = d
            .write(&data, WriteMode::Update, &DiscoverOptions::new().extension(ext))
            .unwrap()
            .unwrap_or_else(|| panic!("no writable candidate for .{ext}"));
        assert_eq!(written.extension().and_then(|e| e.to_str()), Some(ext));
        assert!(written.starts_with(temp.path()));

        let reread = xdg_project_conf::formats::parse_file(&written, None).unwrap();
        assert_eq!(reread["written"]["by"], json!("test"));
    }
}

#[test]
fn written_config_feeds_back_into_reads() {
    let temp = TempDir::new().unwrap();
    let d = discovery(&temp);

    d.write(
        &mapping(json!({"accent": "blue"})),
        WriteMode::Update,
        &DiscoverOptions::new().extension("yml"),
    )
    .unwrap()
    .expect("write somewhere under the fake home");

    let merged = d.read_merged(&DiscoverOptions::new()).unwrap();
    assert_eq!(merged["accent"], json!("blue"));
    assert_eq!(merged["tabs"], json!(4));
}

#[test]
fn missing_manifest_named_candidate_is_skipped_on_read() {
    let temp = TempDir::new().unwrap();
    let d = discovery(&temp);

    // A candidate that vanished between discovery and read is skipped no
    // matter what its file name dispatches to.
    let configs = d
        .read(&DiscoverOptions::new().custom(temp.path().join("setup.cfg")))
        .unwrap();
    assert!(configs.iter().all(|(p, _)| !p.ends_with("setup.cfg")));

    let configs = d
        .read(&DiscoverOptions::new().custom(temp.path().join("absent.yml")))
        .unwrap();
    assert!(configs.iter().all(|(p, _)| !p.ends_with("absent.yml")));
}

#[test]
fn manifests_are_never_write_targets() {
    let temp = TempDir::new().unwrap();
    let d = discovery(&temp);
    let (ws, src) = fake_workspace(&temp);

    let candidates = d
        .writable_candidates(&DiscoverOptions::new().trace_from(&src))
        .unwrap();
    assert!(!candidates.contains(&ws.join("Cargo.toml")));
    assert!(candidates.contains(&src.join(format!(".{PROJECT}rc"))));
}

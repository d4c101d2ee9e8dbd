//! Configuration system tests
//!
//! Tests for config paths, snippet engine config, and snippet file loading.

use tempfile::tempdir;
use token_snippets::config::SnippetConfig;
use token_snippets::config_paths;
use token_snippets::sync::SyncMode;
use token_snippets::SnippetModel;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_contains_app_name() {
    let dir = config_paths::config_dir().unwrap();
    assert!(dir.to_string_lossy().contains("token-snippets"));
}

#[test]
fn test_config_file_ends_with_yaml() {
    let path = config_paths::config_file().unwrap();
    assert!(path.to_string_lossy().ends_with("config.yaml"));
}

#[test]
fn test_snippets_and_logs_are_subdirs_of_config() {
    let config = config_paths::config_dir().unwrap();
    assert!(config_paths::snippets_dir().unwrap().starts_with(&config));
    assert!(config_paths::logs_dir().unwrap().starts_with(&config));
}

// ========================================================================
// Snippet Config Tests
// ========================================================================

#[test]
fn test_full_yaml() {
    let yaml = "\
sync_mode: on_jump
indent_multiline: false
snippet_files:
  - /home/user/rust.json
  - /home/user/js.json
";
    let config = SnippetConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.sync_mode, SyncMode::OnJump);
    assert!(!config.indent_multiline);
    assert_eq!(config.snippet_files.len(), 2);
}

#[test]
fn test_empty_yaml_is_default() {
    assert_eq!(
        SnippetConfig::from_yaml_str("{}").unwrap(),
        SnippetConfig::default()
    );
}

#[test]
fn test_config_serialize_deserialize() {
    let config = SnippetConfig {
        sync_mode: SyncMode::Realtime,
        ..SnippetConfig::default()
    };
    let yaml = serde_yaml::to_string(&config).unwrap();
    assert!(yaml.contains("realtime"));
    assert_eq!(SnippetConfig::from_yaml_str(&yaml).unwrap(), config);
}

// ========================================================================
// Snippet Loading Tests
// ========================================================================

#[test]
fn test_model_loads_configured_snippet_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rust.json");
    std::fs::write(
        &path,
        r##"{
            "Print": { "prefix": "pl", "body": "println!(\"$1\");" },
            "Test": { "prefix": "tst", "body": ["#[test]", "fn $1() {", "\t$0", "}"] }
        }"##,
    )
    .unwrap();

    let config = SnippetConfig {
        sync_mode: SyncMode::Realtime,
        snippet_files: vec![path],
        ..SnippetConfig::default()
    };
    let model = SnippetModel::load(config);

    assert!(model.index.get("pl").is_some());
    assert!(model.index.get("tst").unwrap().body.starts_with("#[test]\nfn $1() {"));
    assert_eq!(model.controller.mode(), SyncMode::Realtime);
}

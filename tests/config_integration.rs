use std::path::PathBuf;

use eqpad::config::{ConfigFlags, load_config_flags, parse_flag_tokens};
use eqpad::snippets::Category;

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".eqpadrc");
    let content = r#"
# comment
--no-preview

--category chem
   
--export-dir=renders
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.no_preview);
    assert_eq!(flags.category, Some(Category::Chemistry));
    assert_eq!(flags.export_dir, Some(PathBuf::from("renders")));
}

#[test]
fn test_missing_config_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".eqpadrc");
    let content = "--no-trust\n--category symbols\n--log-file file.log\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "eqpad".to_string(),
        "--category".to_string(),
        "math".to_string(),
        "--no-preview".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.no_trust, "file flags should remain enabled");
    assert!(effective.no_preview, "cli flags should be applied");
    assert_eq!(
        effective.category,
        Some(Category::Math),
        "cli should override category"
    );
    assert_eq!(
        effective.log_file,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "eqpad".to_string(),
        "--category=chem".to_string(),
        "--snippets=mine.json".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.category, Some(Category::Chemistry));
    assert_eq!(flags.snippets, Some(PathBuf::from("mine.json")));
}

#[test]
fn test_local_override_beats_global() {
    let dir = tempfile::tempdir().unwrap();
    let global = dir.path().join("config");
    let local = dir.path().join(".eqpadrc");
    std::fs::write(&global, "--category chem\n--export-dir global-out\n").unwrap();
    std::fs::write(&local, "--category symbols\n").unwrap();

    let merged = load_config_flags(&global)
        .unwrap()
        .union(&load_config_flags(&local).unwrap());
    assert_eq!(merged.category, Some(Category::Symbols));
    assert_eq!(merged.export_dir, Some(PathBuf::from("global-out")));
}

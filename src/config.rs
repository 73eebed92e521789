use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::snippets::Category;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_preview: bool,
    pub no_trust: bool,
    pub category: Option<Category>,
    pub export_dir: Option<PathBuf>,
    pub snippets: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge with `other` taking precedence for valued options.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_preview: self.no_preview || other.no_preview,
            no_trust: self.no_trust || other.no_trust,
            category: other.category.or(self.category),
            export_dir: other
                .export_dir
                .clone()
                .or_else(|| self.export_dir.clone()),
            snippets: other.snippets.clone().or_else(|| self.snippets.clone()),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("eqpad").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("eqpad")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("eqpad").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("eqpad").join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".eqpadrc")
}

/// Read a flag file; a missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// # Errors
///
/// Returns an error if the parent directory or the file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# eqpad defaults (saved with --save)".to_string()];
    if let Some(category) = flags.category {
        lines.push(format!("--category {}", category.flag_value()));
    }
    if flags.no_preview {
        lines.push("--no-preview".to_string());
    }
    if flags.no_trust {
        lines.push("--no-trust".to_string());
    }
    if let Some(dir) = &flags.export_dir {
        lines.push(format!("--export-dir {}", dir.display()));
    }
    if let Some(file) = &flags.snippets {
        lines.push(format!("--snippets {}", file.display()));
    }
    if let Some(file) = &flags.log_file {
        lines.push(format!("--log-file {}", file.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list; anything else is ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value.to_string())),
            _ => (token, None),
        };
        let mut value = || {
            inline.clone().or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--no-preview" => flags.no_preview = true,
            "--no-trust" => flags.no_trust = true,
            "--category" => flags.category = value().as_deref().and_then(parse_category),
            "--export-dir" => flags.export_dir = value().map(PathBuf::from),
            "--snippets" => flags.snippets = value().map(PathBuf::from),
            "--log-file" => flags.log_file = value().map(PathBuf::from),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_category(s: &str) -> Option<Category> {
    Category::ALL.into_iter().find(|c| c.flag_value() == s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "eqpad",
            "--no-preview",
            "--category",
            "chem",
            "--export-dir=out",
            "--snippets",
            "mine.json",
            "seed.tex",
        ]);
        let flags = parse_flag_tokens(&args);
        assert!(flags.no_preview);
        assert!(!flags.no_trust);
        assert_eq!(flags.category, Some(Category::Chemistry));
        assert_eq!(flags.export_dir, Some(PathBuf::from("out")));
        assert_eq!(flags.snippets, Some(PathBuf::from("mine.json")));
    }

    #[test]
    fn test_parse_unknown_category_is_none() {
        let flags = parse_flag_tokens(&tokens(&["--category", "physics"]));
        assert_eq!(flags.category, None);
    }

    #[test]
    fn test_valued_flag_at_end_without_value() {
        let flags = parse_flag_tokens(&tokens(&["--log-file"]));
        assert_eq!(flags.log_file, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            no_trust: true,
            category: Some(Category::Symbols),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            no_preview: true,
            category: Some(Category::Math),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.no_trust);
        assert!(merged.no_preview);
        assert_eq!(merged.category, Some(Category::Math));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let flags = ConfigFlags {
            no_preview: true,
            no_trust: true,
            category: Some(Category::Chemistry),
            export_dir: Some(PathBuf::from("exports")),
            snippets: Some(PathBuf::from("snips.json")),
            log_file: Some(PathBuf::from("eqpad.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}

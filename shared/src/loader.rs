//! Strategy source files on disk.

use anyhow::Context;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

const LOCAL_STRATEGIES_DIR: &str = "./strategies";
const EXTENSION: &str = "py";

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("invalid strategy name '{0}': use letters, digits, '_' or '-'")]
    InvalidName(String),

    #[error("strategy '{name}' not found (searched {})", display_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone)]
pub struct LoadedStrategy {
    pub name: String,
    pub path: PathBuf,
    pub code: String,
}

/// Names double as file stems, so nothing that could leave the directory.
pub fn validate_name(name: &str) -> Result<(), LoaderError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(LoaderError::InvalidName(name.to_string()))
    }
}

/// Candidate files for `name`, in lookup order.
pub fn search_paths(name: &str, config: &Config) -> Vec<PathBuf> {
    let file = format!("{}.{}", name, EXTENSION);
    let mut paths = vec![
        config.strategies_path.join(&file),
        config.presets_path.join(&file),
    ];
    let local = Path::new(LOCAL_STRATEGIES_DIR).join(&file);
    if !paths.contains(&local) {
        paths.push(local);
    }
    paths
}

/// Load a strategy by name from the first directory that has it.
pub async fn load_strategy(name: &str, config: &Config) -> Result<LoadedStrategy, LoaderError> {
    validate_name(name)?;
    let searched = search_paths(name, config);

    for path in &searched {
        match tokio::fs::read_to_string(path).await {
            Ok(code) => {
                info!("Loaded strategy '{}' from {}", name, path.display());
                return Ok(LoadedStrategy {
                    name: name.to_string(),
                    path: path.clone(),
                    code,
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Strategy '{}' not in {}", name, path.display());
            }
            Err(source) => {
                return Err(LoaderError::Io {
                    path: path.clone(),
                    source,
                })
            }
        }
    }

    Err(LoaderError::NotFound {
        name: name.to_string(),
        searched,
    })
}

/// Load strategy source from an explicit path.
pub async fn load_from_path(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read strategy file {}", path.display()))
}

/// Names of every `.py` strategy in the configured directories, sorted.
pub async fn list_strategies(config: &Config) -> Result<Vec<String>, LoaderError> {
    let mut names = BTreeSet::new();
    for dir in [&config.strategies_path, &config.presets_path] {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(source) => {
                return Err(LoaderError::Io {
                    path: dir.clone(),
                    source,
                })
            }
        };
        loop {
            let entry = entries.next_entry().await.map_err(|source| LoaderError::Io {
                path: dir.clone(),
                source,
            })?;
            let Some(entry) = entry else { break };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_name(stem).is_ok() {
                    names.insert(stem.to_string());
                }
            }
        }
    }
    Ok(names.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(strategies: &Path, presets: &Path) -> Config {
        Config {
            strategies_path: strategies.to_path_buf(),
            presets_path: presets.to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("golden_cross-v2").is_ok());
        assert!(matches!(validate_name(""), Err(LoaderError::InvalidName(_))));
        assert!(matches!(validate_name("../etc/passwd"), Err(LoaderError::InvalidName(_))));
        assert!(matches!(validate_name("a.b"), Err(LoaderError::InvalidName(_))));
    }

    #[test]
    fn test_search_order() {
        let config = config_for(Path::new("/data/user"), Path::new("/data/presets"));
        let paths = search_paths("vcp", &config);
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/data/user/vcp.py"),
                PathBuf::from("/data/presets/vcp.py"),
                PathBuf::from("./strategies/vcp.py"),
            ]
        );
    }

    #[tokio::test]
    async fn test_user_directory_wins_over_presets() {
        let user = tempfile::tempdir().unwrap();
        let presets = tempfile::tempdir().unwrap();
        std::fs::write(user.path().join("grid.py"), "# user").unwrap();
        std::fs::write(presets.path().join("grid.py"), "# preset").unwrap();
        std::fs::write(presets.path().join("dca.py"), "# preset dca").unwrap();

        let config = config_for(user.path(), presets.path());
        let grid = load_strategy("grid", &config).await.unwrap();
        assert_eq!(grid.code, "# user");
        let dca = load_strategy("dca", &config).await.unwrap();
        assert_eq!(dca.path, presets.path().join("dca.py"));
    }

    #[tokio::test]
    async fn test_missing_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), dir.path());
        let err = load_strategy("definitely_missing_strategy", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, LoaderError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_strategies() {
        let user = tempfile::tempdir().unwrap();
        let presets = tempfile::tempdir().unwrap();
        std::fs::write(user.path().join("b.py"), "").unwrap();
        std::fs::write(user.path().join("notes.txt"), "").unwrap();
        std::fs::write(presets.path().join("a.py"), "").unwrap();
        std::fs::write(presets.path().join("b.py"), "").unwrap();

        let names = list_strategies(&config_for(user.path(), presets.path()))
            .await
            .unwrap();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_load_from_path_error_names_file() {
        let err = load_from_path(Path::new("/nonexistent/strategy.py"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/strategy.py"));
    }
}

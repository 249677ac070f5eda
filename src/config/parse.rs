//! Moanfile parsing and discovery

use crate::config::types::{Config, Task};
use crate::config::validate_config;
use crate::error::{ConfigError, ConfigResult, MoanError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Moanfile names to search for, in order of preference
pub const CONFIG_FILE_NAMES: &[&str] = &["moan.yml", "moan.yaml", "Moaning.yml"];

/// Find the moanfile by searching the current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the moanfile starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                debug!("found moanfile at {}", config_path.display());
                return Ok(config_path);
            }
            searched_paths.push(config_path.display().to_string());
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse and validate a moanfile from a path
pub fn parse_config_file(path: &Path) -> Result<Config, MoanError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
    })?;

    parse_config(&contents, Some(path))
}

/// Parse and validate a moanfile from a string.
///
/// `include` paths are resolved relative to `config_path`'s directory, or the current
/// directory when there is no path.
pub fn parse_config(yaml: &str, config_path: Option<&Path>) -> Result<Config, MoanError> {
    let mut config: Config = serde_yaml::from_str(yaml)?;

    let base_dir = config_path
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new("."));
    process_includes(&mut config, base_dir)?;
    validate_config(&config)?;

    Ok(config)
}

/// Replace tasks that have an `include` with the task loaded from that file
fn process_includes(config: &mut Config, base_dir: &Path) -> ConfigResult<()> {
    for (name, task) in config.tasks.iter_mut() {
        if let Some(include_path) = &task.include {
            let full_path = base_dir.join(include_path);
            debug!("task {} includes {}", name, full_path.display());
            *task = load_included_task(&full_path)?;
        }
    }

    Ok(())
}

/// Load a task from an included file
fn load_included_task(path: &Path) -> ConfigResult<Task> {
    let include_error = |error: String| ConfigError::IncludeFile {
        path: path.to_path_buf(),
        error,
    };

    let contents = fs::read_to_string(path).map_err(|e| include_error(e.to_string()))?;
    let task: Task = serde_yaml::from_str(&contents).map_err(|e| include_error(e.to_string()))?;

    if task.include.is_some() {
        return Err(include_error(
            "included tasks cannot include other files".to_string(),
        ));
    }

    Ok(task)
}

/// Find, parse and validate the moanfile, returning it with its path
pub fn parse_config_auto() -> Result<(Config, PathBuf), MoanError> {
    let config_path = find_config_file()?;
    let config = parse_config_file(&config_path)?;
    Ok((config, config_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SIMPLE: &str = r#"
tasks:
  test:
    run: echo "test"
"#;

    #[test]
    fn test_parse_simple_config() {
        let yaml = r#"
tasks:
  hello:
    usage: Say hello
    run: echo "hello"
"#;
        let config = parse_config(yaml, None).unwrap();
        assert_eq!(config.task_names(), vec!["hello"]);
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("moan.yml");
        fs::write(&config_path, SIMPLE).unwrap();

        let found = find_config_file_from(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("moan.yaml");
        let sub_dir = temp_dir.path().join("subdir");

        fs::create_dir(&sub_dir).unwrap();
        fs::write(&config_path, SIMPLE).unwrap();

        let found = find_config_file_from(sub_dir).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_find_config_prefers_moan_yml() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Moaning.yml"), SIMPLE).unwrap();
        fs::write(temp_dir.path().join("moan.yml"), SIMPLE).unwrap();

        let found = find_config_file_from(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(found, temp_dir.path().join("moan.yml"));
    }

    #[test]
    fn test_config_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = find_config_file_from(temp_dir.path().to_path_buf());
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_parse_config_with_name_and_interpreter() {
        let yaml = r#"
name: my-app
usage: My application
interpreter: [bash, -c]
tasks:
  hello:
    run: echo "hello"
"#;
        let config = parse_config(yaml, None).unwrap();
        assert_eq!(config.name.as_deref(), Some("my-app"));
        assert_eq!(config.usage.as_deref(), Some("My application"));
        assert_eq!(
            config.interpreter,
            Some(vec!["bash".to_string(), "-c".to_string()])
        );
    }

    #[test]
    fn test_include_task() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("tasks")).unwrap();
        fs::write(
            temp_dir.path().join("tasks/lint.yml"),
            "usage: Lint the code\nrun: cargo clippy\n",
        )
        .unwrap();

        let config_path = temp_dir.path().join("moan.yml");
        fs::write(
            &config_path,
            "tasks:\n  build:\n  lint:\n    include: tasks/lint.yml\n",
        )
        .unwrap();

        let config = parse_config_file(&config_path).unwrap();
        assert_eq!(config.task_names(), vec!["build", "lint"]);
        let lint = config.task("lint").unwrap();
        assert_eq!(lint.usage.as_deref(), Some("Lint the code"));
        assert_eq!(lint.run.len(), 1);
    }

    #[test]
    fn test_include_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("moan.yml");
        fs::write(&config_path, "tasks:\n  lint:\n    include: missing.yml\n").unwrap();

        let result = parse_config_file(&config_path);
        assert!(matches!(
            result,
            Err(MoanError::Config(ConfigError::IncludeFile { .. }))
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = parse_config("tasks: [unclosed", None);
        assert!(matches!(result, Err(MoanError::Yaml(_))));
    }
}

//! Moanfile validation
//!
//! Checks what can be checked without running anything. Missing dependencies and
//! cycles are reported by the scheduler when the graph is actually walked.

use crate::config::types::{Command, Config, Task};
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashSet;

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    if let Some(interpreter) = &config.interpreter {
        if interpreter.is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter must name at least one program".to_string(),
            ));
        }
    }

    let mut file_sets = HashSet::new();
    for (id, patterns) in &config.file_sets {
        validate_name("file set", id)?;
        if patterns.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "File set '{}' has no patterns",
                id
            )));
        }
        file_sets.insert(id.as_str());
    }

    for (name, task) in &config.tasks {
        validate_task(name, task, &file_sets)?;
    }

    Ok(())
}

fn validate_name(kind: &str, name: &str) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{} name cannot be empty", kind)));
    }
    Ok(())
}

/// Validate a single task against the declared file sets
pub fn validate_task(name: &str, task: &Task, file_sets: &HashSet<&str>) -> ConfigResult<()> {
    validate_name("Task", name)?;

    for dep in &task.deps {
        if dep.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Task '{}' has an empty dependency name",
                name
            )));
        }
    }

    for command in &task.run {
        let exec = match command {
            Command::Simple(exec) => exec,
            Command::Complex(detail) => &detail.exec,
        };
        if exec.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Task '{}' has an empty command",
                name
            )));
        }
    }

    for file_set in &task.clean {
        if !file_sets.contains(file_set.as_str()) {
            return Err(ConfigError::UnknownFileSet {
                task: name.to_string(),
                file_set: file_set.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        let config = parse(
            r#"
file-sets:
  outputs: target/**
tasks:
  build:
    run: cargo build
  clean:
    clean: outputs
  all:
    deps: [build, clean]
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_unknown_file_set() {
        let config = parse(
            r#"
tasks:
  clean:
    clean: outputs
"#,
        );
        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(ConfigError::UnknownFileSet { task, file_set }) if task == "clean" && file_set == "outputs"
        ));
    }

    #[test]
    fn test_missing_dependency_left_to_scheduler() {
        let config = parse(
            r#"
tasks:
  a:
    deps: [nowhere]
  b:
    deps: [b]
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_names_rejected() {
        let config = parse(
            r#"
tasks:
  "":
    run: echo
"#,
        );
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid(_))
        ));

        let config = parse(
            r#"
tasks:
  a:
    deps: [""]
"#,
        );
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_command_rejected() {
        let config = parse(
            r#"
tasks:
  a:
    run: ["  "]
"#,
        );
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_interpreter_rejected() {
        let config = parse(
            r#"
interpreter: []
tasks:
  a:
    run: echo
"#,
        );
        assert!(validate_config(&config).is_err());
    }
}

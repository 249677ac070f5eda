//! Core configuration types
//!
//! This module defines the data structures that represent a moan.yml file. Maps whose
//! order matters (tasks, file sets, config values) are kept as ordered lists of pairs.

use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name (optional)
    #[serde(default)]
    pub name: Option<String>,

    /// Project usage description (optional)
    #[serde(default)]
    pub usage: Option<String>,

    /// Interpreter prefix for commands (e.g., ["bash", "-c"])
    #[serde(default)]
    pub interpreter: Option<Vec<String>>,

    /// Shared values, usable as `${key}` in commands and patterns
    #[serde(default, deserialize_with = "deserialize_vars")]
    pub config: Vec<(String, String)>,

    /// Named groups of glob patterns
    #[serde(
        rename = "file-sets",
        default,
        deserialize_with = "deserialize_file_sets"
    )]
    pub file_sets: Vec<(String, Vec<String>)>,

    /// Tasks in declaration order
    #[serde(default, deserialize_with = "deserialize_tasks")]
    pub tasks: Vec<(String, Task)>,
}

impl Config {
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|(task_name, _)| task_name == name)
            .map(|(_, task)| task)
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn file_set(&self, id: &str) -> Option<&[String]> {
        self.file_sets
            .iter()
            .find(|(set_id, _)| set_id == id)
            .map(|(_, patterns)| patterns.as_slice())
    }
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Task {
    /// One-line summary shown by `--list`
    #[serde(default)]
    pub usage: Option<String>,

    /// Longer description
    #[serde(default)]
    pub description: Option<String>,

    /// Tasks that must run first
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub deps: Vec<String>,

    /// Commands to execute, in order
    #[serde(default, deserialize_with = "deserialize_commands")]
    pub run: Vec<Command>,

    /// File sets to delete after the commands ran
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub clean: Vec<String>,

    /// Don't echo commands
    #[serde(default)]
    pub quiet: bool,

    /// Load the task definition from another file
    #[serde(default)]
    pub include: Option<String>,
}

impl Task {
    /// True if running the task would do nothing
    pub fn is_empty(&self) -> bool {
        self.run.is_empty() && self.clean.is_empty()
    }
}

/// A command to execute
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Simple string command
    Simple(String),

    /// Complex command with additional options
    Complex(CommandDetail),
}

/// Detailed command specification
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandDetail {
    /// The command to execute
    pub exec: String,

    /// What to print when running (defaults to exec)
    #[serde(default)]
    pub print: Option<String>,

    /// Don't echo this command
    #[serde(default)]
    pub quiet: bool,

    /// Working directory, relative to the moanfile
    #[serde(default)]
    pub dir: Option<String>,
}

fn entries<E: Error>(value: Value, what: &str) -> Result<Vec<(String, Value)>, E> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Mapping(map) => map
            .into_iter()
            .map(|(key, value)| match scalar_to_string(key) {
                Some(key) => Ok((key, value)),
                None => Err(E::custom(format!("{} names must be strings", what))),
            })
            .collect(),
        _ => Err(E::custom(format!("{} must be a mapping", what))),
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_entry<T: DeserializeOwned, E: Error>(name: &str, value: Value) -> Result<T, E> {
    T::deserialize(value).map_err(|e| E::custom(format!("{}: {}", name, e)))
}

/// Config values: scalars become strings
fn deserialize_vars<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    entries::<D::Error>(value, "config")?
        .into_iter()
        .map(|(key, value)| match scalar_to_string(value) {
            Some(value) => Ok((key, value)),
            None => Err(D::Error::custom(format!(
                "config value '{}' must be a string, number, or boolean",
                key
            ))),
        })
        .collect()
}

/// File sets: each a single pattern or a list of patterns
fn deserialize_file_sets<'de, D>(deserializer: D) -> Result<Vec<(String, Vec<String>)>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    entries::<D::Error>(value, "file set")?
        .into_iter()
        .map(|(id, value)| {
            let patterns = string_list::<D::Error>(value)
                .map_err(|e| D::Error::custom(format!("{}: {}", id, e)))?;
            Ok((id, patterns))
        })
        .collect()
}

/// Tasks, keeping declaration order. An empty task body is allowed.
fn deserialize_tasks<'de, D>(deserializer: D) -> Result<Vec<(String, Task)>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    entries::<D::Error>(value, "task")?
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::Null => Value::Mapping(Mapping::new()),
                other => other,
            };
            let task = parse_entry::<Task, D::Error>(&name, value)?;
            Ok((name, task))
        })
        .collect()
}

fn string_list<E: Error>(value: Value) -> Result<Vec<String>, E> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s]),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| {
                scalar_to_string(item).ok_or_else(|| E::custom("list items must be strings"))
            })
            .collect(),
        _ => Err(E::custom("expected a string or a list of strings")),
    }
}

/// Custom deserializer for values that may be a single string or a list
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    string_list(value)
}

/// Custom deserializer for commands that handles both single values and arrays
fn deserialize_commands<'de, D>(deserializer: D) -> Result<Vec<Command>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    match value {
        // Single string or complex command
        Value::String(s) => Ok(vec![Command::Simple(s)]),
        Value::Mapping(_) => {
            let cmd = Command::deserialize(value).map_err(D::Error::custom)?;
            Ok(vec![cmd])
        }
        // Array of commands
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| Command::deserialize(item).map_err(D::Error::custom))
            .collect(),
        // Null or not present
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("run must be a string, object, or array")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_simple_config() {
        let yaml = r#"
tasks:
  hello:
    usage: Say hello
    run: echo "hello"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tasks.len(), 1);
        let task = config.task("hello").unwrap();
        assert_eq!(task.usage.as_deref(), Some("Say hello"));
        assert_eq!(task.run, vec![Command::Simple("echo \"hello\"".to_string())]);
    }

    #[test]
    fn test_tasks_keep_declaration_order() {
        let yaml = r#"
tasks:
  zeta:
  alpha:
    deps: zeta
  mid:
    deps: [alpha, zeta]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.task_names(), vec!["zeta", "alpha", "mid"]);
        assert!(config.task("zeta").unwrap().is_empty());
        assert_eq!(config.task("alpha").unwrap().deps, vec!["zeta"]);
        assert_eq!(config.task("mid").unwrap().deps, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_deserialize_complex_commands() {
        let yaml = r#"
tasks:
  deploy:
    quiet: true
    run:
      - cargo build --release
      - exec: ./deploy.sh ${target}
        print: deploying
        dir: scripts
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let task = config.task("deploy").unwrap();
        assert!(task.quiet);
        assert_eq!(task.run.len(), 2);
        match &task.run[1] {
            Command::Complex(detail) => {
                assert_eq!(detail.exec, "./deploy.sh ${target}");
                assert_eq!(detail.print.as_deref(), Some("deploying"));
                assert_eq!(detail.dir.as_deref(), Some("scripts"));
                assert!(!detail.quiet);
            }
            other => panic!("expected complex command, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_config_and_file_sets() {
        let yaml = r#"
config:
  out: target
  jobs: 4
  release: true
file-sets:
  outputs: ${out}/**
  sources:
    - src/**/*.rs
    - "!src/generated/**"
tasks:
  clean:
    clean: outputs
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.config,
            vec![
                ("out".to_string(), "target".to_string()),
                ("jobs".to_string(), "4".to_string()),
                ("release".to_string(), "true".to_string()),
            ]
        );
        assert_eq!(config.file_set("outputs").unwrap(), ["${out}/**"]);
        assert_eq!(
            config.file_set("sources").unwrap(),
            ["src/**/*.rs", "!src/generated/**"]
        );
        assert_eq!(config.task("clean").unwrap().clean, vec!["outputs"]);
    }

    #[test]
    fn test_reject_unknown_task_field() {
        let yaml = r#"
tasks:
  broken:
    runn: echo typo
"#;
        let result: Result<Config, _> = serde_yaml::from_str(yaml);
        let error = result.unwrap_err().to_string();
        assert!(error.contains("broken"), "unexpected error: {}", error);
    }

    #[test]
    fn test_reject_nested_config_value() {
        let yaml = r#"
config:
  nested:
    key: value
"#;
        let result: Result<Config, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }
}

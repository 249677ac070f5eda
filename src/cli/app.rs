//! Main CLI application

use crate::config::{parse_config_auto, parse_config_file, register_config, Config};
use crate::error::{EngineError, MoanError};
use crate::runner::{CommandContext, Scheduler, TaskEvent};
use crate::ui::{BuildReport, BuildStatus, Logger, Verbosity};
use crate::utils::plural;
use crate::VERSION;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command line options
#[derive(Debug, Clone)]
pub struct Options {
    pub tasks: Vec<String>,
    pub file: Option<PathBuf>,
    pub force: bool,
    pub list: bool,
    pub color: bool,
    pub stack: bool,
    pub debug: bool,
    pub verbosity: Verbosity,
    pub completions: Option<Shell>,
}

impl Options {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Options {
            tasks: matches
                .get_many::<String>("tasks")
                .map(|tasks| tasks.cloned().collect())
                .unwrap_or_default(),
            file: matches.get_one::<PathBuf>("file").cloned(),
            force: matches.get_flag("force"),
            list: matches.get_flag("list"),
            color: !matches.get_flag("no-color"),
            stack: matches.get_flag("stack"),
            debug: matches.get_flag("debug"),
            verbosity: get_verbosity(matches),
            completions: matches.get_one::<Shell>("completions").copied(),
        }
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("moan")
        .version(VERSION)
        .about("Runs tasks and their dependencies, each exactly once")
        .arg(
            Arg::new("tasks")
                .value_name("TASKS")
                .help("Tasks to run (default: \"default\")")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Print debug output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Path to the moanfile")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .help("Keep going after a task fails")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List the available tasks")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stack")
                .long("stack")
                .help("Print the full error chain of failed tasks")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .help("Print a shell completion script")
                .value_parser(value_parser!(Shell)),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("debug") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "moan=debug" } else { "moan=error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed when running in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Load the moanfile from `file`, or find it by walking up from the current directory
pub fn load_config(file: Option<&Path>) -> Result<(Config, PathBuf), MoanError> {
    match file {
        Some(path) => Ok((parse_config_file(path)?, path.to_path_buf())),
        None => parse_config_auto(),
    }
}

/// One line per task: name padded to a column, then its usage
pub fn format_task_list(config: &Config) -> Vec<String> {
    let width = config
        .tasks
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);

    config
        .tasks
        .iter()
        .map(|(name, task)| {
            let usage = task.usage.as_deref().unwrap_or_default();
            format!("  {:width$}  {}", name, usage, width = width)
                .trim_end()
                .to_string()
        })
        .collect()
}

fn print_task_list(config: &Config, logger: &Logger) {
    if let Some(name) = &config.name {
        logger.banner(name);
    }
    if let Some(usage) = &config.usage {
        logger.writeln(usage);
    }
    logger.writeln("Tasks:");
    for line in format_task_list(config) {
        logger.writeln(&line);
    }
}

/// Print task lifecycle events as they happen
fn report_events(scheduler: &mut Scheduler, logger: &Logger, show_stack: bool) {
    let logger = logger.clone();
    scheduler.on_event(move |event| match event {
        TaskEvent::Start { .. } => logger.writeln("Running..."),
        TaskEvent::Done { .. } => logger.ok(""),
        TaskEvent::Error { error, .. } => {
            if show_stack {
                logger.error(&format!("{:?}", error.cause()));
            } else {
                logger.error(&error.to_string());
            }
        }
    });
}

/// Run the application with the process arguments
pub fn run() -> Result<(), MoanError> {
    run_from(std::env::args_os())
}

/// Run the application with the given arguments
pub fn run_from<I, T>(args: I) -> Result<(), MoanError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_command().get_matches_from(args);
    let options = Options::from_matches(&matches);

    if let Some(shell) = options.completions {
        clap_complete::generate(shell, &mut build_command(), "moan", &mut io::stdout());
        return Ok(());
    }

    init_tracing(options.debug);
    if !options.color {
        colored::control::set_override(false);
    }

    let (config, config_path) = load_config(options.file.as_deref())?;
    debug!("loaded moanfile {}", config_path.display());

    let logger = Logger::new(options.verbosity, options.color);
    if options.list {
        print_task_list(&config, &logger);
        return Ok(());
    }

    execute(&config, &config_path, &options, logger)
}

fn execute(
    config: &Config,
    config_path: &Path,
    options: &Options,
    logger: Logger,
) -> Result<(), MoanError> {
    let mut scheduler = Scheduler::new().with_force(options.force);
    let task_logger = logger.clone().with_stack(scheduler.stack());

    let working_dir = match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let ctx = CommandContext::new()
        .with_working_dir(working_dir)
        .with_logger(task_logger.clone());

    register_config(config, &mut scheduler, ctx)?;
    report_events(&mut scheduler, &task_logger, options.stack);

    let report = BuildReport::start();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(scheduler.run(options.tasks.clone()));

    if let Err(error) = &result {
        match error {
            // Already printed by the event listener
            EngineError::Task(_) => {}
            other => logger.error(&other.to_string()),
        }
    }
    let failed: Vec<&str> = scheduler
        .registry()
        .iter()
        .filter(|task| task.is_failed())
        .map(|task| task.name())
        .collect();
    if !failed.is_empty() {
        logger.warn(&format!(
            "{} task{} failed: {}",
            failed.len(),
            plural(failed.len()),
            failed.join(", ")
        ));
        if !options.stack {
            logger.writeln("Run with --stack to see the full error chain.");
        }
    }
    if let Err(error) = &result {
        if !error.is_structural() {
            logger.writeln("Run with --force to keep going after a task fails.");
        }
        logger.error("Aborted!");
    }

    let status = BuildStatus::new(result.is_err(), scheduler.has_failures());
    report.print(&logger, status);

    match result {
        Ok(value) => {
            debug!(?value, "run finished");
            Ok(())
        }
        Err(_) => Err(MoanError::BuildFailed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_default_options() {
        let matches = build_command().get_matches_from(vec!["moan"]);
        let options = Options::from_matches(&matches);
        assert!(options.tasks.is_empty());
        assert!(options.file.is_none());
        assert!(!options.force);
        assert!(options.color);
        assert_eq!(options.verbosity, Verbosity::Normal);
    }

    #[test]
    fn test_options_with_tasks_and_flags() {
        let matches = build_command().get_matches_from(vec![
            "moan", "--force", "--stack", "-f", "build.yml", "lint", "test",
        ]);
        let options = Options::from_matches(&matches);
        assert_eq!(options.tasks, vec!["lint", "test"]);
        assert_eq!(options.file, Some(PathBuf::from("build.yml")));
        assert!(options.force);
        assert!(options.stack);
    }

    #[test]
    fn test_verbosity_flags() {
        let verbosity = |args: Vec<&str>| {
            let matches = build_command().get_matches_from(args);
            get_verbosity(&matches)
        };
        assert_eq!(verbosity(vec!["moan", "-q"]), Verbosity::Quiet);
        assert_eq!(verbosity(vec!["moan", "-s", "-q"]), Verbosity::Silent);
        assert_eq!(verbosity(vec!["moan", "--debug"]), Verbosity::Verbose);
    }

    #[test]
    fn test_completions_shell() {
        let matches = build_command().get_matches_from(vec!["moan", "--completions", "bash"]);
        let options = Options::from_matches(&matches);
        assert_eq!(options.completions, Some(Shell::Bash));
    }

    #[test]
    fn test_format_task_list() {
        let config = parse_config(
            r#"
tasks:
  build:
    usage: Compile everything
  test-all:
    usage: Run the test suite
  default:
"#,
            None,
        )
        .unwrap();

        assert_eq!(
            format_task_list(&config),
            vec![
                "  build     Compile everything",
                "  test-all  Run the test suite",
                "  default",
            ]
        );
    }

    #[test]
    fn test_command_is_valid() {
        build_command().debug_assert();
    }
}

//! Turning a parsed moanfile into scheduler tasks

use crate::config::types::Config;
use crate::error::MoanError;
use crate::fileset::FileSet;
use crate::runner::{
    execute_commands, interpolate_list, Command, CommandContext, Scheduler, TaskBody,
};
use tracing::debug;

/// Register the moanfile's config values, file sets and tasks with `scheduler`.
///
/// Commands run in `ctx.working_dir`, which is also the base directory of every file
/// set. The moanfile's `interpreter` and `config` values are applied on top of `ctx`.
pub fn register_config(
    config: &Config,
    scheduler: &mut Scheduler,
    mut ctx: CommandContext,
) -> Result<(), MoanError> {
    if let Some(interpreter) = &config.interpreter {
        ctx = ctx.with_interpreter(interpreter.clone());
    }

    for (key, value) in &config.config {
        ctx.set_var(key.clone(), value.clone());
        scheduler.set_config(key.as_str(), value.as_str());
    }

    for (id, patterns) in &config.file_sets {
        let patterns = interpolate_list(patterns, &ctx.vars)?;
        scheduler.file_set(id.as_str(), FileSet::new(patterns, &ctx.working_dir));
    }

    for (name, task) in &config.tasks {
        if task.is_empty() {
            scheduler.register(name.as_str(), task.deps.as_slice(), None::<TaskBody>);
            continue;
        }

        let commands: Vec<Command> = task
            .run
            .iter()
            .cloned()
            .map(Command::from_config)
            .map(|cmd| if task.quiet { cmd.quieted() } else { cmd })
            .collect();

        let clean = task
            .clean
            .iter()
            .map(|id| scheduler.get_file_set(id).cloned())
            .collect::<Result<Vec<FileSet>, _>>()?;

        debug!(
            task = %name,
            commands = commands.len(),
            clean = clean.len(),
            "registering moanfile task"
        );

        let ctx = ctx.clone();
        let body = TaskBody::future(move || async move {
            execute_commands(&commands, &ctx).await?;
            for file_set in &clean {
                for path in file_set.delete()? {
                    ctx.logger.debug(&format!("Deleted {}", path.display()));
                }
            }
            Ok::<_, anyhow::Error>(())
        });

        scheduler.register(name.as_str(), task.deps.as_slice(), body);
    }

    Ok(())
}

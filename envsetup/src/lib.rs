//! envsetup CLI library — argument parsing and dispatch for the `envsetup` binary.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use envsetup_core::config::SetupConfig;
use envsetup_env::command::{CommandRunner, SystemRunner};
use envsetup_env::manifest::Manifest;
use envsetup_env::{SetupError, SetupRunner, Step};

/// Run the CLI — parses args, builds the config and runs (or plans) the setup.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    envsetup_core::observability::init_tracing();

    let config = SetupConfig::from_env().with_cli_overrides(cli.env_dir, cli.manifest, cli.python);
    let runner = SetupRunner::new(config, SystemRunner);

    if cli.dry_run {
        return print_plan(&runner);
    }
    let report = runner.run()?;
    report.log_summary();
    Ok(())
}

fn print_plan<R: CommandRunner>(runner: &SetupRunner<R>) -> Result<()> {
    for planned in runner.plan()? {
        println!(
            "[{}/{}] {}: {}",
            planned.step.index(),
            Step::ALL.len(),
            planned.step,
            planned.action
        );
    }

    println!();
    match Manifest::load(&runner.config().manifest) {
        Ok(manifest) => {
            println!(
                "{} ({} requirement(s))",
                manifest.path.display(),
                manifest.requirements().count()
            );
            for req in manifest.requirements() {
                println!("  • {}", req.raw);
            }
            for opt in manifest.options() {
                println!("    {}", opt);
            }
        }
        Err(e) => println!("⚠ {}", e),
    }
    Ok(())
}

/// Process exit status for an error returned by [`run_cli`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<SetupError>()
        .map_or(1, SetupError::exit_code)
}

/// False when the failing tool already printed its own diagnostics.
pub fn should_report(err: &anyhow::Error) -> bool {
    !err.downcast_ref::<SetupError>()
        .is_some_and(SetupError::reported_by_tool)
}

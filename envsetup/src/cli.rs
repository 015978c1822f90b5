use clap::Parser;
use std::path::PathBuf;

/// envsetup - create a Python virtual environment and install its requirements
///
/// With no arguments: `python3.11 -m venv venv`, then upgrade pip and
/// `pip install -r requirements.txt` inside it.
#[derive(Parser, Debug)]
#[command(name = "envsetup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Environment directory (default: from env or "venv")
    #[arg(long, value_name = "DIR")]
    pub env_dir: Option<PathBuf>,

    /// Requirements manifest (default: from env or "requirements.txt")
    #[arg(short = 'r', long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Interpreter version (e.g. 3.11) or path to an interpreter (default: from env or 3.11)
    #[arg(long, value_name = "VERSION|PATH")]
    pub python: Option<String>,

    /// Print the commands that would run, without running them
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

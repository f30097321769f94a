use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "pylet")]
#[clap(version, about = "Single-shot Python script execution with stdout capture")]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub global_opts: GlobalOpts,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Verbosity level (-v, -vv, -vvv)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[clap(long, global = true, default_value = "json", value_enum)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Handle one invocation event (JSON) and print the response envelope
    Invoke(InvokeArgs),

    /// Execute a script given inline or from a file
    Exec(ExecArgs),

    /// Read newline-delimited JSON events from stdin, one response per line
    Serve,
}

#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Event file path (reads stdin if omitted)
    #[clap(long, short = 'e')]
    pub event: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Script source text
    pub script: Option<String>,

    /// Read the script from a file instead
    #[clap(long, short = 'f', conflicts_with = "script")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

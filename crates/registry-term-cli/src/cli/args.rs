use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "regterm",
    version,
    about = "Decode, validate and normalize package registry terms"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode untrusted term bytes and print them if they pass validation
    Decode(DecodeArgs),
    /// Normalize a JSON document and encode it as a term
    Encode(EncodeArgs),
    /// Print the user-facing lines for a registry error response
    Report(ReportArgs),
}

/// Options shared by the commands that read registry bytes.
#[derive(Args, Debug, Clone, Default)]
pub struct GuardArgs {
    /// Accept atoms outside the known atom table
    #[arg(long)]
    pub allow_new_atoms: bool,

    /// Maximum nesting depth (default: REGISTRY_TERM_MAX_DEPTH or 128)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Refuse the zlib-compressed envelope
    #[arg(long)]
    pub no_compressed: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input file, `-` or absent for stdin
    pub input: Option<PathBuf>,

    /// Print JSON instead of the inspect form
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub guard: GuardArgs,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// JSON input file, `-` or absent for stdin
    pub input: Option<PathBuf>,

    /// Encode maps as lists of {key, value} pairs
    #[arg(long)]
    pub pairs: bool,

    /// Compress the output
    #[arg(long)]
    pub compress: bool,

    /// Zlib level used with --compress
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: u32,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// HTTP status of the response
    #[arg(long)]
    pub status: u16,

    /// Response body file, `-` or absent for stdin; may be empty
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub guard: GuardArgs,
}

//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// makegen - generate build files from C/C++ include dependencies
#[derive(Parser)]
#[command(name = "makegen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a build file for a set of sources
    #[command(visible_alias = "generate")]
    Gen(GenArgs),

    /// Print the resolved include dependencies of each source
    Deps(DepsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Inputs shared by every command that resolves a project.
#[derive(Args, Clone)]
pub struct ProjectArgs {
    /// Source files, directories or glob patterns
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Include search path (repeatable, searched in order)
    #[arg(short = 'I', value_name = "DIR")]
    pub include: Vec<PathBuf>,

    /// System include path; headers found only here are not tracked
    #[arg(long, value_name = "DIR")]
    pub isystem: Vec<PathBuf>,

    /// Also scan headers found on system include paths
    #[arg(long)]
    pub follow_system: bool,

    /// Config file to use instead of .makegen/config.toml
    #[arg(long, env = "MAKEGEN_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct GenArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output artifact name (a `.a` or `.so` name selects a library)
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<String>,

    /// Project name
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Output format: make, cmake or automake
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Library to link (repeatable, order preserved)
    #[arg(short = 'l', value_name = "LIB")]
    pub libs: Vec<String>,

    /// Preprocessor definition, NAME or NAME=VALUE (repeatable)
    #[arg(short = 'D', value_name = "DEF")]
    pub defines: Vec<String>,

    /// Library search path (repeatable)
    #[arg(short = 'L', value_name = "DIR")]
    pub lib_dirs: Vec<PathBuf>,

    /// Extra C compiler flags
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub cflags: Option<String>,

    /// Extra C++ compiler flags
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub cxxflags: Option<String>,

    /// Extra linker flags
    #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
    pub ldflags: Option<String>,

    /// Build a static library
    #[arg(long, conflicts_with = "shared")]
    pub lib: bool,

    /// Build a shared library
    #[arg(long)]
    pub shared: bool,

    /// Directory to write the build files to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Print the generated files instead of writing them
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = DepsFormatArg::Text)]
    pub format: DepsFormatArg,

    /// Also list includes that matched no file
    #[arg(long)]
    pub unresolved: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DepsFormatArg {
    Text,
    Json,
    Dot,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// sdkgraph - Discover C# project graphs and resolve their assemblies
#[derive(Parser)]
#[command(name = "sdkgraph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Run as if started in <DIR>
    #[arg(short = 'C', long = "directory", value_name = "DIR", global = true)]
    pub directory: Option<PathBuf>,

    /// Local NuGet package cache
    #[arg(long, value_name = "DIR", global = true)]
    pub packages: Option<PathBuf>,

    /// dotnet installation root
    #[arg(long, value_name = "DIR", global = true)]
    pub dotnet_root: Option<PathBuf>,

    /// mono library root
    #[arg(long, value_name = "DIR", global = true)]
    pub mono_root: Option<PathBuf>,

    /// Force the runtime flavor (mono or dotnet)
    #[arg(long, value_name = "FLAVOR", global = true)]
    pub runtime: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the project graph and print every project's inputs
    Resolve(ResolveArgs),

    /// Display the project reference tree
    Tree(TreeArgs),

    /// List each project's package closure
    Packages(PackagesArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Root project directory (defaults to the working directory)
    pub project: Option<PathBuf>,

    /// Emit the graph as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Project to show the tree for (defaults to the root project)
    pub project: Option<String>,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Expand projects already shown
    #[arg(long)]
    pub duplicates: bool,
}

#[derive(Args)]
pub struct PackagesArgs {
    /// Only show this project
    #[arg(short, long)]
    pub project: Option<String>,

    /// Only show packages pulled in transitively
    #[arg(long)]
    pub transitive: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

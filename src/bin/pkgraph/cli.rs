//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// pkgraph - package descriptor graphs for native C/C++ libraries
#[derive(Parser)]
#[command(name = "pkgraph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to Packages.toml (defaults to config, then search from cwd)
    #[arg(long, global = true, env = "PKGRAPH_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List declared packages
    List,

    /// Display the sub-package tree of a package
    Tree(TreeArgs),

    /// Show every target of a package graph with its dependency edges
    Targets(TargetsArgs),

    /// Write the package graph as JSON
    Emit(EmitArgs),
}

#[derive(Args)]
pub struct TreeArgs {
    /// Package to show the tree for (defaults to the only root package)
    pub package: Option<String>,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Expand packages already shown instead of marking them (*)
    #[arg(long)]
    pub duplicates: bool,
}

#[derive(Args)]
pub struct TargetsArgs {
    /// Package to show targets for (defaults to the only root package)
    pub package: Option<String>,
}

#[derive(Args)]
pub struct EmitArgs {
    /// Package to emit (defaults to the only root package)
    pub package: Option<String>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

//! `pkgraph emit` command

use anyhow::{Context, Result};

use crate::cli::EmitArgs;
use pkgraph::ops::{describe_package, render_json};
use pkgraph::GlobalContext;

pub fn execute(args: EmitArgs, ctx: &GlobalContext) -> Result<()> {
    let graph = describe_package(ctx, args.package.as_deref())?;
    let json = render_json(&graph)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", json))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

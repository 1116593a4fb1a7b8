//! `pkgraph targets` command

use anyhow::Result;

use crate::cli::TargetsArgs;
use pkgraph::ops::{describe_package, render_targets};
use pkgraph::GlobalContext;

pub fn execute(args: TargetsArgs, ctx: &GlobalContext) -> Result<()> {
    let graph = describe_package(ctx, args.package.as_deref())?;
    print!("{}", render_targets(&graph));
    Ok(())
}

//! `pkgraph tree` command

use anyhow::Result;

use crate::cli::TreeArgs;
use pkgraph::ops::{describe_package, render_tree, TreeOptions};
use pkgraph::GlobalContext;

pub fn execute(args: TreeArgs, ctx: &GlobalContext) -> Result<()> {
    let graph = describe_package(ctx, args.package.as_deref())?;

    let opts = TreeOptions {
        max_depth: args.depth.or(ctx.config().output.tree_depth),
        show_duplicates: args.duplicates,
    };
    print!("{}", render_tree(&graph, &opts));

    Ok(())
}

//! `pkgraph list` command

use anyhow::Result;

use pkgraph::ops::{load_registry, render_list};
use pkgraph::GlobalContext;

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let registry = load_registry(ctx)?;
    print!("{}", render_list(&registry));
    Ok(())
}

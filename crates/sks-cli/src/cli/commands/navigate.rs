//! Navigation check handler.

use anyhow::{Result, bail};
use sks_core::context::Context;

/// Prints `allow` or `redirect <path>`; denials are reported on stderr by the notifier.
pub async fn open(ctx: &Context, path: &str) -> Result<()> {
    let Some(decision) = ctx.navigate(path).await else {
        bail!("Unknown path: {path}");
    };

    match decision.redirect_target() {
        None => println!("allow"),
        Some(view) => println!("redirect {}", view.pattern()),
    }
    Ok(())
}

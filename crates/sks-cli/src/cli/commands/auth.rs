//! Auth command handlers.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context as _, Result, bail};
use sks_core::config::paths;
use sks_core::context::Context;
use sks_core::session::{SyncOutcome, UserProfile, mask_token};

pub async fn login(ctx: &Context, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };
    if password.is_empty() {
        bail!("Password cannot be empty");
    }

    let data = ctx
        .api
        .auth()
        .login(username, &password)
        .await
        .context("login failed")?;
    let profile = ctx
        .session
        .login(&data)
        .context("server returned an unusable login payload")?;

    println!("✓ Logged in as {} ({})", profile.username, profile.role);
    println!("  Session saved to: {}", paths::storage_path().display());
    Ok(())
}

fn read_password() -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("Password: ");
        io::stderr().flush()?;
    }
    let mut input = String::new();
    stdin
        .lock()
        .read_line(&mut input)
        .context("read password from stdin")?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

pub fn logout(ctx: &Context) {
    if ctx.session.logout() {
        println!("✓ Logged out");
        println!("  Session removed from: {}", paths::storage_path().display());
    } else {
        println!("Not logged in (no session found).");
    }
}

pub fn status(ctx: &Context) {
    let state = ctx.session.snapshot();
    if state.token.is_empty() {
        println!("Not logged in.");
        return;
    }

    println!("Logged in (token: {})", mask_token(&state.token));
    match state.profile {
        Some(profile) => print_profile(&profile),
        None => println!("  No profile stored; run `sks whoami` to fetch it."),
    }
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    if !ctx.session.is_logged_in() {
        bail!("Not logged in. Run `sks login` first.");
    }

    match ctx.session.sync_user_info(ctx.api.as_ref()).await {
        SyncOutcome::Updated(profile) => {
            print_profile(&profile);
            Ok(())
        }
        SyncOutcome::Unchanged => bail!("Session ended while fetching the current user"),
        SyncOutcome::InvalidPayload => {
            bail!("Server returned a malformed current user payload")
        }
        SyncOutcome::Failed(err) => Err(err).context("fetch current user"),
    }
}

fn print_profile(profile: &UserProfile) {
    println!("  User:   {} (id {})", profile.username, profile.user_id);
    println!("  Role:   {}", profile.role);
    if let Some(ref_id) = &profile.ref_id {
        println!("  Ref ID: {ref_id}");
    }
}

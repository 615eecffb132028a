//! register / login / logout / whoami

use anyhow::{Context, Result};
use taskboard_client::TokenStore;
use tracing::info;

use super::{print_profile, Ctx};

pub async fn register<S: TokenStore>(
    ctx: Ctx<'_, S>,
    name: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    let registered = ctx.client.register(name, email, password).await?;
    info!(user_id = %registered.id, "Registered");

    println!("Registered {} ({})", registered.email, registered.id);
    println!("Run `taskboard login --email {}` to sign in.", registered.email);
    Ok(())
}

pub async fn login<S: TokenStore>(ctx: Ctx<'_, S>, email: &str, password: &str) -> Result<()> {
    let token = ctx.client.login(email, password).await?;
    let claims = ctx
        .session
        .login(token)
        .context("Server returned an unreadable token")?;

    println!("Logged in as {} ({})", claims.email, claims.role);
    if let Some(expires_at) = claims.expires_at() {
        println!("Session expires {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

pub fn logout<S: TokenStore>(ctx: Ctx<'_, S>) -> Result<()> {
    let was_logged_in = ctx.session.claims().is_some();
    ctx.session.logout()?;

    if was_logged_in {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

/// Asks the server when a live session exists, otherwise reports what the
/// stored token says
pub async fn whoami<S: TokenStore>(ctx: Ctx<'_, S>) -> Result<()> {
    if ctx.session.is_authenticated() {
        let profile = ctx.client.me(ctx.session).await?;
        print_profile(&profile);
        return Ok(());
    }

    match ctx.session.claims() {
        Some(claims) => println!(
            "Session for {} expired; run `taskboard login` again.",
            claims.email
        ),
        None => println!("Not logged in."),
    }
    Ok(())
}

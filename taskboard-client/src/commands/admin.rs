//! admin users / tasks

use anyhow::{bail, Result};
use taskboard_client::TokenStore;

use super::{print_tasks, Ctx};

/// Skips the round trip when the session already says the answer is 403
fn ensure_admin<S: TokenStore>(ctx: &Ctx<'_, S>) -> Result<()> {
    if ctx.session.is_authenticated() && !ctx.session.is_admin() {
        bail!("This command requires an admin account");
    }
    Ok(())
}

pub async fn users<S: TokenStore>(ctx: Ctx<'_, S>) -> Result<()> {
    ensure_admin(&ctx)?;
    let directory = ctx.client.list_users(ctx.session).await?;

    println!(
        "{} users ({} admin, {} regular)",
        directory.total, directory.admins, directory.users
    );
    for user in &directory.items {
        println!("{}  {:<5}  {} <{}>", user.id, user.role, user.name, user.email);
    }
    Ok(())
}

pub async fn tasks<S: TokenStore>(ctx: Ctx<'_, S>) -> Result<()> {
    ensure_admin(&ctx)?;
    let tasks = ctx.client.list_all_tasks(ctx.session).await?;
    print_tasks(&tasks);
    Ok(())
}

//! tasks list / add / status / rm / stats

use anyhow::Result;
use taskboard_client::{types::TaskStatus, TokenStore};
use uuid::Uuid;

use super::{print_task, print_tasks, Ctx};

pub async fn list<S: TokenStore>(ctx: Ctx<'_, S>) -> Result<()> {
    let tasks = ctx.client.list_tasks(ctx.session).await?;
    print_tasks(&tasks);
    Ok(())
}

pub async fn show<S: TokenStore>(ctx: Ctx<'_, S>, id: Uuid) -> Result<()> {
    let task = ctx.client.get_task(ctx.session, id).await?;
    print_task(&task);
    Ok(())
}

pub async fn add<S: TokenStore>(
    ctx: Ctx<'_, S>,
    title: &str,
    description: Option<&str>,
) -> Result<()> {
    let task = ctx.client.create_task(ctx.session, title, description).await?;
    println!("Created task {}", task.id);
    Ok(())
}

pub async fn set_status<S: TokenStore>(ctx: Ctx<'_, S>, id: Uuid, status: TaskStatus) -> Result<()> {
    let task = ctx.client.update_status(ctx.session, id, status).await?;
    println!("{} is now {}", task.title, task.status);
    Ok(())
}

pub async fn remove<S: TokenStore>(ctx: Ctx<'_, S>, id: Uuid) -> Result<()> {
    ctx.client.delete_task(ctx.session, id).await?;
    println!("Deleted task {}", id);
    Ok(())
}

pub async fn stats<S: TokenStore>(ctx: Ctx<'_, S>) -> Result<()> {
    let stats = ctx.client.task_stats(ctx.session).await?;
    println!("total:        {}", stats.total);
    println!("pending:      {}", stats.pending);
    println!("in progress:  {}", stats.in_progress);
    println!("completed:    {}", stats.completed);
    Ok(())
}

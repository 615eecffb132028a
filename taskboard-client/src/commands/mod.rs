//! Command implementations for the `taskboard` CLI
//!
//! Every command receives the [`ApiClient`] and the [`Session`] explicitly.

pub mod admin;
pub mod auth;
pub mod tasks;

use taskboard_client::{
    types::{Task, UserProfile},
    ApiClient, Session, TokenStore,
};

/// Shared handles threaded through every command
pub struct Ctx<'a, S: TokenStore> {
    pub client: &'a ApiClient,
    pub session: &'a mut Session<S>,
}

pub(crate) fn print_task(task: &Task) {
    println!(
        "{}  {:<11}  {}  (created {})",
        task.id,
        task.status,
        task.title,
        task.created_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(description) = &task.description {
        println!("    {}", description);
    }
}

pub(crate) fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }
    for task in tasks {
        print_task(task);
    }
}

pub(crate) fn print_profile(profile: &UserProfile) {
    println!("{} <{}>", profile.name, profile.email);
    println!("  id:      {}", profile.id);
    println!("  role:    {}", profile.role);
    println!("  joined:  {}", profile.created_at.format("%Y-%m-%d"));
}

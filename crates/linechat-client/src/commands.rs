//! Built-in commands for the terminal prompt.
//!
//! Each command resolves its target through the session cache; `open` and a
//! successful `send` record the thread in the navigation history, which
//! `say` uses as the implicit target.

use std::sync::Arc;

use async_trait::async_trait;

use linechat_core::error::{ClientError, Result};
use linechat_core::types::Thread;

use crate::dispatch::Command;
use crate::session::Session;

/// All built-in commands, `help` included.
pub fn built_in() -> Vec<Arc<dyn Command>> {
    let commands: Vec<Arc<dyn Command>> = vec![
        Arc::new(WhoamiCommand),
        Arc::new(ContactsCommand),
        Arc::new(ThreadsCommand),
        Arc::new(OpenCommand),
        Arc::new(SendCommand),
        Arc::new(SayCommand),
        Arc::new(RecentCommand),
    ];
    let help = HelpCommand::for_commands(&commands);

    let mut all = commands;
    all.push(Arc::new(help));
    all
}

fn display_name(thread: &Thread) -> &str {
    if thread.name.is_empty() {
        &thread.id
    } else {
        &thread.name
    }
}

// ─────────────────────────────────────────────
// help
// ─────────────────────────────────────────────

/// Lists every command with its usage line.
pub struct HelpCommand {
    text: String,
}

impl HelpCommand {
    /// Build the help text from the commands it will describe.
    pub fn for_commands(commands: &[Arc<dyn Command>]) -> Self {
        let mut lines: Vec<String> = commands
            .iter()
            .map(|c| format!("  {}", c.usage()))
            .collect();
        lines.push("  help".to_string());
        lines.sort();
        lines.insert(0, "commands:".to_string());
        lines.push("  exit | quit".to_string());
        HelpCommand {
            text: lines.join("\n"),
        }
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }
    fn usage(&self) -> &'static str {
        "help"
    }
    async fn run(&self, _session: &Session, _args: &str) -> Result<String> {
        Ok(self.text.clone())
    }
}

// ─────────────────────────────────────────────
// whoami
// ─────────────────────────────────────────────

/// Shows the authenticated user.
pub struct WhoamiCommand;

#[async_trait]
impl Command for WhoamiCommand {
    fn name(&self) -> &'static str {
        "whoami"
    }
    fn usage(&self) -> &'static str {
        "whoami"
    }
    async fn run(&self, session: &Session, _args: &str) -> Result<String> {
        let user = session.user();
        Ok(format!("{} ({})", user.name, user.id))
    }
}

// ─────────────────────────────────────────────
// contacts / threads
// ─────────────────────────────────────────────

/// Lists contacts known from the login-time bulk fetch.
pub struct ContactsCommand;

#[async_trait]
impl Command for ContactsCommand {
    fn name(&self) -> &'static str {
        "contacts"
    }
    fn usage(&self) -> &'static str {
        "contacts"
    }
    async fn run(&self, session: &Session, _args: &str) -> Result<String> {
        let me = session.user().id.clone();
        let lines: Vec<String> = session
            .cache()
            .users()
            .into_iter()
            .filter(|u| u.id != me)
            .map(|u| format!("  {} ({})", u.name, u.id))
            .collect();
        if lines.is_empty() {
            return Ok("no contacts known".to_string());
        }
        Ok(lines.join("\n"))
    }
}

/// Lists cached threads.
pub struct ThreadsCommand;

#[async_trait]
impl Command for ThreadsCommand {
    fn name(&self) -> &'static str {
        "threads"
    }
    fn usage(&self) -> &'static str {
        "threads"
    }
    async fn run(&self, session: &Session, _args: &str) -> Result<String> {
        let lines: Vec<String> = session
            .cache()
            .threads()
            .iter()
            .map(|t| format!("  {} ({})", display_name(t), t.id))
            .collect();
        if lines.is_empty() {
            return Ok("no threads cached".to_string());
        }
        Ok(lines.join("\n"))
    }
}

// ─────────────────────────────────────────────
// open / send / say
// ─────────────────────────────────────────────

/// Resolves a thread by name prefix and makes it the current thread.
pub struct OpenCommand;

#[async_trait]
impl Command for OpenCommand {
    fn name(&self) -> &'static str {
        "open"
    }
    fn usage(&self) -> &'static str {
        "open <name>"
    }
    async fn run(&self, session: &Session, args: &str) -> Result<String> {
        if args.is_empty() {
            return Err(ClientError::command("usage: open <name>"));
        }
        let thread = session.cache().thread_by_name(args)?;
        session.visit_thread(&thread.id);
        Ok(format!("now talking to {}", display_name(&thread)))
    }
}

/// Sends a message to a thread named by prefix.
pub struct SendCommand;

#[async_trait]
impl Command for SendCommand {
    fn name(&self) -> &'static str {
        "send"
    }
    fn usage(&self) -> &'static str {
        "send <name> <text>"
    }
    async fn run(&self, session: &Session, args: &str) -> Result<String> {
        let (query, text) = match args.split_once(char::is_whitespace) {
            Some((query, text)) if !text.trim().is_empty() => (query, text.trim_start()),
            _ => return Err(ClientError::command("usage: send <name> <text>")),
        };
        let thread = session.cache().thread_by_name(query)?;
        deliver(session, &thread, text).await
    }
}

/// Sends a message to the current thread.
pub struct SayCommand;

#[async_trait]
impl Command for SayCommand {
    fn name(&self) -> &'static str {
        "say"
    }
    fn usage(&self) -> &'static str {
        "say <text>"
    }
    async fn run(&self, session: &Session, args: &str) -> Result<String> {
        if args.is_empty() {
            return Err(ClientError::command("usage: say <text>"));
        }
        let thread_id = session.current_thread().ok_or_else(|| {
            ClientError::command("no current thread (use 'open <name>' first)")
        })?;
        let thread = session.cache().thread_by_id(&thread_id).await?;
        deliver(session, &thread, args).await
    }
}

/// Send through the backend and record the navigation.
async fn deliver(session: &Session, thread: &Thread, text: &str) -> Result<String> {
    session
        .backend()
        .send_message(&thread.id, text)
        .await
        .map_err(|e| ClientError::command(format!("send failed: {e}")))?;
    session.visit_thread(&thread.id);
    Ok(format!("→ {}: {}", display_name(thread), text))
}

// ─────────────────────────────────────────────
// recent
// ─────────────────────────────────────────────

/// Shows the navigation history, most recent last.
pub struct RecentCommand;

#[async_trait]
impl Command for RecentCommand {
    fn name(&self) -> &'static str {
        "recent"
    }
    fn usage(&self) -> &'static str {
        "recent"
    }
    async fn run(&self, session: &Session, _args: &str) -> Result<String> {
        let visited = session.visited_threads();
        if visited.is_empty() {
            return Ok("no threads visited yet".to_string());
        }
        let lines: Vec<String> = visited
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let name = session
                    .cache()
                    .cached_thread(id)
                    .map(|t| display_name(&t).to_string())
                    .unwrap_or_else(|| id.clone());
                format!("  {}. {}", i + 1, name)
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

//! Command dispatch — one line of terminal input in, one executed action
//! out, with failures contained at this boundary.
//!
//! Input is split on whitespace with no quoting or escaping; the first token
//! selects the handler, which receives the remaining original text verbatim.
//! Whitespace-only lines produce nothing. Unknown names produce a
//! diagnostic. Handler errors are rendered, never re-thrown: control always
//! returns to the read-eval loop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use linechat_core::error::Result;

use crate::commands;
use crate::session::Session;

/// A named command handler.
#[async_trait]
pub trait Command: Send + Sync {
    /// The name typed as the first token of a line.
    fn name(&self) -> &'static str;

    /// One-line usage string shown by `help`.
    fn usage(&self) -> &'static str;

    /// Execute with the raw argument text (everything after the name,
    /// verbatim). Returns the line to display.
    async fn run(&self, session: &Session, args: &str) -> Result<String>;
}

/// Registry mapping command names to handlers.
pub struct CommandDispatcher {
    commands: HashMap<&'static str, Arc<dyn Command>>,
}

impl CommandDispatcher {
    /// Create an empty registry.
    pub fn new() -> Self {
        CommandDispatcher {
            commands: HashMap::new(),
        }
    }

    /// The registry with every built-in command installed.
    pub fn with_default_commands() -> Self {
        let mut dispatcher = CommandDispatcher::new();
        for command in commands::built_in() {
            dispatcher.register(command);
        }
        dispatcher
    }

    /// Register a command. Overwrites any previous handler with the same
    /// name.
    pub fn register(&mut self, command: Arc<dyn Command>) {
        debug!(command = command.name(), "registered command");
        self.commands.insert(command.name(), command);
    }

    /// Whether a command name is registered.
    pub fn has(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Names of all registered commands, sorted.
    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch one line of input. `None` means nothing to display (blank
    /// input); otherwise the returned line is shown whether the handler
    /// succeeded or failed.
    pub async fn dispatch(&self, session: &Session, line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let name = trimmed.split_whitespace().next()?;
        let args = trimmed[name.len()..].trim_start();

        let command = match self.commands.get(name) {
            Some(command) => command.clone(),
            None => return Some(format!("invalid command '{name}' (try 'help')")),
        };

        match command.run(session, args).await {
            Ok(output) => Some(output),
            Err(e) => {
                warn!(command = name, error = %e, "command failed");
                Some(e.to_string())
            }
        }
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linechat_backend::memory::MemoryBackend;
    use linechat_backend::token_store::SessionTokenStore;
    use linechat_core::error::ClientError;
    use linechat_core::types::{Credentials, Secret};
    use tempfile::tempdir;

    use crate::session::SessionManager;

    async fn test_session() -> Session {
        let dir = tempdir().unwrap();
        let backend = MemoryBackend::new("user-0")
            .with_profile("You")
            .with_contact("user-1", Some("Alice"), None)
            .with_thread("user-1", Some("Alice"));
        let manager = SessionManager::new(
            Arc::new(backend),
            SessionTokenStore::new(Some(dir.path().join("token.json"))),
        );
        let creds = Credentials::Login {
            identifier: "me".into(),
            secret: Secret::new("pw"),
        };
        manager.authenticate(&creds).await.unwrap()
    }

    struct EchoCommand;

    #[async_trait]
    impl Command for EchoCommand {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn usage(&self) -> &'static str {
            "echo <text>"
        }
        async fn run(&self, _session: &Session, args: &str) -> Result<String> {
            Ok(format!("echo: {args}"))
        }
    }

    struct FailCommand;

    #[async_trait]
    impl Command for FailCommand {
        fn name(&self) -> &'static str {
            "fail"
        }
        fn usage(&self) -> &'static str {
            "fail"
        }
        async fn run(&self, _session: &Session, _args: &str) -> Result<String> {
            Err(ClientError::command("intentional failure"))
        }
    }

    #[tokio::test]
    async fn test_blank_input_produces_nothing() {
        let session = test_session().await;
        let dispatcher = CommandDispatcher::with_default_commands();

        assert!(dispatcher.dispatch(&session, "").await.is_none());
        assert!(dispatcher.dispatch(&session, "   \t  ").await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_command_is_a_diagnostic() {
        let session = test_session().await;
        let dispatcher = CommandDispatcher::with_default_commands();

        let output = dispatcher.dispatch(&session, "/nonexistent").await.unwrap();
        assert!(output.contains("invalid command"));
        assert!(output.contains("/nonexistent"));
    }

    #[tokio::test]
    async fn test_args_passed_verbatim() {
        let session = test_session().await;
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.register(Arc::new(EchoCommand));

        // Inner whitespace survives; tokens are not re-joined.
        let output = dispatcher
            .dispatch(&session, "echo hello   spaced  world")
            .await
            .unwrap();
        assert_eq!(output, "echo: hello   spaced  world");
    }

    #[tokio::test]
    async fn test_handler_error_recovered() {
        let session = test_session().await;
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.register(Arc::new(FailCommand));

        let output = dispatcher.dispatch(&session, "fail").await.unwrap();
        assert_eq!(output, "intentional failure");

        // The dispatcher is still usable afterwards.
        assert!(dispatcher.dispatch(&session, "").await.is_none());
    }

    #[tokio::test]
    async fn test_default_registry_contents() {
        let dispatcher = CommandDispatcher::with_default_commands();
        for name in ["help", "whoami", "contacts", "threads", "open", "send", "say", "recent"] {
            assert!(dispatcher.has(name), "missing built-in command '{name}'");
        }
    }

    #[tokio::test]
    async fn test_register_overwrites() {
        let mut dispatcher = CommandDispatcher::new();
        dispatcher.register(Arc::new(EchoCommand));
        dispatcher.register(Arc::new(EchoCommand));
        assert_eq!(dispatcher.command_names(), vec!["echo"]);
    }
}

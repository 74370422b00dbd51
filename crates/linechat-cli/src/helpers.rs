//! Shared CLI helpers — banner and formatting.

use colored::Colorize;

use linechat_core::types::User;

/// Print the banner shown at REPL start.
pub fn print_banner(user: &User) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Linechat".cyan().bold(), version.dimmed());
    println!("{}", format!("logged in as {}", user.name).dimmed());
    println!("{}", "Type 'help' for commands, or 'exit' to quit.".dimmed());
    println!();
}

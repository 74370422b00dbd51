//! Path resolution for the Linechat data directory.

use std::path::PathBuf;

/// The Linechat data directory (e.g. `~/.linechat/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".linechat")
}

/// Default location of the persisted session token.
pub fn get_token_path() -> PathBuf {
    get_data_path().join("session_token.json")
}

/// Default location of the REPL history file.
pub fn get_history_path() -> PathBuf {
    get_data_path().join("history").join("cli_history")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_path_under_home() {
        let path = get_data_path();
        assert!(path.to_string_lossy().contains(".linechat"));
    }

    #[test]
    fn test_token_path_is_json() {
        let path = get_token_path();
        assert!(path.to_string_lossy().ends_with("session_token.json"));
    }

    #[test]
    fn test_history_path_under_data_dir() {
        let path = get_history_path();
        assert!(path.to_string_lossy().contains(".linechat"));
        assert!(path.to_string_lossy().contains("cli_history"));
    }
}

use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("typeshot"))
        } else {
            ProjectDirs::from("", "", "typeshot").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    /// Default location of the SQLite leaderboard
    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("leaderboard.db"))
    }

    /// Where the terminal client writes its log, away from the alternate screen
    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("typeshot.log"))
    }
}

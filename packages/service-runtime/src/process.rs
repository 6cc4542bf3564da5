//! Process lifecycle: `.env` discovery and termination signals.

use std::fmt;
use std::path::{Path, PathBuf};

/// Load the nearest `.env`, searching the working directory and its
/// ancestors. Returns the file that was loaded, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let path = find_dotenv(&cwd)?;
    dotenvy::from_path(&path).ok()?;
    Some(path)
}

fn find_dotenv(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".env"))
        .find(|candidate| candidate.is_file())
}

/// Signal that asked the process to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT / Ctrl+C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Wait for SIGINT or SIGTERM.
///
/// # Errors
///
/// Fails when a signal handler cannot be installed.
pub async fn shutdown_signal() -> std::io::Result<ShutdownSignal> {
    let terminate = terminate();
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| ShutdownSignal::Interrupt),
        result = terminate => result.map(|()| ShutdownSignal::Terminate),
    }
}

#[cfg(unix)]
async fn terminate() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn terminate() -> std::io::Result<()> {
    std::future::pending().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("service-runtime-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn dotenv_found_in_ancestor() {
        let root = scratch_dir("ancestor");
        let nested = root.join("apps").join("order-service");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(".env"), "REDIS_PORT=6380\n").unwrap();

        assert_eq!(find_dotenv(&nested), Some(root.join(".env")));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn nearest_dotenv_wins() {
        let root = scratch_dir("nearest");
        let nested = root.join("apps");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(".env"), "A=1\n").unwrap();
        std::fs::write(nested.join(".env"), "A=2\n").unwrap();

        assert_eq!(find_dotenv(&nested), Some(nested.join(".env")));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn directory_named_dotenv_is_skipped() {
        let root = scratch_dir("dir");
        let nested = root.join("inner");
        std::fs::create_dir_all(nested.join(".env")).unwrap();
        std::fs::write(root.join(".env"), "A=1\n").unwrap();

        assert_eq!(find_dotenv(&nested), Some(root.join(".env")));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn signal_names() {
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(ShutdownSignal::Terminate.to_string(), "SIGTERM");
    }
}

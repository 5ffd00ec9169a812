#![warn(clippy::all, clippy::pedantic)]
use std::{env, fs::File, path::PathBuf, sync::Mutex};
use tracing_subscriber::EnvFilter;

const LOG_FILE_VAR: &str = "WILO_LOG";

/// Takes nothing.
/// Installs a file-backed tracing subscriber when `WILO_LOG` names a file.
/// The terminal itself is never a log target since it is the display.
///
/// Returns the log path when logging was enabled.
pub fn init() -> Option<PathBuf> {
    let path = PathBuf::from(env::var_os(LOG_FILE_VAR)?);
    let file = match File::create(&path) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("wilo: cannot open log file {}: {error}", path.display());
            return None;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    if installed.is_err() {
        return None;
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_off_without_a_usable_log_file() {
        env::remove_var(LOG_FILE_VAR);
        assert_eq!(init(), None);

        let dir = tempfile::tempdir().unwrap();
        env::set_var(LOG_FILE_VAR, dir.path().join("missing").join("wilo.log"));
        assert_eq!(init(), None);
        env::remove_var(LOG_FILE_VAR);
    }
}

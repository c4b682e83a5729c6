use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::SourceError;

const DEFAULT_PROGRAM: &str = "last";

/// External program that renders binary login databases (`wtmp`, `btmp`) as
/// text, invoked as `<program> <args...> <file>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionHelper {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Default for SessionHelper {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            args: vec!["-f".to_string()],
        }
    }
}

impl SessionHelper {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Run the helper against `file` and return its standard output.
    pub async fn read_history(&self, file: &Path) -> Result<String, SourceError> {
        debug!(
            "running {} {:?} {}",
            self.program.display(),
            self.args,
            file.display()
        );
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(file)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let output = command
            .output()
            .await
            .map_err(|source| SourceError::HelperSpawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(SourceError::HelperFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn stdout_of_the_helper_is_returned() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wtmp");
        std::fs::write(&path, "carlos   pts/1\n").expect("write");

        let helper = SessionHelper::new("cat", Vec::new());
        let text = helper.read_history(&path).await.expect("cat runs");
        assert_eq!(text, "carlos   pts/1\n");
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_with_stderr() {
        let dir = tempfile::tempdir().expect("tempdir");
        let helper = SessionHelper::new("cat", Vec::new());
        let err = helper
            .read_history(&dir.path().join("missing"))
            .await
            .expect_err("cat fails");
        match err {
            SourceError::HelperFailed { stderr, .. } => assert!(stderr.contains("missing")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unknown_program_fails_to_spawn() {
        let helper = SessionHelper::new("/nonexistent/logsift-helper", Vec::new());
        let err = helper
            .read_history(Path::new("/var/log/wtmp"))
            .await
            .expect_err("no such program");
        assert!(matches!(err, SourceError::HelperSpawn { .. }));
    }

    #[test]
    fn default_helper_is_last_with_file_flag() {
        assert_eq!(
            SessionHelper::default(),
            SessionHelper::new("last", vec!["-f".to_string()])
        );
    }
}

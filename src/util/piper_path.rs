use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum PiperCommand {
    Executable(PathBuf),
    PythonModule,
    Custom(Vec<String>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PiperPathError {
    #[error("piper command line is empty")]
    EmptyCommand,
    #[error("piper was not found in {0} and python is not on the PATH")]
    PythonUnavailable(PathBuf),
}

/// Locate Piper: an explicit command line wins, then the bundled executable
/// under `runtime_dir/piper`, then `python -m piper`.
pub fn resolve(runtime_dir: &Path, command_line: Option<&str>) -> Result<PiperCommand, PiperPathError> {
    if let Some(raw) = command_line {
        let parts: Vec<String> = shlex::Shlex::new(raw).collect();
        if parts.is_empty() {
            return Err(PiperPathError::EmptyCommand);
        }
        return Ok(PiperCommand::Custom(parts));
    }

    let candidate =
        runtime_dir
            .join("piper")
            .join(if cfg!(windows) { "piper.exe" } else { "piper" });
    if candidate.exists() {
        return Ok(PiperCommand::Executable(candidate));
    }

    if which::which("python").is_ok() {
        return Ok(PiperCommand::PythonModule);
    }

    Err(PiperPathError::PythonUnavailable(runtime_dir.to_path_buf()))
}

pub fn command_to_args(cmd: &PiperCommand) -> (OsString, Vec<OsString>) {
    match cmd {
        PiperCommand::Executable(path) => (path.as_os_str().into(), vec![]),
        PiperCommand::PythonModule => (
            OsString::from("python"),
            vec!["-m".into(), "piper".into()],
        ),
        PiperCommand::Custom(parts) => {
            let mut parts = parts.iter().map(OsString::from);
            let program = parts.next().unwrap_or_default();
            (program, parts.collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn explicit_command_line_is_split() {
        let cmd = resolve(Path::new("runtime"), Some("python3 '/tmp/mock piper.py' --quiet")).unwrap();
        assert_eq!(
            cmd,
            PiperCommand::Custom(vec![
                "python3".into(),
                "/tmp/mock piper.py".into(),
                "--quiet".into()
            ])
        );
        let (program, args) = command_to_args(&cmd);
        assert_eq!(program, OsString::from("python3"));
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn blank_command_line_is_rejected() {
        assert_eq!(
            resolve(Path::new("runtime"), Some("   ")),
            Err(PiperPathError::EmptyCommand)
        );
    }

    #[test]
    fn prefers_bundled_executable() {
        let temp = assert_fs::TempDir::new().unwrap();
        let exe = temp
            .child("piper")
            .child(if cfg!(windows) { "piper.exe" } else { "piper" });
        exe.touch().unwrap();
        let cmd = resolve(temp.path(), None).unwrap();
        assert_eq!(cmd, PiperCommand::Executable(exe.path().to_path_buf()));
    }
}

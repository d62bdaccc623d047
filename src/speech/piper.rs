use std::{
    ffi::OsString,
    fs,
    io::Write,
    path::PathBuf,
    process::{Command, Stdio},
    time::Instant,
};

use log::{debug, error, warn};
use thiserror::Error;

use crate::util::piper_path::{command_to_args, PiperCommand};

#[derive(Debug, Error)]
pub enum SynthesisFailure {
    #[error("voice model not found at {0}")]
    VoiceNotFound(PathBuf),
    #[error("failed to spawn Piper process: {0}")]
    SpawnFailure(#[from] std::io::Error),
    #[error("Piper exited with status {status}: {stderr}")]
    PiperFailure { status: i32, stderr: String },
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub model_path: PathBuf,
    pub output_path: PathBuf,
}

#[derive(Debug, PartialEq)]
pub struct SynthesisOutput {
    pub output_path: PathBuf,
    pub duration_ms: u128,
    pub stderr: Option<String>,
}

/// Renders text to a WAV file.
pub trait Synthesizer: Send {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisOutput, SynthesisFailure>;
}

/// Runs Piper as a subprocess, feeding the text on stdin.
#[derive(Debug, Clone)]
pub struct PiperSynthesizer {
    program: OsString,
    args: Vec<OsString>,
}

impl PiperSynthesizer {
    pub fn new(command: &PiperCommand) -> Self {
        let (program, args) = command_to_args(command);
        Self { program, args }
    }

    fn build_command(&self, request: &SynthesisRequest) -> Result<Command, SynthesisFailure> {
        if !request.model_path.exists() {
            return Err(SynthesisFailure::VoiceNotFound(request.model_path.clone()));
        }

        if let Some(parent) = request
            .output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|err| {
                SynthesisFailure::Other(format!(
                    "Unable to create output directory {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.arg("--model");
        command.arg(&request.model_path);
        command.arg("--output_file");
        command.arg(&request.output_path);
        Ok(command)
    }
}

impl Synthesizer for PiperSynthesizer {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisOutput, SynthesisFailure> {
        let start = Instant::now();
        let mut command = self.build_command(request)?;
        debug!(
            "Invoking Piper for model {} writing to {}",
            request.model_path.display(),
            request.output_path.display()
        );
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;
        {
            let stdin = child
                .stdin
                .as_mut()
                .ok_or_else(|| SynthesisFailure::Other("Failed to access Piper stdin".into()))?;
            stdin
                .write_all(request.text.as_bytes())
                .map_err(|err| SynthesisFailure::Other(err.to_string()))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|err| SynthesisFailure::Other(err.to_string()))?;
        let duration_ms = start.elapsed().as_millis();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            let status = output.status.code().unwrap_or_default();
            error!("Piper command exited with status {status}: {stderr}");
            return Err(SynthesisFailure::PiperFailure { status, stderr });
        }

        if !request.output_path.exists() {
            warn!(
                "Piper succeeded but the expected output {:?} was not created",
                request.output_path
            );
        }

        Ok(SynthesisOutput {
            output_path: request.output_path.clone(),
            duration_ms,
            stderr: if stderr.is_empty() { None } else { Some(stderr) },
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use assert_fs::TempDir;

    fn mock_piper(temp: &TempDir, script: &str) -> PiperSynthesizer {
        let script_path = temp.path().join("mock_piper.sh");
        fs::write(&script_path, script).unwrap();
        PiperSynthesizer::new(&PiperCommand::Custom(vec![
            "sh".into(),
            script_path.to_string_lossy().into_owned(),
        ]))
    }

    fn make_request(temp: &TempDir, model_exists: bool) -> SynthesisRequest {
        let model_path = temp.path().join("voice.onnx");
        if model_exists {
            fs::write(&model_path, b"voice").unwrap();
        }
        SynthesisRequest {
            text: "Boil water".into(),
            model_path,
            output_path: temp.path().join("out").join("step.wav"),
        }
    }

    #[test]
    fn synthesizes_text_from_stdin() {
        let temp = TempDir::new().unwrap();
        let piper = mock_piper(
            &temp,
            r#"while [ "$#" -gt 0 ]; do
  if [ "$1" = "--output_file" ]; then out="$2"; fi
  shift
done
printf 'WAV:' > "$out"
cat >> "$out"
"#,
        );
        let output = piper.synthesize(&make_request(&temp, true)).unwrap();
        assert_eq!(output.output_path, temp.path().join("out").join("step.wav"));
        assert_eq!(output.stderr, None);
        let written = fs::read_to_string(&output.output_path).unwrap();
        assert_eq!(written, "WAV:Boil water");
    }

    #[test]
    fn missing_voice_is_reported() {
        let temp = TempDir::new().unwrap();
        let piper = mock_piper(&temp, "exit 0\n");
        let error = piper.synthesize(&make_request(&temp, false)).unwrap_err();
        assert!(matches!(error, SynthesisFailure::VoiceNotFound(_)));
    }

    #[test]
    fn process_failure_keeps_stderr() {
        let temp = TempDir::new().unwrap();
        let piper = mock_piper(&temp, "cat > /dev/null\necho boom >&2\nexit 2\n");
        match piper.synthesize(&make_request(&temp, true)).unwrap_err() {
            SynthesisFailure::PiperFailure { status, stderr } => {
                assert_eq!(status, 2);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected failure: {other}"),
        }
    }
}

//! Inference invoker
//!
//! Runs the external classifier entry point as an opaque process:
//! - Discovers the repository root from the working directory
//! - Resolves relative model/input paths against that root
//! - Captures combined stdout+stderr into `<root>/logs/last_inference_output.txt`
//! - Streams the capture back out and reports the exit code
//!
//! The output of the classifier is never parsed; the exit code is the only
//! structured signal.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::constants::{
    CAPTURE_DIR, CAPTURE_FILE_NAME, DEFAULT_INPUT_PATH, DEFAULT_MODEL_PATH, DEFAULT_PYTHON,
    INFERENCE_SCRIPT, SCRIPTS_DIR, SPAWN_FAILURE_EXIT_CODE,
};

/// One inference invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    /// ONNX model, relative to the repository root unless absolute
    pub model: PathBuf,
    /// Feature-vector CSV, relative to the repository root unless absolute
    pub input: PathBuf,
    /// Optional feature list forwarded as `--features`
    pub features: Option<PathBuf>,
    /// Interpreter used to launch the entry point
    pub python: String,
}

impl Default for InferenceRequest {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_PATH),
            input: PathBuf::from(DEFAULT_INPUT_PATH),
            features: None,
            python: DEFAULT_PYTHON.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("Failed to create capture directory {path}: {source}")]
    CaptureDir { path: PathBuf, source: io::Error },
    #[error("Failed to open capture file {path}: {source}")]
    CaptureFile { path: PathBuf, source: io::Error },
}

/// Anything the daemon can ask for one inference exit code
pub trait Inference {
    fn invoke(&mut self) -> i32;
}

/// Walk from `start` towards the filesystem root looking for the entry point
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(SCRIPTS_DIR).join(INFERENCE_SCRIPT).exists())
        .map(Path::to_path_buf)
}

/// Relative paths hang off `root`; absolute ones are kept as-is
pub fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[derive(Debug, Clone)]
pub struct Invoker {
    root: PathBuf,
}

impl Invoker {
    /// Discover the root from `start`, falling back to `start` itself
    pub fn from_dir(start: &Path) -> Self {
        let root = match find_repo_root(start) {
            Some(root) => root,
            None => {
                log::debug!(
                    "no {}/{} above {}, using it as root",
                    SCRIPTS_DIR,
                    INFERENCE_SCRIPT,
                    start.display()
                );
                start.to_path_buf()
            }
        };
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn script_path(&self) -> PathBuf {
        self.root.join(SCRIPTS_DIR).join(INFERENCE_SCRIPT)
    }

    pub fn capture_path(&self) -> PathBuf {
        self.root.join(CAPTURE_DIR).join(CAPTURE_FILE_NAME)
    }

    /// Argument vector after the interpreter
    pub fn arguments(&self, request: &InferenceRequest) -> Vec<PathBuf> {
        let mut args = vec![
            self.script_path(),
            PathBuf::from("--onnx"),
            resolve_against(&self.root, &request.model),
            PathBuf::from("--input"),
            resolve_against(&self.root, &request.input),
        ];
        if let Some(features) = &request.features {
            args.push(PathBuf::from("--features"));
            args.push(resolve_against(&self.root, features));
        }
        args
    }

    /// Literal command recorded on the first line of the capture file
    pub fn command_line(&self, request: &InferenceRequest) -> String {
        let mut line = format!("\"{}\"", request.python);
        for arg in self.arguments(request) {
            let arg = arg.to_string_lossy();
            if arg.starts_with("--") {
                line.push_str(&format!(" {}", arg));
            } else {
                line.push_str(&format!(" \"{}\"", arg));
            }
        }
        line
    }

    /// Run once, streaming the capture to stdout
    pub fn run(&self, request: &InferenceRequest) -> Result<i32, InvokeError> {
        let stdout = io::stdout();
        let mut sink = stdout.lock();
        self.run_to(request, &mut sink)
    }

    /// Run once, streaming the capture to `sink`
    pub fn run_to<W: Write>(
        &self,
        request: &InferenceRequest,
        sink: &mut W,
    ) -> Result<i32, InvokeError> {
        let capture = self.capture_path();
        let capture_dir = self.root.join(CAPTURE_DIR);
        fs::create_dir_all(&capture_dir).map_err(|source| InvokeError::CaptureDir {
            path: capture_dir.clone(),
            source,
        })?;

        let command_line = self.command_line(request);
        let open_err = |source: io::Error| InvokeError::CaptureFile {
            path: capture.clone(),
            source,
        };

        fs::write(&capture, format!("CMD: {}\n", command_line)).map_err(open_err)?;
        let child_out = OpenOptions::new().append(true).open(&capture).map_err(open_err)?;
        let child_err = child_out.try_clone().map_err(open_err)?;

        log::info!("running inference: {}", command_line);

        let spawned = Command::new(&request.python)
            .args(self.arguments(request))
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::from(child_out))
            .stderr(Stdio::from(child_err))
            .status();

        let code = match spawned {
            Ok(status) => exit_code(status),
            Err(e) => {
                log::warn!("failed to launch {}: {}", request.python, e);
                if let Ok(mut file) = OpenOptions::new().append(true).open(&capture) {
                    let _ = writeln!(file, "failed to launch {}: {}", request.python, e);
                }
                SPAWN_FAILURE_EXIT_CODE
            }
        };

        match fs::read(&capture) {
            Ok(bytes) => {
                let _ = sink.write_all(&bytes);
                let _ = writeln!(sink);
            }
            Err(_) => {
                let _ = writeln!(sink, "(no output captured)");
            }
        }
        let _ = sink.flush();

        Ok(code)
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Invoker bound to a fixed request, as the daemon uses it
pub struct BoundInvoker {
    invoker: Invoker,
    request: InferenceRequest,
}

impl BoundInvoker {
    pub fn new(invoker: Invoker, request: InferenceRequest) -> Self {
        Self { invoker, request }
    }
}

impl Inference for BoundInvoker {
    fn invoke(&mut self) -> i32 {
        match self.invoker.run(&self.request) {
            Ok(code) => code,
            Err(e) => {
                log::error!("{}", e);
                crate::constants::USAGE_EXIT_CODE
            }
        }
    }
}

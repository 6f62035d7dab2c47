//! CLI-based converter using an external astcenc binary

use super::traits::Converter;
use crate::config::{ConverterConfig, QualityMode};
use crate::error::ConvertError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

/// CLI-based converter using an external astcenc binary
///
/// Each call gets its own scratch directory holding the input blob and the decoded
/// image. The directory is removed when the call returns, whatever the outcome. The
/// process runs under a wall-clock timeout and is killed when it expires.
///
/// # Examples
///
/// ```no_run
/// use astc_dl::convert::{CliConverter, Converter};
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create with explicit path
/// let converter = CliConverter::new(PathBuf::from("/usr/local/bin/astcenc"));
///
/// // Or auto-discover from PATH
/// let converter = CliConverter::from_path()
///     .expect("astcenc not found in PATH");
///
/// let png = converter.convert(&std::fs::read("item_rgb.astc")?).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct CliConverter {
    binary_path: PathBuf,
    decode_flag: String,
    tile_size: String,
    quality: QualityMode,
    timeout: Duration,
    output_extension: String,
    temp_dir: Option<PathBuf>,
}

impl CliConverter {
    /// Create a converter with an explicit binary path and default parameters
    pub fn new(binary_path: PathBuf) -> Self {
        Self::with_config(binary_path, &ConverterConfig::default())
    }

    /// Attempt to find astcenc in PATH
    ///
    /// Uses the `which` crate to search for the `astcenc` binary in the system PATH.
    pub fn from_path() -> Option<Self> {
        which::which("astcenc").ok().map(Self::new)
    }

    /// Build from configuration
    ///
    /// Uses `binary_path` if set, otherwise searches PATH for `binary_name` when
    /// `search_path` is enabled. Returns `None` if no binary could be located.
    pub fn from_config(config: &ConverterConfig) -> Option<Self> {
        let binary_path = match &config.binary_path {
            Some(path) => path.clone(),
            None if config.search_path => which::which(&config.binary_name).ok()?,
            None => return None,
        };
        Some(Self::with_config(binary_path, config))
    }

    fn with_config(binary_path: PathBuf, config: &ConverterConfig) -> Self {
        Self {
            binary_path,
            decode_flag: config.decode_flag.clone(),
            tile_size: config.tile_size.clone(),
            quality: config.quality,
            timeout: config.timeout,
            output_extension: config.output_extension.clone(),
            temp_dir: config.temp_dir.clone(),
        }
    }

    /// Override the wall-clock limit per invocation
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the binary this converter runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn scratch_dir(&self) -> std::io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("astc-dl-");
        match &self.temp_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
    }

    fn tool_missing(&self) -> ConvertError {
        ConvertError::ToolMissing {
            path: self.binary_path.clone(),
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> ConvertError {
        match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                self.tool_missing()
            }
            _ => ConvertError::Io(format!(
                "failed to execute {}: {}",
                self.binary_path.display(),
                e
            )),
        }
    }
}

/// A regular file the current user may run. Spawning anything else fails with
/// `PermissionDenied`, which conversions report as a missing tool.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[async_trait]
impl Converter for CliConverter {
    async fn convert(&self, blob: &[u8]) -> Result<Vec<u8>, ConvertError> {
        // Dropped on every return path, which removes the directory
        let scratch = self
            .scratch_dir()
            .map_err(|e| ConvertError::Io(format!("failed to create scratch directory: {e}")))?;
        let input_path = scratch.path().join("input.astc");
        let output_path = scratch
            .path()
            .join(format!("output.{}", self.output_extension));

        tokio::fs::write(&input_path, blob)
            .await
            .map_err(|e| ConvertError::Io(format!("failed to write input: {e}")))?;

        let child = Command::new(&self.binary_path)
            .arg(&self.decode_flag)
            .arg(&input_path)
            .arg(&output_path)
            .arg(&self.tile_size)
            .arg(self.quality.as_arg())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // On timeout the child is dropped with the future and killed
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ConvertError::Io(format!(
                    "failed to wait for conversion tool: {e}"
                )));
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "conversion timed out, process killed");
                return Err(ConvertError::Timeout {
                    after: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(ConvertError::ToolError {
                exit_code: output.status.code(),
                stderr,
            });
        }

        let image = match tokio::fs::read(&output_path).await {
            Ok(bytes) if bytes.is_empty() => return Err(ConvertError::NoOutput),
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConvertError::NoOutput);
            }
            Err(e) => return Err(ConvertError::Io(format!("failed to read output: {e}"))),
        };

        debug!(
            input = blob.len(),
            output = image.len(),
            "converted blob"
        );
        Ok(image)
    }

    fn check_available(&self) -> Result<(), ConvertError> {
        if is_executable(&self.binary_path) || which::which(&self.binary_path).is_ok() {
            Ok(())
        } else {
            Err(self.tool_missing())
        }
    }

    fn output_extension(&self) -> &str {
        &self.output_extension
    }

    fn name(&self) -> &'static str {
        "cli-astcenc"
    }
}

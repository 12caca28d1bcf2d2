use crate::core::config::ClassificationConfig;
use crate::tools::traits::Classifier;
use crate::BoldChunkError;
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Environment variable that pins the classifier binary.
pub const BOLDIGGER_ENV: &str = "BOLDCHUNK_BOLDIGGER";

const BINARY_NAME: &str = "boldigger3";

/// Forward a child stream into the log, one line at a time.
/// `\r`-separated progress updates count as separate lines.
fn stream_output<R: Read + Send + 'static>(
    reader: R,
    prefix: &'static str,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let reader = BufReader::new(reader);
        for line in reader.split(b'\n') {
            let Ok(line) = line else { break };
            let text = String::from_utf8_lossy(&line);
            for piece in text.split('\r').map(str::trim_end).filter(|p| !p.is_empty()) {
                debug!("{}: {}", prefix, piece);
            }
        }
    })
}

/// BOLDigger3 command-line integration
pub struct Boldigger3 {
    binary_path: PathBuf,
}

impl Boldigger3 {
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Find the binary: `BOLDCHUNK_BOLDIGGER` first, then `explicit`
    /// (flag or config), then `PATH`.
    pub fn locate(explicit: Option<&Path>) -> Result<Self, BoldChunkError> {
        if let Some(from_env) = std::env::var_os(BOLDIGGER_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(PathBuf::from(from_env)));
        }
        if let Some(path) = explicit {
            return Ok(Self::new(path.to_path_buf()));
        }
        which::which(BINARY_NAME).map(Self::new).map_err(|_| {
            BoldChunkError::Tool(format!(
                "{} not found on PATH; set {} or pass --boldigger",
                BINARY_NAME, BOLDIGGER_ENV
            ))
        })
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// `boldigger3 identify <chunk> --db N --mode N --thresholds ... --workers N`
    pub fn identify_command(&self, chunk: &Path, config: &ClassificationConfig) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("identify")
            .arg(chunk)
            .arg("--db")
            .arg(config.database.to_string())
            .arg("--mode")
            .arg(config.mode.to_string())
            .arg("--thresholds")
            .args(config.thresholds.iter().map(|t| t.to_string()))
            .arg("--workers")
            .arg(config.workers.to_string());

        if let Some(dir) = chunk.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl Classifier for Boldigger3 {
    fn classify(&mut self, chunk: &Path, config: &ClassificationConfig) -> Result<()> {
        let mut cmd = self.identify_command(chunk, config);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        info!("Executing: {:?}", cmd);
        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}", self.binary_path.display()))?;

        let stdout_handle = child
            .stdout
            .take()
            .map(|out| stream_output(out, "boldigger3 [stdout]"));
        let stderr_handle = child
            .stderr
            .take()
            .map(|err| stream_output(err, "boldigger3 [stderr]"));

        let status = child.wait().context("Failed to wait for boldigger3")?;

        for handle in [stdout_handle, stderr_handle].into_iter().flatten() {
            handle.join().ok();
        }

        if !status.success() {
            anyhow::bail!("boldigger3 exited with {}", status);
        }
        Ok(())
    }

    fn verify_installation(&self) -> Result<()> {
        if self.binary_path.components().count() > 1 && !self.binary_path.exists() {
            anyhow::bail!("boldigger3 binary not found at {}", self.binary_path.display());
        }
        which::which(&self.binary_path)
            .with_context(|| format!("{} is not executable", self.binary_path.display()))?;
        Ok(())
    }

    fn version(&self) -> Result<String> {
        let output = Command::new(&self.binary_path)
            .arg("--version")
            .output()
            .context("Failed to run boldigger3")?;

        if !output.status.success() {
            anyhow::bail!("boldigger3 --version returned {}", output.status);
        }

        let mut version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            version = String::from_utf8_lossy(&output.stderr).trim().to_string();
        }
        if version.is_empty() {
            anyhow::bail!("boldigger3 --version printed nothing");
        }
        Ok(version)
    }

    fn name(&self) -> &str {
        BINARY_NAME
    }
}

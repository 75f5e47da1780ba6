//! Plain-text extraction for uploaded note files.
//!
//! PDFs go through `pdftotext` (poppler-utils), DOCX through `pandoc`; both read
//! from a temporary file. Plain text is decoded as UTF-8, replacing invalid bytes.

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;
use tokio::process::Command;
use thiserror::Error;
use tracing::debug;

const EXTRACTION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type")]
    Unsupported,
    #[error("Text extraction failed: {0}")]
    Tool(String),
    #[error("Text extraction failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Txt,
    Docx,
}

impl FileKind {
    /// Kind from the text after the last `.` of `filename`, ignoring case.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Txt),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Txt => ".txt",
            Self::Docx => ".docx",
        }
    }
}

pub async fn extract_text(filename: &str, data: &[u8]) -> Result<String, ExtractError> {
    let kind = FileKind::from_filename(filename).ok_or(ExtractError::Unsupported)?;
    debug!(filename, ?kind, size = data.len(), "Extracting text");

    match kind {
        FileKind::Txt => Ok(String::from_utf8_lossy(data).into_owned()),
        FileKind::Pdf => {
            let file = write_temp(kind, data)?;
            run_tool(Command::new("pdftotext").arg("-layout").arg(file.path()).arg("-")).await
        }
        FileKind::Docx => {
            let file = write_temp(kind, data)?;
            run_tool(
                Command::new("pandoc")
                    .arg(file.path())
                    .arg("--from=docx")
                    .arg("--to=plain")
                    .arg("--wrap=none"),
            )
            .await
        }
    }
}

fn write_temp(kind: FileKind, data: &[u8]) -> Result<NamedTempFile, ExtractError> {
    let mut file = tempfile::Builder::new().suffix(kind.suffix()).tempfile()?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file)
}

async fn run_tool(cmd: &mut Command) -> Result<String, ExtractError> {
    let output = tokio::time::timeout(Duration::from_secs(EXTRACTION_TIMEOUT_SECS), cmd.output())
        .await
        .map_err(|_| {
            ExtractError::Tool(format!("timed out after {EXTRACTION_TIMEOUT_SECS}s"))
        })??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractError::Tool(format!(
            "exit {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

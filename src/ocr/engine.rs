use anyhow::{anyhow, Result};
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

/// Environment variable overriding Tesseract discovery.
const TESSERACT_ENV: &str = "TESSERACT_CMD";

/// Runs Tesseract on a preprocessed grayscale image and returns the raw
/// multi-line transcript.
pub fn recognize_text(img: &GrayImage) -> Result<String> {
    let tesseract = find_tesseract_executable()?;

    // Tesseract reads from a file, so stage the image in a temp PNG.
    let temp_input = NamedTempFile::with_suffix(".png")?;
    img.save(temp_input.path())?;

    let output = Command::new(&tesseract)
        .arg(temp_input.path())
        .arg("stdout")
        .arg("-l")
        .arg("eng")
        .arg("--psm")
        .arg("6") // Uniform block of text, one username per visual line
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("Tesseract failed: {}", stderr));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Finds the Tesseract executable: env override first, then PATH.
pub fn find_tesseract_executable() -> Result<PathBuf> {
    if let Ok(cmd) = std::env::var(TESSERACT_ENV) {
        return Ok(PathBuf::from(cmd));
    }

    if let Ok(output) = Command::new("tesseract").arg("--version").output()
        && output.status.success()
    {
        return Ok(PathBuf::from("tesseract"));
    }

    Err(anyhow!(
        "Tesseract not found. Install tesseract-ocr or point {} at the executable.",
        TESSERACT_ENV
    ))
}

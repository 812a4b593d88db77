//! Subcommand implementations

pub mod codec;
pub mod schema;

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::Path;

/// Read a file, or stdin when `path` is `None` or `-`
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Read wire bytes, decoding hex text when `hex` is set
pub fn read_wire(path: Option<&Path>, hex: bool) -> Result<Vec<u8>> {
    let bytes = read_input(path)?;
    if !hex {
        return Ok(bytes);
    }
    let text = String::from_utf8(bytes).context("Hex input is not valid UTF-8")?;
    let compact: String = text.split_whitespace().collect();
    hex::decode(compact).context("Failed to parse hex input")
}

/// Write to a file, or stdout when `path` is `None`
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("Failed to write stdout")?;
            stdout.flush().context("Failed to write stdout")
        }
    }
}

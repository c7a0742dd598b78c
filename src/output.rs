use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{stdout, Write};
use std::path::PathBuf;

/// Where the rendered configuration is written
pub(crate) enum Output {
	Stdout,
	File(PathBuf),
}

impl From<Option<PathBuf>> for Output {
	fn from(path: Option<PathBuf>) -> Self {
		match path {
			Some(path) => Self::File(path),
			None => Self::Stdout,
		}
	}
}

impl Output {
	/// Write the full text to this destination
	pub(crate) fn write(&self, text: &str) -> Result<()> {
		match self {
			Self::Stdout => {
				let mut o = stdout().lock();
				o.write_all(text.as_bytes())?;
				o.flush()?;
			}
			Self::File(path) => {
				let mut file = File::create(path)
					.with_context(|| format!("Unable to create {}", path.display()))?;
				file.write_all(text.as_bytes())
					.with_context(|| format!("Unable to write {}", path.display()))?;
				info!("Configuration written to {}", path.display());
			}
		}
		Ok(())
	}
}

use anyhow::{bail, Result};
use serde::Serialize;

/// The validated inputs for a single tuning calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct Settings {
	max_connections: u32,
	mem_fraction: f64,
	bulk_load: bool,
	total_memory: u64,
	effective_memory: u64,
}

impl Settings {
	pub(crate) fn new(
		max_connections: u32,
		mem_fraction: f64,
		bulk_load: bool,
		total_memory: u64,
	) -> Result<Self> {
		if max_connections < 1 {
			bail!("max_connections must be at least 1, got {max_connections}");
		}
		if !(mem_fraction > 0.0 && mem_fraction <= 1.0) {
			bail!("mem_fraction must be greater than 0 and at most 1, got {mem_fraction}");
		}
		// The floor keeps every downstream quotient well defined
		let effective_memory = ((total_memory as f64 * mem_fraction) as u64).max(1);
		Ok(Self {
			max_connections,
			mem_fraction,
			bulk_load,
			total_memory,
			effective_memory,
		})
	}

	pub(crate) fn max_connections(&self) -> u32 {
		self.max_connections
	}

	pub(crate) fn mem_fraction(&self) -> f64 {
		self.mem_fraction
	}

	pub(crate) fn bulk_load(&self) -> bool {
		self.bulk_load
	}

	pub(crate) fn total_memory(&self) -> u64 {
		self.total_memory
	}

	/// The share of total memory the server may use, in bytes
	pub(crate) fn effective_memory(&self) -> u64 {
		self.effective_memory
	}
}

/// Clap value parser for the memory fraction
pub(crate) fn parse_fraction(s: &str) -> Result<f64, String> {
	let value = s.trim().parse::<f64>().map_err(|e| format!("{e}"))?;
	if value > 0.0 && value <= 1.0 {
		Ok(value)
	} else {
		Err(format!("{value} is not in the range (0, 1]"))
	}
}

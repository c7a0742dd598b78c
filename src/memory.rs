use anyhow::{bail, Result};
use bytesize::ByteSize;
use log::debug;
use sysinfo::System;

/// Get the total physical memory of this host in bytes
pub(crate) fn total_memory() -> Result<u64> {
	// Only the memory figures are needed
	let mut system = System::new();
	system.refresh_memory();
	// Get the total system memory
	let total = system.total_memory();
	if total == 0 {
		bail!("Unable to determine the total physical memory of this system");
	}
	debug!("Detected {} of total physical memory", ByteSize::b(total));
	Ok(total)
}

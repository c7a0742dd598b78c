use bytesize::ByteSize;

/// Unit suffixes accepted by postgresql.conf memory settings
const UNITS: [&str; 4] = ["", "kB", "MB", "GB"];

const BASE: u64 = 1024;

/// A remainder below 0.2 in log-1024 space means the value is
/// less than 1024^0.2 = 4 times the lower bracket boundary
const DECREMENT_FACTOR: u64 = 4;

/// Format a byte count using the largest unit that keeps a
/// readable leading number, truncating towards zero.
///
/// Values which only just cross into a bracket are shown in the
/// unit below, so 2GiB is rendered as `2048MB` and 1025 bytes as
/// `1025`, while 4096 bytes is rendered as `4kB`.
pub(crate) fn format_bytes(n: u64) -> String {
	// Find the power-of-1024 bracket for this value
	let exponent = match n {
		0 => 0,
		n => n.ilog2() / 10,
	};
	// Step down a unit when barely past the boundary
	let lower = BASE.pow(exponent);
	let decrement = exponent > 0 && n > lower && n < lower * DECREMENT_FACTOR;
	let divisor = (exponent - decrement as u32).min(UNITS.len() as u32 - 1);
	// Truncate to the chosen unit
	let quotient = n / BASE.pow(divisor);
	format!("{quotient}{}", UNITS[divisor as usize])
}

/// Parse a human byte quantity such as `8GiB`, `512 MB` or `1073741824`
pub(crate) fn parse_bytes(s: &str) -> Result<u64, String> {
	let size = s.trim().parse::<ByteSize>()?;
	match size.as_u64() {
		0 => Err(format!("memory size must be greater than zero: {s}")),
		n => Ok(n),
	}
}

#[cfg(test)]
mod test {
	use super::*;

	/// Convert a formatted quantity back into bytes
	fn unformat(s: &str) -> (u64, u64) {
		let (digits, unit) = s.split_at(s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len()));
		let index = UNITS.iter().position(|u| *u == unit).expect("unknown unit");
		(digits.parse().unwrap(), BASE.pow(index as u32))
	}

	#[test]
	fn zero_has_no_unit() {
		assert_eq!(format_bytes(0), "0");
	}

	#[test]
	fn below_one_kilobyte() {
		assert_eq!(format_bytes(1), "1");
		assert_eq!(format_bytes(1023), "1023");
	}

	#[test]
	fn exact_bracket_boundaries() {
		assert_eq!(format_bytes(1024), "1kB");
		assert_eq!(format_bytes(1024 * 1024), "1MB");
		assert_eq!(format_bytes(1073741824), "1GB");
	}

	#[test]
	fn decrement_just_past_boundary() {
		assert_eq!(format_bytes(1025), "1025");
		assert_eq!(format_bytes(4095), "4095");
		assert_eq!(format_bytes(4096), "4kB");
		assert_eq!(format_bytes(2 * 1024 * 1024 * 1024), "2048MB");
		assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5GB");
		assert_eq!(format_bytes(8 * 1024 * 1024 * 1024), "8GB");
	}

	#[test]
	fn truncates_instead_of_rounding() {
		assert_eq!(format_bytes(4 * 1024 + 1023), "4kB");
		assert_eq!(format_bytes(26447828), "25MB");
	}

	#[test]
	fn clamps_to_gigabytes() {
		assert_eq!(format_bytes(1 << 40), "1024GB");
		assert_eq!(format_bytes(5 << 40), "5120GB");
		assert_eq!(format_bytes(u64::MAX), format!("{}GB", u64::MAX >> 30));
	}

	#[test]
	fn truncation_property() {
		let mut n = 0u64;
		while n < (1 << 42) {
			let s = format_bytes(n);
			let (quotient, scale) = unformat(&s);
			assert!(quotient * scale <= n, "{s} overshoots {n}");
			assert!(quotient * scale + scale > n, "{s} undershoots {n}");
			n = n * 3 / 2 + 7;
		}
	}

	#[test]
	fn monotonic() {
		let mut previous = 0;
		for n in (0..(1u64 << 24)).step_by(4093) {
			let (quotient, scale) = unformat(&format_bytes(n));
			assert!(quotient * scale >= previous);
			previous = quotient * scale;
		}
	}

	#[test]
	fn parses_human_sizes() {
		assert_eq!(parse_bytes("8GiB"), Ok(8 * 1024 * 1024 * 1024));
		assert_eq!(parse_bytes("1073741824"), Ok(1073741824));
		assert_eq!(parse_bytes(" 512 KiB "), Ok(512 * 1024));
		assert!(parse_bytes("0").is_err());
		assert!(parse_bytes("lots").is_err());
	}
}

use crate::format::format_bytes;
use crate::output::Output;
use crate::render::Format;
use crate::settings::Settings;
use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser};
use log::{debug, info, warn};
use std::path::PathBuf;

mod format;
mod memory;
mod output;
mod render;
mod settings;
mod tuning;

/// postgresql.conf tuner
///
/// Prints suggested performance settings for a given number of connections
/// and share of physical memory. Save the output to a file and reference it
/// from postgresql.conf with an include directive, such as
/// `include 'postgresql.conf.pgtune'`.
#[derive(Parser, Debug)]
#[command(name = "pgtune", version, term_width = 0)]
pub(crate) struct Args {
	/// Minimally necessary maximum connections
	#[arg(
		short = 'c',
		long,
		alias = "max_connections",
		env = "PGTUNE_MAX_CONNECTIONS",
		default_value = "100",
		value_parser = clap::value_parser!(u32).range(1..)
	)]
	pub(crate) max_connections: u32,

	/// Fraction of total physical memory to use
	#[arg(
		short = 'f',
		long,
		alias = "mem_fraction",
		env = "PGTUNE_MEM_FRACTION",
		default_value = "1.0",
		value_parser = settings::parse_fraction
	)]
	pub(crate) mem_fraction: f64,

	/// Tune for a one-off bulk data load, sacrificing crash safety
	#[arg(short, long, env = "PGTUNE_BULK_LOAD")]
	pub(crate) bulk_load: bool,

	/// Total physical memory to tune for, instead of this host's (e.g. 16GiB)
	#[arg(short = 'm', long, env = "PGTUNE_TOTAL_MEMORY", value_parser = format::parse_bytes)]
	pub(crate) total_memory: Option<u64>,

	/// The output format
	#[arg(long, env = "PGTUNE_FORMAT", default_value_t = Format::Conf, value_enum)]
	pub(crate) format: Format,

	/// Write the configuration to this file instead of standard output
	#[arg(short, long, env = "PGTUNE_OUTPUT")]
	pub(crate) output: Option<PathBuf>,
}

fn main() -> Result<()> {
	// Initialise the logger
	env_logger::init();
	// Show the detected memory in the help output
	let detected = match memory::total_memory() {
		Ok(total) => format_bytes(total),
		Err(e) => {
			debug!("{e}");
			"unknown".to_string()
		}
	};
	let command = Args::command().mut_arg("mem_fraction", |arg| {
		arg.help(format!("Fraction of total physical memory ({detected}) to use"))
	});
	// Parse the command line arguments
	let args = Args::from_arg_matches(&command.get_matches()).unwrap_or_else(|e| e.exit());
	// Run the calculation
	run(args)
}

fn run(args: Args) -> Result<()> {
	// Use the override or query the host
	let total_memory = match args.total_memory {
		Some(total) => total,
		None => memory::total_memory()?,
	};
	// Validate the inputs
	let settings =
		Settings::new(args.max_connections, args.mem_fraction, args.bulk_load, total_memory)?;
	info!(
		"Tuning for {} connections with {} ({}) of {} memory",
		settings.max_connections(),
		format_bytes(settings.effective_memory()),
		settings.mem_fraction(),
		format_bytes(settings.total_memory()),
	);
	if settings.bulk_load() {
		warn!("Bulk loading disables fsync and full_page_writes, which is unsafe for production");
	}
	// Derive the configuration
	let categories = tuning::compute(&settings);
	// Output the results
	let text = render::render(&settings, &categories, args.format)?;
	Output::from(args.output).write(&text)
}

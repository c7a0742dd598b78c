use crate::format::format_bytes;
use crate::settings::Settings;
use std::fmt::{Display, Formatter};

/// Autovacuum workers assumed when not bulk loading
const AUTOVACUUM_WORKERS: u64 = 3;

/// Upper bound for shared_buffers
const SHARED_BUFFERS_MAX: u64 = 16 * 1024 * 1024 * 1024;

/// The postgresql.conf sections, in the order they appear in that file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Category {
	ConnectionsAndAuthentication,
	ResourceUsage,
	WriteAheadLog,
	Replication,
	QueryTuning,
	Autovacuum,
}

impl Category {
	const ALL: [Category; 6] = [
		Category::ConnectionsAndAuthentication,
		Category::ResourceUsage,
		Category::WriteAheadLog,
		Category::Replication,
		Category::QueryTuning,
		Category::Autovacuum,
	];

	pub(crate) fn name(&self) -> &'static str {
		match self {
			Category::ConnectionsAndAuthentication => "CONNECTIONS AND AUTHENTICATION",
			Category::ResourceUsage => "RESOURCE USAGE (except WAL)",
			Category::WriteAheadLog => "WRITE AHEAD LOG",
			Category::Replication => "REPLICATION",
			Category::QueryTuning => "QUERY TUNING",
			Category::Autovacuum => "AUTOVACUUM PARAMETERS",
		}
	}
}

/// A single setting value as written to postgresql.conf
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ConfigValue {
	Integer(u64),
	Real(f64),
	Token(&'static str),
	Bytes(u64),
}

impl Display for ConfigValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			ConfigValue::Integer(v) => write!(f, "{v}"),
			// Debug keeps the trailing `.0` on whole numbers
			ConfigValue::Real(v) => write!(f, "{v:?}"),
			ConfigValue::Token(v) => f.write_str(v),
			ConfigValue::Bytes(v) => f.write_str(&format_bytes(*v)),
		}
	}
}

/// A named section holding its settings in output order
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConfigCategory {
	pub(crate) category: Category,
	pub(crate) entries: Vec<(&'static str, ConfigValue)>,
}

impl ConfigCategory {
	pub(crate) fn name(&self) -> &'static str {
		self.category.name()
	}
}

/// Quantities shared by several of the derivation rules
#[derive(Debug, Clone, Copy)]
pub(crate) struct Derived {
	pub(crate) max_connections: u64,
	pub(crate) effective_memory: u64,
	pub(crate) effective_cache_size: u64,
	pub(crate) autovacuum_workers: u64,
	pub(crate) used_connections: u64,
	pub(crate) bulk_load: bool,
}

impl Derived {
	pub(crate) fn new(settings: &Settings) -> Self {
		let effective_memory = settings.effective_memory();
		Self {
			max_connections: settings.max_connections() as u64,
			effective_memory,
			effective_cache_size: (effective_memory as f64 * 0.625) as u64,
			autovacuum_workers: match settings.bulk_load() {
				true => 0,
				false => AUTOVACUUM_WORKERS,
			},
			used_connections: (settings.max_connections() as u64).max(1),
			bulk_load: settings.bulk_load(),
		}
	}

	fn pick<T>(&self, bulk: T, normal: T) -> T {
		if self.bulk_load {
			bulk
		} else {
			normal
		}
	}
}

/// When a rule contributes a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
	Always,
	BulkLoad,
}

struct Rule {
	category: Category,
	key: &'static str,
	when: Condition,
	value: fn(&Derived) -> ConfigValue,
}

macro_rules! rule {
	($category:ident, $key:literal, $when:ident, $value:expr) => {
		Rule {
			category: Category::$category,
			key: $key,
			when: Condition::$when,
			value: $value,
		}
	};
}

use ConfigValue::{Bytes, Integer, Real, Token};

/// Every setting this tool can emit, grouped and ordered as in postgresql.conf
static RULES: &[Rule] = &[
	rule!(ConnectionsAndAuthentication, "max_connections", Always, |d| Integer(d.max_connections)),
	rule!(ResourceUsage, "shared_buffers", Always, |d| {
		Bytes((d.effective_memory / 4).min(SHARED_BUFFERS_MAX))
	}),
	rule!(ResourceUsage, "temp_buffers", Always, |d| {
		Bytes(d.effective_cache_size / d.used_connections)
	}),
	// Assume two concurrently active tables per connection
	rule!(ResourceUsage, "work_mem", Always, |d| {
		Bytes(d.effective_cache_size / (d.used_connections * 2 + d.autovacuum_workers))
	}),
	rule!(ResourceUsage, "maintenance_work_mem", Always, |d| {
		Bytes(d.effective_memory / 4 / (d.autovacuum_workers + 2))
	}),
	rule!(ResourceUsage, "max_stack_depth", Always, |_| Token("8MB")),
	rule!(ResourceUsage, "vacuum_cost_delay", Always, |_| Token("50ms")),
	rule!(ResourceUsage, "effective_io_concurrency", Always, |_| Integer(4)),
	rule!(WriteAheadLog, "wal_level", BulkLoad, |_| Token("minimal")),
	// Unsafe: a crash can corrupt the cluster
	rule!(WriteAheadLog, "fsync", BulkLoad, |_| Token("off")),
	rule!(WriteAheadLog, "synchronous_commit", Always, |_| Token("off")),
	// Unsafe: torn pages cannot be recovered
	rule!(WriteAheadLog, "full_page_writes", BulkLoad, |_| Token("off")),
	rule!(WriteAheadLog, "wal_buffers", Always, |_| Token("16MB")),
	rule!(WriteAheadLog, "wal_writer_delay", Always, |_| Token("10s")),
	rule!(WriteAheadLog, "checkpoint_segments", Always, |d| Integer(d.pick(128, 64))),
	rule!(WriteAheadLog, "checkpoint_timeout", Always, |d| Token(d.pick("30min", "10min"))),
	rule!(WriteAheadLog, "checkpoint_completion_target", Always, |_| Real(0.8)),
	rule!(WriteAheadLog, "archive_mode", BulkLoad, |_| Token("off")),
	rule!(Replication, "max_wal_senders", BulkLoad, |_| Integer(0)),
	rule!(QueryTuning, "random_page_cost", Always, |_| Real(2.0)),
	rule!(QueryTuning, "effective_cache_size", Always, |d| Bytes(d.effective_cache_size)),
	rule!(Autovacuum, "autovacuum", BulkLoad, |_| Token("off")),
];

/// Derive the suggested configuration, omitting empty categories
pub(crate) fn compute(settings: &Settings) -> Vec<ConfigCategory> {
	let derived = Derived::new(settings);
	Category::ALL
		.iter()
		.map(|&category| ConfigCategory {
			category,
			entries: RULES
				.iter()
				.filter(|r| r.category == category)
				.filter(|r| r.when == Condition::Always || derived.bulk_load)
				.map(|r| (r.key, (r.value)(&derived)))
				.collect(),
		})
		.filter(|c| !c.entries.is_empty())
		.collect()
}

use crate::format::format_bytes;
use crate::settings::Settings;
use crate::tuning::ConfigCategory;
use anyhow::Result;
use clap::ValueEnum;
use serde_json::{json, Value};
use std::fmt::Write;

#[derive(Debug, Default, ValueEnum, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
	/// A postgresql.conf fragment
	#[default]
	Conf,
	/// A JSON document with the settings in output order
	Json,
}

/// The leading comment describing how the configuration was derived
pub(crate) fn header(settings: &Settings) -> String {
	format!(
		"# pgtune configuration{} with connections={} and memory={}.",
		if settings.bulk_load() {
			" for bulk loading"
		} else {
			""
		},
		settings.max_connections(),
		format_bytes(settings.effective_memory()),
	)
}

pub(crate) fn render(
	settings: &Settings,
	categories: &[ConfigCategory],
	format: Format,
) -> Result<String> {
	match format {
		Format::Conf => Ok(conf(settings, categories)?),
		Format::Json => Ok(serde_json::to_string_pretty(&json(settings, categories))? + "\n"),
	}
}

fn conf(settings: &Settings, categories: &[ConfigCategory]) -> Result<String, std::fmt::Error> {
	let mut out = String::new();
	writeln!(out, "{}", header(settings))?;
	for category in categories.iter().filter(|c| !c.entries.is_empty()) {
		writeln!(out)?;
		writeln!(out, "# {}", category.name())?;
		for (key, value) in &category.entries {
			writeln!(out, "{key} = {value}")?;
		}
	}
	Ok(out)
}

fn json(settings: &Settings, categories: &[ConfigCategory]) -> Value {
	let categories: Vec<Value> = categories
		.iter()
		.filter(|c| !c.entries.is_empty())
		.map(|c| {
			let entries: Vec<Value> = c
				.entries
				.iter()
				.map(|(key, value)| json!({ "key": key, "value": value.to_string() }))
				.collect();
			json!({
				"name": c.name(),
				"entries": entries,
			})
		})
		.collect();
	json!({
		"header": header(settings),
		"settings": settings,
		"categories": categories,
	})
}

//! Output module
//!
//! Prints project lists in the selected format: jsonl, json, md, raw

use chrono::{DateTime, Utc};
use std::io::Write;

use crate::core::model::Project;
use crate::core::paths::{make_relative, normalize_path};
use crate::core::util::relative_age;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Output configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
        }
    }

    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Printer for project lists
pub struct Printer {
    config: OutputConfig,
    now: DateTime<Utc>,
}

impl Printer {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            now: Utc::now(),
        }
    }

    /// Fix the reference time used for relative ages
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn render(&self, projects: &[&Project]) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(projects),
            OutputFormat::Json => self.render_json(projects),
            OutputFormat::Markdown => self.render_markdown(projects),
            OutputFormat::Raw => self.render_raw(projects),
        }
    }

    pub fn render_to<W: Write>(&self, projects: &[&Project], mut writer: W) -> std::io::Result<()> {
        let output = self.render(projects);
        writer.write_all(output.as_bytes())?;
        if !output.is_empty() {
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn render_jsonl(&self, projects: &[&Project]) -> String {
        projects
            .iter()
            .filter_map(|p| {
                if self.config.pretty {
                    serde_json::to_string_pretty(p).ok()
                } else {
                    serde_json::to_string(p).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    fn render_json(&self, projects: &[&Project]) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(projects).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(projects).unwrap_or_else(|_| "[]".to_string())
        }
    }

    fn render_markdown(&self, projects: &[&Project]) -> String {
        let mut output = String::new();
        if projects.is_empty() {
            return output;
        }

        output.push_str("## Projects\n\n");
        for p in projects {
            let pin = if p.is_pinned { "📌 " } else { "" };
            output.push_str(&format!("- {}**{}** `{}`", pin, p.name, p.path.display()));
            match p.last_modified {
                Some(ts) => output.push_str(&format!(
                    " ({}, ~{} tokens)",
                    relative_age(ts, self.now),
                    p.token_estimate
                )),
                None if !p.has_marker() => output.push_str(" (no CLAUDE.md)"),
                None => {}
            }
            output.push('\n');
            for doc in p.sorted_docs() {
                let marker = if p.pinned_docs.iter().any(|d| d == doc) {
                    "*"
                } else {
                    " "
                };
                let rel = make_relative(doc, &p.path).unwrap_or_else(|| normalize_path(doc));
                output.push_str(&format!("  -{}`{}`\n", marker, rel));
            }
        }

        output
    }

    fn render_raw(&self, projects: &[&Project]) -> String {
        projects
            .iter()
            .map(|p| p.path.display().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

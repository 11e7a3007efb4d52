//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use credex_definitions::RegistryReport;
use credex_domain::CanonicalField;
use credex_eval::BenchmarkReport;
use credex_extractor::{Classification, ExtractionResult};
use serde::Serialize;
use std::time::Duration;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// One row of `definitions list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    /// Main category id
    pub main_category: String,
    /// Sub-category id
    pub sub_category: String,
    /// Localized sub-category name
    pub name: String,
    /// Declared schema fields
    pub fields: usize,
    /// Whether the definition ships its own extraction prompt
    pub explicit_prompt: bool,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a routing outcome.
    pub fn format_classification(&self, classification: &Classification) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(classification)?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Main category", "Sub-category"]);
                builder.push_record([
                    classification.main_category.to_string(),
                    classification.sub_category.to_string(),
                ]);
                Ok(self.render(builder))
            }
        }
    }

    /// Format a pipeline result.
    pub fn format_extraction(&self, result: &ExtractionResult) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(result)?);
        }

        let record = &result.account_info;
        if record.is_empty() {
            return Ok(self.warning("No account information extracted."));
        }

        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for field in CanonicalField::ALL {
            if let Some(value) = field.value_of(record) {
                builder.push_record([field.wire_name().to_string(), value]);
            }
        }

        let mut lines = vec![
            self.render(builder),
            format!(
                "{} / {} ({} account, {} field(s))",
                result.classification.main_category,
                result.classification.sub_category,
                record.account_type(),
                record.extracted_field_count()
            ),
            format!(
                "{} via {} in {}",
                result.method,
                result.provider,
                format_duration(result.extraction_time)
            ),
        ];
        if result.is_valid() {
            lines.push(self.success("Validation passed"));
        } else {
            lines.extend(result.warnings.iter().map(|w| self.warning(&w.to_string())));
        }
        Ok(lines.join("\n"))
    }

    /// Format a benchmark report.
    pub fn format_benchmark(&self, report: &BenchmarkReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(report)?);
        }
        if report.fixtures.is_empty() {
            return Ok(self.colorize("No fixtures run.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record([
            "Fixture", "Runs", "Success", "Failed", "Accuracy", "Field success", "p50", "p95",
        ]);
        for fixture in &report.fixtures {
            let successes = fixture.runs.iter().filter(|r| r.is_success()).count();
            builder.push_record([
                fixture.name.clone(),
                fixture.runs.len().to_string(),
                successes.to_string(),
                fixture.failures().to_string(),
                format!("{:.1}%", fixture.mean_accuracy() * 100.0),
                format!("{:.1}%", fixture.analysis.mean_success_rate() * 100.0),
                format_duration(fixture.latency.p50),
                format_duration(fixture.latency.p95),
            ]);
        }

        let mut lines = vec![self.render(builder)];
        for fixture in &report.fixtures {
            lines.push(String::new());
            lines.push(self.colorize(&fixture.name, "cyan"));
            lines.push(fixture.analysis.insights.summary.clone());
            if let Some(note) = &fixture.analysis.notes.most_common {
                lines.push(format!(
                    "Most common note ({} distinct of {}): {}",
                    fixture.analysis.notes.ranking.len(),
                    fixture.analysis.notes.total,
                    note.replace('\n', " | ")
                ));
            }
        }
        lines.push(String::new());
        lines.push(self.info(&format!(
            "{} of {} runs succeeded on {} in {}",
            report.successful_runs(),
            report.total_runs(),
            report.provider,
            format_duration(report.elapsed)
        )));
        Ok(lines.join("\n"))
    }

    /// Format a definition validation report.
    pub fn format_registry_report(&self, report: &RegistryReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            let problems: Vec<String> = report.problems.iter().map(ToString::to_string).collect();
            let unused: Vec<String> = report
                .unused_fields
                .iter()
                .map(|(sub, field)| format!("{}.{}", sub, field))
                .collect();
            let value = serde_json::json!({
                "checked": report.checked,
                "valid": report.is_valid(),
                "problems": problems,
                "unusedFields": unused,
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let mut lines = Vec::new();
        if report.is_valid() {
            lines.push(self.success(&format!(
                "{} sub-category definitions are consistent",
                report.checked
            )));
        } else {
            lines.extend(report.problems.iter().map(|p| self.error(&p.to_string())));
        }
        for (sub, field) in &report.unused_fields {
            lines.push(self.info(&format!("{}: field '{}' is not mapped", sub, field)));
        }
        Ok(lines.join("\n"))
    }

    /// Format the category listing.
    pub fn format_categories(&self, rows: &[CategoryRow]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(rows)?);
        }

        let mut builder = Builder::default();
        builder.push_record(["Main", "Sub-category", "Name", "Fields", "Prompt"]);
        for row in rows {
            builder.push_record([
                row.main_category.clone(),
                row.sub_category.clone(),
                row.name.clone(),
                row.fields.to_string(),
                if row.explicit_prompt { "explicit" } else { "schema" }.to_string(),
            ]);
        }
        Ok(self.render(builder))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Render a duration in milliseconds or seconds.
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

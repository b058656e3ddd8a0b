use clap::ValueEnum;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Attribute, Cell, Color, Table};
use nextup_models::{Recommendation, RecommendationKind};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.message("success", msg.as_ref(), |m| println!("{} {}", "✓".green(), m));
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.message("info", msg.as_ref(), |m| println!("{}", m));
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.message("warning", msg.as_ref(), |m| println!("{} {}", "⚠".yellow(), m));
    }

    /// Shown even in quiet mode.
    pub fn error(&self, msg: impl AsRef<str>) {
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            _ => self.print_json(&json!({ "type": "error", "message": msg.as_ref() })),
        }
    }

    fn message(&self, kind: &str, msg: &str, human: impl FnOnce(&str)) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => human(msg),
            _ => self.print_json(&json!({ "type": kind, "message": msg })),
        }
    }

    /// Serializes `data` in JSON modes; no-op in human mode.
    pub fn data<T: Serialize>(&self, data: &T) {
        if self.is_human() {
            return;
        }
        match serde_json::to_value(data) {
            Ok(value) => self.print_json(&value),
            Err(e) => self.error(format!("Failed to serialize output: {}", e)),
        }
    }

    pub fn table(&self, table: &Table) {
        if !self.quiet && self.is_human() {
            println!("{}", table);
        }
    }

    pub fn recommendation(&self, rec: &Recommendation) {
        if !self.is_human() {
            self.data(rec);
            return;
        }
        if self.quiet {
            return;
        }

        let heading = match rec.kind {
            RecommendationKind::Episode => "Start this series",
            RecommendationKind::Movie => "Watch this movie",
        };
        println!("\n{} {}", "▶".bright_green(), heading.bright_cyan().bold());
        println!("  {}\n", rec.display_title().bold());
        self.table(&recommendation_table(rec));
        if let Some(summary) = rec.summary.as_deref().filter(|s| !s.is_empty()) {
            println!("\n{}", summary.dimmed());
        }
    }

    fn print_json(&self, data: &Value) {
        let rendered = match self.format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(data),
            _ => serde_json::to_string(data),
        };
        println!("{}", rendered.unwrap_or_default());
    }
}

pub fn styled_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn recommendation_table(rec: &Recommendation) -> Table {
    let mut table = styled_table(&["Field", "Value"]);
    let mut row = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
        }
    };

    row("Rating key", Some(rec.rating_key.clone()));
    row(
        "Released",
        rec.originally_available_at.map(|d| d.format("%Y-%m-%d").to_string()),
    );
    if !rec.collections.is_empty() {
        row("Collections", Some(rec.collections.join(", ")));
    }
    row("TVDB status", rec.tvdb_status.clone());
    row("Season artwork", rec.season_artwork.clone());
    row("Episode artwork", rec.episode_artwork.clone());
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie() -> Recommendation {
        Recommendation {
            kind: RecommendationKind::Movie,
            rating_key: "500".to_string(),
            title: "Die Hard".to_string(),
            show_title: None,
            show_rating_key: None,
            season_number: None,
            episode_number: None,
            summary: None,
            originally_available_at: chrono::NaiveDate::from_ymd_opt(1988, 7, 15),
            thumb: None,
            art: None,
            season_artwork: None,
            episode_artwork: None,
            tvdb_status: None,
            collections: vec!["Die Hard".to_string()],
        }
    }

    #[test]
    fn test_recommendation_table_skips_missing_fields() {
        let rendered = recommendation_table(&movie()).to_string();
        assert!(rendered.contains("1988-07-15"));
        assert!(rendered.contains("Collections"));
        assert!(!rendered.contains("TVDB status"));
    }
}

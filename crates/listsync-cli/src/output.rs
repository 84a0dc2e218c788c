use clap::ValueEnum;
use comfy_table::{Cell, Table};
use list_sync_models::{ListEntry, ListStatus};
use owo_colors::OwoColorize;
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

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{} {}", "✓".green(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "success", "message": msg.as_ref() }));
            }
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors should always be shown, even in quiet mode
        match self.format {
            OutputFormat::Human => eprintln!("{} {}", "✗".red(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "error", "message": msg.as_ref() }));
            }
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{}", msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "info", "message": msg.as_ref() }));
            }
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{} {}", "⚠".yellow(), msg.as_ref()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({ "type": "warning", "message": msg.as_ref() }));
            }
        }
    }

    /// Plain line in human mode; dropped in JSON mode so prompts don't pollute the stream
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.quiet || self.format != OutputFormat::Human {
            return;
        }
        println!("{}", msg.as_ref());
    }

    pub fn json(&self, data: &Value) {
        if self.quiet && self.format != OutputFormat::Human {
            return;
        }

        self.print_json(data);
    }

    /// A single list entry, or a note that the media is not on the list
    pub fn entry(&self, entry: Option<&ListEntry>) {
        match (self.format, entry) {
            (OutputFormat::Human, Some(entry)) => self.entries(std::slice::from_ref(entry)),
            (OutputFormat::Human, None) => self.info("Not on the list"),
            (_, entry) => self.json(&json!({ "type": "entry", "entry": entry })),
        }
    }

    pub fn entries(&self, entries: &[ListEntry]) {
        match self.format {
            OutputFormat::Human => {
                if self.quiet {
                    return;
                }
                if entries.is_empty() {
                    println!("{}", "No list entries".bright_black());
                    return;
                }
                println!("{}", entries_table(entries));
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.json(&json!({ "type": "entries", "count": entries.len(), "entries": entries }));
            }
        }
    }

    fn print_json(&self, data: &Value) {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string(data).unwrap_or_default()),
            OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(data).unwrap_or_default()),
            OutputFormat::Human => println!("{}", data),
        }
    }
}

fn status_cell(status: ListStatus) -> Cell {
    let color = match status {
        ListStatus::Current | ListStatus::Repeating => comfy_table::Color::Green,
        ListStatus::Completed => comfy_table::Color::Cyan,
        ListStatus::Planning => comfy_table::Color::Blue,
        ListStatus::Paused => comfy_table::Color::Yellow,
        ListStatus::Dropped => comfy_table::Color::Red,
    };
    Cell::new(status.as_str()).fg(color)
}

fn entries_table(entries: &[ListEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(
        ["Simkl ID", "AniList ID", "Status", "Progress", "Score", "Rewatched"]
            .into_iter()
            .map(|title| Cell::new(title).add_attribute(comfy_table::Attribute::Bold)),
    );
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(entry.media_id),
            status_cell(entry.status),
            Cell::new(entry.progress),
            Cell::new(if entry.score == 0 { "-".to_string() } else { entry.score.to_string() }),
            Cell::new(entry.rewatched),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

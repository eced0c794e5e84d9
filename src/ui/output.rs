use crate::driver::{SearchResult, SearchStatus};
use crate::error::{UserFriendlyError, ZipcrackError};
use chrono::{DateTime, Local};
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static HAND: Emoji = Emoji("✋ ", "- ");

pub struct OutputFormatter {
    #[allow(dead_code)]
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Warning, message),
            OutputMode::Json => self.print_json_message("warning", message),
            OutputMode::Plain => println!("WARNING: {}", message),
        }
    }

    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Info, message),
            OutputMode::Json => self.print_json_message("info", message),
            OutputMode::Plain => println!("INFO: {}", message),
        }
    }

    pub fn debug(&self, message: &str) {
        if self.verbose_level < 2 {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("  {}", style(message).dim());
                } else {
                    println!("  DEBUG: {}", message);
                }
            }
            OutputMode::Json => self.print_json_message("debug", message),
            OutputMode::Plain => println!("DEBUG: {}", message),
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}{}", ROCKET, style(operation).bold());
                } else {
                    println!("> {}", operation);
                }
            }
            OutputMode::Json => self.print_json_message("operation_start", operation),
            OutputMode::Plain => println!("STARTING: {}", operation),
        }
    }

    pub fn print_user_friendly_error(&self, error: &ZipcrackError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    println!();
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// Final run summary, emitted once whatever the terminal state was.
    pub fn print_search_result(&self, result: &SearchResult, started_at: DateTime<Local>) {
        match self.mode {
            OutputMode::Human => self.print_human_result(result),
            OutputMode::Json => {
                let json = serde_json::json!({
                    "status": status_name(result.status),
                    "password": result.password,
                    "attempts": result.attempts,
                    "elapsed_secs": result.elapsed.as_secs_f64(),
                    "attempts_per_sec": result.throughput(),
                    "started_at": started_at.to_rfc3339(),
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputMode::Plain => {
                println!("RESULT: {}", status_name(result.status));
                if let Some(ref password) = result.password {
                    println!("PASSWORD: {}", password);
                }
                println!("ATTEMPTS: {}", result.attempts);
                println!("ELAPSED_SECS: {:.2}", result.elapsed.as_secs_f64());
            }
        }
    }

    fn print_human_result(&self, result: &SearchResult) {
        println!();
        match result.status {
            SearchStatus::Found => {
                let password = result.password.as_deref().unwrap_or_default();
                if self.use_colors {
                    println!(
                        "{}{} {}",
                        CHECKMARK,
                        style("Password found:").green().bold(),
                        style(password).bold()
                    );
                } else {
                    println!("Password found: {}", password);
                }
            }
            SearchStatus::Exhausted => {
                if self.use_colors {
                    println!("{}{}", CROSS, style("Password not found").red().bold());
                } else {
                    println!("Password not found");
                }
            }
            SearchStatus::Cancelled => {
                if self.use_colors {
                    println!("{}{}", HAND, style("Stopped by user").yellow().bold());
                } else {
                    println!("Stopped by user");
                }
            }
        }

        println!(
            "   Attempts: {}  Time: {}  Speed: {:.1} pwd/s",
            format_count(result.attempts as u128),
            format_elapsed(result.elapsed),
            result.throughput()
        );
    }

    fn print_human_message(&self, message_type: MessageType, message: &str) {
        match message_type {
            MessageType::Success => {
                if self.use_colors {
                    println!("{}{}", CHECKMARK, style(message).green());
                } else {
                    println!("✓ {}", message);
                }
            }
            MessageType::Error => {
                if self.use_colors {
                    eprintln!("{}{}", CROSS, style(message).red().bold());
                } else {
                    eprintln!("✗ {}", message);
                }
            }
            MessageType::Warning => {
                if self.use_colors {
                    println!("{}{}", WARNING, style(message).yellow());
                } else {
                    println!("! {}", message);
                }
            }
            MessageType::Info => {
                if self.use_colors {
                    println!("{}{}", INFO, style(message).cyan());
                } else {
                    println!("i {}", message);
                }
            }
        }
    }

    fn print_json_message(&self, message_type: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": message_type,
            "message": message
        }));
    }

    fn print_json_object(&self, object: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(object).unwrap_or_else(|_| "{}".to_string())
        );
    }

}

enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn status_name(status: SearchStatus) -> &'static str {
    match status {
        SearchStatus::Found => "found",
        SearchStatus::Exhausted => "exhausted",
        SearchStatus::Cancelled => "cancelled",
    }
}

/// Thousands-separated count, like 1,234,567.
pub fn format_count(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_elapsed(elapsed: std::time::Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", elapsed.as_millis())
    }
}

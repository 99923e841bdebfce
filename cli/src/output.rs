use colored::*;
use musemate_core::{HistoryEntry, SparkHistory};

/// Shown in place of an empty field
const EMPTY_FIELD: &str = "—";

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() {
        EMPTY_FIELD
    } else {
        text
    }
}

/// Print the spark and focus of one generation
pub fn print_spark(entry: &HistoryEntry, verbose: bool) {
    println!("{}", "Spark".magenta().bold());
    println!("  {}", or_dash(&entry.spark));
    println!("{}", "Focus".magenta().bold());
    println!("  {}", or_dash(&entry.focus));

    // Diagnostics stay hidden unless asked for
    if verbose {
        if let Some(diagnostic) = &entry.diagnostic {
            println!("{} {}", "Developer info:".dimmed(), diagnostic.dimmed());
        }
    }
}

pub fn print_history(history: &SparkHistory) {
    if history.is_empty() {
        println!("{}", "No sparks yet.".dimmed());
        return;
    }

    println!("{}", "Recent sparks".yellow().bold());
    for entry in history.iter() {
        println!(
            "{}",
            format!("{} • {} • {}", entry.timestamp(), entry.intent, entry.tone).dimmed()
        );
        println!("  {} {}", "Spark:".bold(), or_dash(&entry.spark));
        println!("  {} {}", "Focus:".bold(), or_dash(&entry.focus));
    }
}

/// Show usage instructions when no mood or action is provided
pub fn print_usage_instructions() {
    println!("{}", "Usage:".yellow().bold());
    println!("  {}", "musemate \"nervous about a talk\"".green().bold());
    println!("    Get one spark and one micro-action");
    println!();
    println!("  {}", "musemate -i".green().bold());
    println!("    Start an interactive session");
    println!();
    println!("{}", "Options:".cyan());
    println!("  --intent <INTENT>  Create, Plan, Move or Reflect");
    println!("  --tone <TONE>      Warm Big-Sis, Therapist-Gentle or Direct-but-Loving");
    println!("  --png <PATH>       Save the share card as PNG");
    println!("  --help             Show this help message");
    println!();
}

pub fn print_interactive_help() {
    println!("{}", "Commands:".cyan());
    println!("  /intent <INTENT>  Switch intent");
    println!("  /tone <TONE>      Switch tone");
    println!("  /history          Show recent sparks");
    println!("  /clear            Forget recent sparks");
    println!("  /card <PATH>      Save the latest spark as a PNG card");
    println!("  exit | quit       Leave");
    println!("Anything else is taken as your mood.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_show_a_dash() {
        assert_eq!(or_dash(""), EMPTY_FIELD);
        assert_eq!(or_dash("  "), EMPTY_FIELD);
        assert_eq!(or_dash("Breathe."), "Breathe.");
    }
}

use clap::Parser;
use musemate_core::{Intent, Tone};
use std::path::PathBuf;

/// One clarity spark plus one micro-action, from the terminal
#[derive(Parser, Debug)]
#[command(name = "musemate", author, version, about, long_about = None)]
pub struct Args {
    /// How you are feeling and what you want today
    #[arg(index = 1)] // Positional argument
    pub mood: Option<String>,

    /// Create, Plan, Move or Reflect
    #[arg(long, default_value_t = Intent::Plan)]
    pub intent: Intent,

    /// Warm Big-Sis, Therapist-Gentle or Direct-but-Loving
    #[arg(long, default_value_t = Tone::TherapistGentle)]
    pub tone: Tone,

    /// Write the share card for the spark to this path
    #[arg(long)]
    pub png: Option<PathBuf>,

    /// Enter interactive mode
    #[arg(short, long, default_value_t = false)]
    pub interactive: bool,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// OpenAI API key (overrides config file and OPENAI_API_KEY)
    #[arg(short = 'k', long)]
    pub api_key: Option<String>,

    /// Model to use
    #[arg(short = 'o', long)]
    pub model: Option<String>,

    /// Enable verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["musemate", "tired but hopeful"]).unwrap();
        assert_eq!(args.mood.as_deref(), Some("tired but hopeful"));
        assert_eq!(args.intent, Intent::Plan);
        assert_eq!(args.tone, Tone::TherapistGentle);
        assert!(!args.interactive);
        assert!(args.png.is_none());
    }

    #[test]
    fn test_choices_parse_case_insensitively() {
        let args = Args::try_parse_from([
            "musemate",
            "--intent",
            "move",
            "--tone",
            "direct-but-loving",
            "--png",
            "card.png",
            "-i",
        ])
        .unwrap();
        assert_eq!(args.intent, Intent::Move);
        assert_eq!(args.tone, Tone::DirectButLoving);
        assert_eq!(args.png, Some(PathBuf::from("card.png")));
        assert!(args.interactive);
        assert!(args.mood.is_none());
    }

    #[test]
    fn test_unknown_intent_is_rejected() {
        assert!(Args::try_parse_from(["musemate", "ok", "--intent", "nap"]).is_err());
    }
}

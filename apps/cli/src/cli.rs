use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use quiz_core::SourceFormat;

#[derive(Parser)]
#[command(name = "quiz-srs")]
#[command(
    author,
    version,
    about = "Import, validate and study markdown or JSON quizzes with spaced repetition"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Fixed RFC 3339 time used as "now" for scheduling
    #[arg(long, global = true, env = "QUIZ_SRS_NOW")]
    pub now: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse or decode a quiz, validate and normalize it, and emit JSON
    Import {
        /// Markdown or JSON quiz file
        file: PathBuf,

        /// Source format (detected from the extension or content by default)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Repair LaTeX commands mangled by JSON escaping
        #[arg(long)]
        fix_latex: bool,

        /// Write the module here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a JSON quiz against the schema
    Validate {
        /// JSON quiz file
        file: PathBuf,

        /// Treat duplicate IDs as fixable and report the renames
        #[arg(long)]
        normalize: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record an answer to one question
    Answer {
        /// JSON quiz file
        file: PathBuf,

        /// Question ID
        #[arg(short, long)]
        question: String,

        /// Selected option ID (repeat for multi-answer questions)
        #[arg(short = 'p', long = "option", required = true)]
        options: Vec<String>,

        /// Write the module here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show due questions and progress
    Due {
        /// Markdown or JSON quiz file
        file: PathBuf,

        /// Print stats as JSON
        #[arg(long)]
        json: bool,
    },

    /// Clear all review progress
    Reset {
        /// JSON quiz file
        file: PathBuf,

        /// Write the module here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    #[value(alias = "md")]
    Markdown,
    Json,
}

impl From<FormatArg> for SourceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => SourceFormat::Markdown,
            FormatArg::Json => SourceFormat::Json,
        }
    }
}

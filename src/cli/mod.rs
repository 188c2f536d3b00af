//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for list/query commands.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON (same as --json)
    Json,
    /// Comma-separated values
    Csv,
}

pub mod commands;

/// qsheet - track your progress through a question sheet
#[derive(Parser, Debug)]
#[command(name = "qsheet", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.qsheet/data/qsheet.db)
    #[arg(long, global = true, env = "QSHEET_DB")]
    pub db: Option<PathBuf>,

    /// Actor name for the audit trail
    #[arg(long, global = true, env = "QSHEET_ACTOR")]
    pub actor: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output format (table, json, csv)
    #[arg(long, value_enum, global = true, default_value_t)]
    pub format: OutputFormat,

    /// Output only the ID (for scripting)
    #[arg(long, global = true)]
    pub silent: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and load the initial sheet
    Init(SeedSourceArgs),

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Topic management
    Topic {
        #[command(subcommand)]
        command: TopicCommands,
    },

    /// Subtopic management
    #[command(alias = "sub")]
    Subtopic {
        #[command(subcommand)]
        command: SubTopicCommands,
    },

    /// Question management
    #[command(alias = "q")]
    Question {
        #[command(subcommand)]
        command: QuestionCommands,
    },

    /// Show the sheet as a tree, optionally filtered
    List(ListArgs),

    /// Show overall, per-difficulty and per-platform progress
    Stats,

    /// Export the sheet to JSON or CSV
    Export {
        /// Export format
        #[arg(value_enum, value_name = "FORMAT")]
        kind: ExportFormatArg,

        /// Output file (default: question-sheet-export.<ext> in the current directory)
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<PathBuf>,

        /// Write the export to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },

    /// Replace the sheet with a previously exported JSON snapshot
    Import {
        /// Path to the snapshot file
        file: PathBuf,
    },

    /// Replace the sheet with a freshly seeded one
    Seed {
        /// Seed file (sheet payload with `sheet` and `questions`)
        #[arg(long, conflicts_with = "slug")]
        file: Option<PathBuf>,

        /// Fetch the sheet with this slug from the remote API
        #[arg(long)]
        slug: Option<String>,
    },

    /// Remove every topic, subtopic and question
    Clear,

    /// Verify the referential integrity of the stored sheet
    Check,

    /// Show the audit history
    History {
        /// Only events for this entity ID
        #[arg(long)]
        id: Option<String>,

        /// Entity kind of --id (topic, subtopic, question)
        #[arg(long, default_value = "question", requires = "id")]
        kind: String,

        /// Maximum number of events
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Export format argument.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormatArg {
    Json,
    Csv,
}

/// Where the initial sheet comes from.
#[derive(Args, Debug)]
pub struct SeedSourceArgs {
    /// Seed file (sheet payload with `sheet` and `questions`)
    #[arg(long, conflicts_with = "slug")]
    pub seed_file: Option<PathBuf>,

    /// Fetch the sheet with this slug from the remote API
    #[arg(long)]
    pub slug: Option<String>,

    /// Overwrite an existing database
    #[arg(long)]
    pub force: bool,
}

// ============================================================================
// Topic Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum TopicCommands {
    /// Append a new topic
    Add {
        /// Topic title
        title: String,
    },

    /// Rename a topic
    Rename {
        /// Topic ID (or unique prefix)
        id: String,
        /// New title
        title: String,
    },

    /// Delete a topic with all of its subtopics and questions
    Delete {
        /// Topic ID (or unique prefix)
        id: String,
    },

    /// Move a topic to another position
    Move {
        /// Topic ID (or unique prefix)
        id: String,
        /// Target position (0-based)
        #[arg(long)]
        to: usize,
    },
}

// ============================================================================
// Subtopic Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum SubTopicCommands {
    /// Append a new subtopic to a topic
    Add {
        /// Topic ID (or unique prefix)
        topic: String,
        /// Subtopic title
        title: String,
    },

    /// Rename a subtopic
    Rename {
        /// Subtopic ID (or unique prefix)
        id: String,
        /// New title
        title: String,
    },

    /// Delete a subtopic with all of its questions
    Delete {
        /// Subtopic ID (or unique prefix)
        id: String,
    },

    /// Reorder a subtopic or move it to another topic
    Move {
        /// Subtopic ID (or unique prefix)
        id: String,
        /// Destination topic (default: the current one)
        #[arg(long)]
        topic: Option<String>,
        /// Target position (0-based; default: end of the destination)
        #[arg(long)]
        to: Option<usize>,
    },
}

// ============================================================================
// Question Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum QuestionCommands {
    /// Append a new question to a topic or subtopic
    Add(QuestionAddArgs),

    /// Edit question fields
    Edit(QuestionEditArgs),

    /// Mark question(s) as done
    Done {
        /// Question IDs (or unique prefixes)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Mark question(s) as todo
    Todo {
        /// Question IDs (or unique prefixes)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Toggle the bookmark on a question
    Bookmark {
        /// Question ID (or unique prefix)
        id: String,
    },

    /// Delete question(s)
    Delete {
        /// Question IDs (or unique prefixes)
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// Reorder a question or move it under another topic/subtopic
    Move {
        /// Question ID (or unique prefix)
        id: String,
        /// Destination topic or subtopic (default: the current parent)
        #[arg(long)]
        parent: Option<String>,
        /// Target position (0-based; default: end of the destination)
        #[arg(long)]
        to: Option<usize>,
    },

    /// Show question details
    Show {
        /// Question ID (or unique prefix); defaults to the active question
        id: Option<String>,
    },

    /// Make a question the active one (no ID clears the selection)
    Focus {
        /// Question ID (or unique prefix)
        id: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct QuestionAddArgs {
    /// Parent topic or subtopic ID (or unique prefix)
    pub parent: String,

    /// Question title
    pub title: String,

    /// Difficulty (easy, medium, hard)
    #[arg(short, long)]
    pub difficulty: Option<String>,

    /// Platform (e.g. LeetCode)
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Problem link
    #[arg(long)]
    pub link: Option<String>,

    /// Solution video URL
    #[arg(long)]
    pub video: Option<String>,

    /// Tags (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub struct QuestionEditArgs {
    /// Question ID (or unique prefix)
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// Status (todo, done)
    #[arg(short, long)]
    pub status: Option<String>,

    /// Difficulty (easy, medium, hard)
    #[arg(short, long, conflicts_with = "clear_difficulty")]
    pub difficulty: Option<String>,

    /// Remove the difficulty
    #[arg(long)]
    pub clear_difficulty: bool,

    /// Platform (empty string clears)
    #[arg(short, long)]
    pub platform: Option<String>,

    /// Problem link (empty string clears)
    #[arg(long)]
    pub link: Option<String>,

    /// Solution video URL (empty string clears)
    #[arg(long)]
    pub video: Option<String>,

    /// Notes (empty string clears)
    #[arg(long)]
    pub notes: Option<String>,

    /// Tags (comma-separated; empty string clears)
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,

    /// Custom tags (comma-separated; empty string clears)
    #[arg(long, value_delimiter = ',')]
    pub custom_tags: Option<Vec<String>>,

    /// Custom sheets (comma-separated; empty string clears)
    #[arg(long, value_delimiter = ',')]
    pub custom_sheets: Option<Vec<String>>,
}

// ============================================================================
// List
// ============================================================================

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only questions whose title contains this text (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by status (comma-separated: todo, done)
    #[arg(short, long, value_delimiter = ',')]
    pub status: Vec<String>,

    /// Filter by difficulty (comma-separated: easy, medium, hard)
    #[arg(short, long, value_delimiter = ',')]
    pub difficulty: Vec<String>,

    /// Filter by platform (comma-separated, exact match)
    #[arg(short, long, value_delimiter = ',')]
    pub platform: Vec<String>,

    /// Expand these topics/subtopics (remembered)
    #[arg(long, value_delimiter = ',')]
    pub expand: Vec<String>,

    /// Collapse these topics/subtopics (remembered)
    #[arg(long, value_delimiter = ',')]
    pub collapse: Vec<String>,

    /// Flip the expansion of these topics/subtopics (remembered)
    #[arg(long, value_delimiter = ',')]
    pub toggle: Vec<String>,

    /// Show every topic and subtopic expanded for this listing only
    #[arg(long)]
    pub expand_all: bool,
}

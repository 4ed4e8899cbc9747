use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::types::Theme;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

#[derive(Parser)]
#[command(name = "userdir")]
#[command(about = "Browse a user directory merged from a REST API and local records", version)]
#[command(after_help = "EXAMPLES:
    userdir list                      List everyone
    userdir list --search graham      Filter by name or email
    userdir show 3                    Show user details
    userdir add --name \"Jo\" ...       Create a local user
    userdir theme toggle              Switch between light and dark")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, compact)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress success messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show detailed error information and debug logs
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List users, optionally filtered by name or email
    #[command(
        alias = "ls",
        after_help = "EXAMPLES:
    userdir list
    userdir list --search melissa.tv
    userdir list --local"
    )]
    List(ListArgs),
    /// Show details for one user
    #[command(
        alias = "v",
        after_help = "EXAMPLES:
    userdir show 1
    userdir show 11 --format json"
    )]
    Show {
        /// User id
        id: String,
    },
    /// Create a local user
    #[command(
        alias = "a",
        after_help = "EXAMPLES:
    userdir add --name \"John Doe\" --email john@example.com \\
        --phone 123-456-7890 --company \"Acme Corporation\""
    )]
    Add(AddArgs),
    /// Search interactively; each line read from stdin is a new query
    #[command(after_help = "EXAMPLES:
    userdir search")]
    Search,
    /// Show or change the color theme
    #[command(after_help = "EXAMPLES:
    userdir theme
    userdir theme toggle
    userdir theme set dark")]
    Theme {
        #[command(subcommand)]
        action: Option<ThemeCommands>,
    },
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    userdir completions bash > ~/.bash_completion.d/userdir
    userdir completions zsh > ~/.zfunc/_userdir
    userdir completions fish > ~/.config/fish/completions/userdir.fish")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    #[command(after_help = "EXAMPLES:
    userdir init")]
    Init,
}

#[derive(Subcommand)]
pub enum ThemeCommands {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
    /// Set the theme explicitly
    Set {
        #[arg(value_enum)]
        theme: Theme,
    },
}

#[derive(Args, Clone)]
pub struct ListArgs {
    /// Case-insensitive match on name or email
    #[arg(long, short)]
    pub search: Option<String>,

    /// Only show locally created users
    #[arg(long, conflicts_with = "remote")]
    pub local: bool,

    /// Only show users from the API
    #[arg(long)]
    pub remote: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Full name
    #[arg(long, short)]
    pub name: String,

    /// Email address
    #[arg(long, short)]
    pub email: String,

    /// Phone number (at least 10 digits)
    #[arg(long, short)]
    pub phone: String,

    /// Company name
    #[arg(long, short)]
    pub company: String,
}

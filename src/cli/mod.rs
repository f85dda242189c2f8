//! CLI module for Joigo
//!
//! Provides command-line interface parsing and handling for the joigo binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod commands;
pub mod init;
pub mod output;

use crate::i18n::Language;
use crate::models::Currency;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Joigo - cultural tours of Hanoi
///
/// Browse the tour catalog, chat with the assistant, keep a wishlist and
/// book tours from the terminal.
#[derive(Parser, Debug)]
#[command(
    name = "joigo",
    author = "Joigo <dev@joigo.vn>",
    version,
    about = "Joigo - cultural tours of Hanoi",
    long_about = "Terminal client for the Joigo tour service: browse and filter tours,\n\
                  chat with the travel assistant, manage your wishlist and book tours.",
    after_help = "EXAMPLES:\n    \
                  joigo init                                 # Write joigo.toml and .env.example\n    \
                  joigo tours list --type \"Tour gia đình\"     # Filter the catalog\n    \
                  joigo chat send \"Tour nào rẻ nhất?\"          # Ask the assistant\n    \
                  joigo auth login -e me@example.com         # Sign in (password from $JOIGO_PASSWORD or prompt)"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "joigo.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Display language (EN or VI), overrides ui.language
    #[arg(short, long, global = true)]
    pub language: Option<Language>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter joigo.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Backend base URL
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        api_url: String,

        /// Supabase project URL
        #[arg(long)]
        supabase_url: Option<String>,

        /// Default currency (USD or VND)
        #[arg(long, default_value = "USD")]
        currency: Currency,
    },

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Browse the tour catalog
    #[command(subcommand)]
    Tours(TourCommands),

    /// Talk to the travel assistant
    #[command(subcommand)]
    Chat(ChatCommands),

    /// Sign in, sign out and manage your profile
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Manage saved tours
    #[command(subcommand)]
    Wishlist(WishlistCommands),

    /// Request a consultation
    Contact {
        #[command(flatten)]
        details: ContactArgs,

        /// Tour the request is about
        #[arg(long)]
        tour: Option<String>,
    },

    /// Book a tour (requires sign-in)
    Book {
        /// Tour id
        tour_id: String,

        #[command(flatten)]
        details: ContactArgs,
    },

    /// List your bookings
    Bookings,
}

/// Catalog subcommands
#[derive(Subcommand, Debug)]
pub enum TourCommands {
    /// List tours matching the search and filters
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Price currency (USD or VND), overrides ui.currency
        #[arg(long)]
        currency: Option<Currency>,
    },

    /// Show one tour
    Show {
        /// Tour id
        id: String,

        /// Price currency (USD or VND), overrides ui.currency
        #[arg(long)]
        currency: Option<Currency>,
    },

    /// Create a tour from a JSON file (admin)
    Create {
        /// Path to a tour JSON document
        file: PathBuf,
    },

    /// Replace a tour from a JSON file (admin)
    Update {
        /// Path to a tour JSON document; its id selects the tour
        file: PathBuf,
    },

    /// Delete a tour (admin)
    Delete {
        /// Tour id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Search text and facet filters. Omitted facets are unconstrained.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Substring searched in titles, descriptions and destination
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Tour type tag
    #[arg(long = "type")]
    pub tour_type: Option<String>,

    #[arg(long)]
    pub departure: Option<String>,

    #[arg(long)]
    pub destination: Option<String>,

    #[arg(long)]
    pub transportation: Option<String>,
}

/// Chat subcommands
#[derive(Subcommand, Debug)]
pub enum ChatCommands {
    /// Send a message in the active session
    Send {
        /// Message text
        message: String,
    },

    /// Show the active conversation
    History,

    /// List your sessions, most recent first
    Sessions,

    /// Start a new session
    New,

    /// Make another session active
    Switch {
        /// Session id
        session_id: String,
    },

    /// Delete a session
    Delete {
        /// Session id
        session_id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show suggested questions
    Suggestions,
}

/// Authentication subcommands
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        /// Password (or set JOIGO_PASSWORD)
        #[arg(short, long, env = "JOIGO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account
    Signup {
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password (or set JOIGO_PASSWORD)
        #[arg(short, long, env = "JOIGO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Print the Google sign-in URL
    Google,

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Update profile fields
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        gender: Option<String>,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birthdate: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        mobile_number: Option<String>,
    },
}

/// Wishlist subcommands
#[derive(Subcommand, Debug)]
pub enum WishlistCommands {
    /// List saved tours
    List,

    /// Save a tour
    Add {
        /// Tour id
        tour_id: String,
    },

    /// Remove a saved tour
    Remove {
        /// Tour id
        tour_id: String,
    },
}

/// Contact fields shared by `contact` and `book`
#[derive(Args, Debug)]
pub struct ContactArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    /// Optional note
    #[arg(short, long)]
    pub message: Option<String>,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

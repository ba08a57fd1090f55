use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use dotenv::dotenv;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(about, version)]
pub struct Config {
    /// Where the key-value store lives
    #[arg(short, long, default_value = "./feed.db", env = "FEED_DATABASE")]
    database: PathBuf,
    /// Name of this client, private keys are kept apart per client
    #[arg(short, long, default_value = "local", env = "FEED_CLIENT")]
    client: String,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in with a display name and an avatar glyph
    Login {
        name: String,
        #[arg(short, long, default_value = crate::model::DEFAULT_AVATAR)]
        avatar: String,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Whoami,
    /// Publish a new post
    Post { text: String },
    /// Like a post, or take the like back
    Like { id: i64 },
    /// Comment on a post
    Comment { id: i64, text: String },
    /// List every post, newest first
    Feed,
    /// List the avatar glyphs
    Avatars,
}

impl Config {
    /// Parse the configuration from the environment and command line arguments
    pub fn parse() -> Self {
        dotenv().ok();
        <Self as Parser>::parse()
    }
    /// Create a logger with the configured verbosity level
    pub fn init_logger(&self) {
        env_logger::Builder::new()
            .filter_level(self.verbose.log_level_filter())
            .format_target(false)
            .format_timestamp(None)
            .init();
    }
    pub const fn database(&self) -> &PathBuf {
        &self.database
    }
    pub fn client(&self) -> &str {
        &self.client
    }
}

//! CLI module - Command-line interface for Atelier
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Atelier - site search service
/// Searches articles, portfolio items and service pages in one request
#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    #[command(alias = "web")]
    Serve,

    /// Run one search and print the JSON response
    #[command(alias = "s")]
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
        /// Restrict to one collection: posts, projects or services
        #[arg(long = "type")]
        kind: Option<String>,
        /// Maximum results per collection
        #[arg(long)]
        limit: Option<u64>,
        /// Include draft articles
        #[arg(long)]
        drafts: bool,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user and print its API key
    Add {
        /// Username
        username: String,
        /// Password
        #[arg(long)]
        password: String,
        /// Role: admin, editor or member
        #[arg(long, default_value = "member")]
        role: String,
    },
}

pub use commands::*;

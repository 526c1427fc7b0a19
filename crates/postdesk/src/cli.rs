//! Clap derive structures for the `postdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// postdesk -- manage a blog from the command line
#[derive(Debug, Parser)]
#[command(
    name = "postdesk",
    version,
    about = "Manage blog posts and comments from the command line",
    long_about = "A command-line dashboard for the blog REST API.\n\n\
        Logs in with email + password, keeps the session between runs, and\n\
        refreshes expired access tokens transparently.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Profile to use
    #[arg(long, short = 'p', env = "POSTDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "POSTDESK_API_BASE_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "POSTDESK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "POSTDESK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "POSTDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with email and password
    Login(LoginArgs),

    /// End the session and forget stored tokens
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage posts
    #[command(alias = "post")]
    Posts(PostsArgs),

    /// Manage comments
    #[command(alias = "comment")]
    Comments(CommentsArgs),

    /// Read the public portal (no login needed)
    Portal(PortalArgs),

    /// View and change UI preferences
    Prefs(PrefsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Login email (defaults to the profile's email)
    #[arg(long, short = 'e')]
    pub email: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  POSTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub command: PostsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    All,
    Published,
    Draft,
}

#[derive(Debug, Subcommand)]
pub enum PostsCommand {
    /// List one page of posts
    #[command(alias = "ls")]
    List {
        /// Page number (100 posts per page)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Only rows whose title contains this text (case-insensitive)
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only published or draft rows
        #[arg(long, default_value = "all")]
        status: StatusArg,
    },

    /// Show a post with its comments
    Get {
        /// Post ID
        id: i64,
    },

    /// Create a post
    Create {
        #[arg(long, short = 't')]
        title: String,

        #[arg(long, short = 'c')]
        content: String,

        /// Publish immediately
        #[arg(long)]
        publish: bool,
    },

    /// Update fields of a post
    Update {
        /// Post ID
        id: i64,

        #[arg(long, short = 't')]
        title: Option<String>,

        #[arg(long, short = 'c')]
        content: Option<String>,

        /// Mark as published
        #[arg(long, conflicts_with = "draft")]
        publish: bool,

        /// Mark as draft
        #[arg(long)]
        draft: bool,
    },

    /// Replace every field of a post
    Replace {
        /// Post ID
        id: i64,

        #[arg(long, short = 't')]
        title: String,

        #[arg(long, short = 'c')]
        content: String,

        /// Published after the replace (draft otherwise)
        #[arg(long)]
        publish: bool,
    },

    /// Delete a post
    #[command(alias = "rm")]
    Delete {
        /// Post ID
        id: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CommentsArgs {
    #[command(subcommand)]
    pub command: CommentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CommentsCommand {
    /// List one page of comments
    #[command(alias = "ls")]
    List {
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Show one comment
    Get {
        /// Comment ID
        id: i64,
    },

    /// Comment on a post
    Create {
        /// Post ID
        #[arg(long)]
        post: i64,

        #[arg(long, short = 'c')]
        content: String,
    },

    /// Delete a comment
    #[command(alias = "rm")]
    Delete {
        /// Comment ID
        id: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PORTAL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PortalArgs {
    #[command(subcommand)]
    pub command: PortalCommand,
}

#[derive(Debug, Subcommand)]
pub enum PortalCommand {
    /// List published posts
    #[command(alias = "ls")]
    List {
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Read a published post
    Get {
        /// Post ID
        id: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PREFS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PrefsArgs {
    #[command(subcommand)]
    pub command: PrefsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SidebarArg {
    Collapsed,
    Expanded,
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    /// Show theme and sidebar state
    Show,

    /// Set the colour theme
    Theme { theme: ThemeArg },

    /// Switch between light and dark
    ToggleTheme,

    /// Set the sidebar state, or toggle it when omitted
    Sidebar { state: Option<SidebarArg> },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (api_base_url, email, insecure, timeout, ca_cert)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the login password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

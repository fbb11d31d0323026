use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mailersend")]
#[command(about = "Command line interface for the MailerSend email and SMS API")]
#[command(version)]
#[command(after_help = "Examples:
  mailersend auth login                      # Store an API token
  mailersend domain list                     # List sending domains
  mailersend activity list --domain a.com    # Last 24h of activity
  mailersend email send --from me@a.com --to you@b.com --subject Hi --text Hello
  mailersend domain list --json              # Output as JSON

Environment Variables:
  MAILERSEND_API_TOKEN   API token (overrides every profile)
  XDG_CONFIG_HOME        Base directory for mailersend/config.yaml
  NO_COLOR               Disable coloured tables")]
pub struct Cli {
    /// Enable verbose output (request/response trace on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Profile name to use instead of the active one
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in, log out and show the credential in use
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Manage configured profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Manage sending domains
    Domain {
        #[command(subcommand)]
        command: DomainCommands,
    },
    /// Inspect email activity
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Send email
    Email {
        #[command(subcommand)]
        command: EmailCommands,
    },
    /// Send SMS
    Sms {
        #[command(subcommand)]
        command: SmsCommands,
    },
    /// List templates
    Template {
        #[command(subcommand)]
        command: ListOnlyCommands,
    },
    /// List webhooks of a domain
    Webhook {
        #[command(subcommand)]
        command: WebhookCommands,
    },
    /// List API tokens
    Token {
        #[command(subcommand)]
        command: ListOnlyCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store an API token in a profile and make it active
    #[command(after_help = "Examples:
  mailersend auth login                         # Prompt for the token
  mailersend auth login --token mlsn.xxx --name work")]
    Login {
        /// API token; prompted for without echo when omitted
        #[arg(long)]
        token: Option<String>,
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,
    },
    /// Remove the stored credentials of a profile
    Logout {
        /// Profile name (default: the active profile)
        #[arg(long)]
        name: Option<String>,
    },
    /// Show which credential would be used
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all profiles
    List,
    /// Make a profile the active one
    Switch { name: String },
    /// Delete a profile
    Remove { name: String },
}

/// Shared `--limit` flag for list commands
#[derive(Args, Debug, Clone, Copy)]
pub struct LimitArgs {
    /// Maximum number of items to return (0 = all)
    #[arg(long, default_value = "0")]
    pub limit: usize,
}

#[derive(Subcommand, Debug)]
pub enum DomainCommands {
    /// List all domains
    List(LimitArgs),
    /// Show a domain by ID or name
    Get {
        /// Domain ID or DNS name
        domain: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ActivityCommands {
    /// List activity events of a domain
    #[command(after_help = "Examples:
  mailersend activity list --domain a.com
  mailersend activity list --domain a.com --date-from 2025-01-01 --date-to 2025-01-02
  mailersend activity list --domain a.com --event delivered --event opened")]
    List(ActivityListArgs),
}

#[derive(Args, Debug)]
pub struct ActivityListArgs {
    /// Domain ID or DNS name
    #[arg(long)]
    pub domain: String,

    #[command(flatten)]
    pub limit: LimitArgs,

    /// Start date (YYYY-MM-DD), default 24 hours ago
    #[arg(long)]
    pub date_from: Option<String>,

    /// End date (YYYY-MM-DD), default now
    #[arg(long)]
    pub date_to: Option<String>,

    /// Event type filter (can be repeated)
    #[arg(long = "event", action = clap::ArgAction::Append)]
    pub events: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum EmailCommands {
    /// Send an email
    Send(EmailSendArgs),
}

#[derive(Args, Debug)]
pub struct EmailSendArgs {
    /// Recipient address (can be repeated)
    #[arg(long, required = true, action = clap::ArgAction::Append)]
    pub to: Vec<String>,

    /// Sender address
    #[arg(long)]
    pub from: Option<String>,

    /// Sender display name
    #[arg(long)]
    pub from_name: Option<String>,

    #[arg(long)]
    pub subject: String,

    /// Plain-text body
    #[arg(long)]
    pub text: Option<String>,

    /// HTML body
    #[arg(long)]
    pub html: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SmsCommands {
    /// Send an SMS
    Send(SmsSendArgs),
}

#[derive(Args, Debug)]
pub struct SmsSendArgs {
    /// Sender phone number
    #[arg(long)]
    pub from: String,

    /// Recipient phone number (can be repeated)
    #[arg(long, required = true, action = clap::ArgAction::Append)]
    pub to: Vec<String>,

    #[arg(long)]
    pub text: String,
}

#[derive(Subcommand, Debug)]
pub enum ListOnlyCommands {
    /// List all items
    List(LimitArgs),
}

#[derive(Subcommand, Debug)]
pub enum WebhookCommands {
    /// List webhooks of a domain
    List {
        /// Domain ID or DNS name
        #[arg(long)]
        domain: String,

        #[command(flatten)]
        limit: LimitArgs,
    },
}

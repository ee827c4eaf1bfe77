//! CLI module for the billing gateway
//!
//! - `serve`: run the HTTP gateway
//! - `issue-key`: mint a key for an account and print it once
//! - `hash-key`: print the fingerprint stored for a key

pub mod keys;
pub mod serve;

use clap::{Parser, Subcommand};

/// Billing Gateway - API keys, entitlement checks and metered usage
#[derive(Parser)]
#[command(name = "billing-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP gateway
    Serve,

    /// Print a freshly generated API key and its fingerprint (not bound to any account)
    IssueKey(keys::IssueKeyArgs),

    /// Print the fingerprint of a plaintext key
    HashKey(keys::HashKeyArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_issue_key() {
        let cli = Cli::try_parse_from(["billing-gateway", "issue-key", "--account", "cus_1"]).unwrap();

        match cli.command {
            Command::IssueKey(args) => assert_eq!(args.account, "cus_1"),
            _ => panic!("expected issue-key"),
        }
    }

    #[test]
    fn test_parse_hash_key() {
        let cli = Cli::try_parse_from(["billing-gateway", "hash-key", "abc"]).unwrap();

        assert!(matches!(cli.command, Command::HashKey(args) if args.key == "abc"));
    }

    #[test]
    fn test_issue_key_requires_account() {
        assert!(Cli::try_parse_from(["billing-gateway", "issue-key"]).is_err());
    }
}

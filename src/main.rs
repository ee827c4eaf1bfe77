use clap::Parser;
use billing_gateway::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::IssueKey(args) => cli::keys::issue_key(args),
        Command::HashKey(args) => cli::keys::hash_key(args),
    }
}

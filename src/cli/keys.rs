//! Operator key commands

use anyhow::Context;
use clap::Args;

use crate::config::AppConfig;
use crate::domain::account::AccountId;
use crate::domain::api_key::{IssuedKey, KeySource};
use crate::infrastructure::api_key::{KeyHasher, KeyIssuer};

#[derive(Args, Debug)]
pub struct IssueKeyArgs {
    /// Account (billing customer id) to label the output with; the key is not bound to it
    #[arg(long)]
    pub account: String,
}

#[derive(Args, Debug)]
pub struct HashKeyArgs {
    /// Plaintext key to fingerprint
    pub key: String,
}

/// Mint a key the way purchase completion does and print it
///
/// Nothing is persisted or bound: the running gateway keeps its bindings in
/// memory, so the printed key only authorizes once registered there.
pub fn issue_key(args: IssueKeyArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().context("Failed to load configuration")?;

    let issued = mint(&args.account, config.keys.key_bytes)?;

    println!("account:     {}", args.account);
    println!("api_key:     {}", issued.plaintext);
    println!("fingerprint: {}", issued.fingerprint);

    Ok(())
}

pub fn hash_key(args: HashKeyArgs) -> anyhow::Result<()> {
    let fingerprint = KeyHasher::new().hash(&args.key)?;
    println!("{}", fingerprint);
    Ok(())
}

fn mint(account: &str, key_bytes: usize) -> anyhow::Result<IssuedKey> {
    let account = AccountId::new(account)?;
    let issuer = KeyIssuer::new().with_key_bytes(key_bytes)?;

    tracing::debug!(account_id = %account, "Issuing key from the command line");

    Ok(issuer.issue(&|_| false))
}

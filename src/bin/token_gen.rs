use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::Parser;

use stateless_auth::services::auth::TokenService;

/// Mint an HS256 access token for a subject, signed with the service secret.
///
/// Login/registration live outside this service; this is the operator/dev path
/// to obtain a token that the API will accept.
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Token subject (the identity key, e.g. an email)
    #[arg(long)]
    subject: String,

    /// Role to embed in the `roles` claim. Repeatable.
    #[arg(long = "role", value_name = "ROLE")]
    roles: Vec<String>,

    /// Signing secret. Defaults to JWT_SECRET from the environment / .env
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: String,

    /// Token lifetime in seconds
    #[arg(long, env = "JWT_EXPIRATION_SECONDS", default_value_t = 3600)]
    ttl_seconds: u64,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let tokens = TokenService::new(&args.secret, Duration::from_secs(args.ttl_seconds))
        .context("invalid token settings")?;
    let roles: BTreeSet<String> = args.roles.into_iter().collect();
    let token = tokens
        .generate(&args.subject, &roles)
        .context("failed to mint token")?;

    if args.quiet {
        println!("{token}");
        return Ok(());
    }

    let claims = tokens.parse(&token).context("minted token did not verify")?;
    let expires = DateTime::from_timestamp(claims.exp, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| claims.exp.to_string());

    println!("token:   {token}");
    println!("subject: {}", claims.sub);
    println!("roles:   {:?}", claims.roles);
    println!("expires: {expires}");
    println!();
    println!("Authorization: Bearer {token}");

    Ok(())
}

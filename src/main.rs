// src/main.rs

//! token-inspector: inspect OAuth 2.0 and OpenID Connect tokens from the terminal.

#![forbid(unsafe_code)]

mod cli;

use std::io::Read;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use token_inspector::claims::{claim_description, provider_claims};
use token_inspector::display::{render_claim, render_discovery, render_inspection};
use token_inspector::prelude::*;
use token_inspector::signature::KeySummary;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use cli::{ClaimArgs, Cli, Commands, DiscoverArgs, InspectArgs};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so that stdout stays clean for reports and `--json`.
fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => FileConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => FileConfig::default(),
    };

    match cli.command {
        Commands::Inspect(args) => inspect(args, file).await,
        Commands::Discover(args) => discover(args, file).await,
        Commands::Claim(args) => Ok(claim(&args)),
    }
}

async fn inspect(args: InspectArgs, mut file: FileConfig) -> Result<ExitCode> {
    let token = read_token(&args)?;

    // A key source on the command line replaces the one from the file.
    if args.has_key_source() {
        file.issuer_url = None;
        file.jwks_uri = None;
        file.jwks_file = None;
    }
    let mut builder = ConfigBuilder::from_file_config(file)?;
    if let Some(profile) = args.profile {
        builder = builder.profile(profile.into());
    }
    if let Some(leeway) = args.leeway {
        builder = builder.leeway(Duration::from_secs(leeway));
    }
    if let Some(issuer) = &args.issuer {
        builder = builder.issuer_url(issuer)?;
    }
    if let Some(uri) = &args.jwks_uri {
        builder = builder.jwks_uri(uri)?;
    }
    if let Some(path) = &args.jwks_file {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        builder = builder.inline_jwks(text)?;
    }

    let inspector = Inspector::new(builder.build()?)?;
    debug!(?args, "Inspecting token");
    let inspection = match args.now {
        Some(now) => inspector.inspect_at(&token, now).await,
        None => inspector.inspect(&token).await,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    } else {
        print!("{}", render_inspection(&inspection));
    }

    Ok(if inspection.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn discover(args: DiscoverArgs, file: FileConfig) -> Result<ExitCode> {
    let config = ConfigBuilder::from_file_config(FileConfig {
        issuer_url: None,
        jwks_uri: None,
        jwks_file: None,
        ..file
    })?
    .build()?;
    let issuer = Url::parse(args.issuer.trim()).with_context(|| format!("Invalid issuer URL: {}", args.issuer))?;

    let client = JwksClient::new(&config.http)?;
    let document = client.discover(&issuer).await?;

    let keys = if args.keys {
        let jwks = client.fetch_jwks(&document.jwks_url()?).await?;
        jwks.keys.iter().map(KeySummary::from_key).collect()
    } else {
        Vec::new()
    };

    if args.json {
        let output = if args.keys {
            json!({ "configuration": document, "keys": keys })
        } else {
            serde_json::to_value(&document)?
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_discovery(&document));
        for key in &keys {
            println!(
                "  key {} ({}, {}) thumbprint {}",
                key.kid.as_deref().unwrap_or("-"),
                key.kty,
                key.alg.as_deref().unwrap_or("-"),
                key.thumbprint.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn claim(args: &ClaimArgs) -> ExitCode {
    let description = claim_description(&args.name);
    let providers = provider_claims(&args.name);
    print!("{}", render_claim(&args.name, description, &providers));

    if description.is_none() && providers.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Resolve the token from the argument, an environment variable, or stdin.
fn read_token(args: &InspectArgs) -> Result<String> {
    let token = if let Some(token) = &args.token {
        token.clone()
    } else if let Some(var) = &args.token_env {
        std::env::var(var).with_context(|| format!("Environment variable {var} is not set"))?
    } else {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read token from stdin")?;
        buffer
    };

    let token = token.trim().to_string();
    if token.is_empty() {
        bail!("No token provided");
    }
    Ok(token)
}

// src/cli.rs

//! Command-line argument definitions.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use token_inspector::validator::Profile;

/// Inspect OAuth 2.0 and OpenID Connect tokens: decode them, tell ID tokens
/// from access tokens, check their claims and verify their signatures.
#[derive(Debug, Parser)]
#[command(name = "token-inspector")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// YAML configuration file. Command-line flags take precedence.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode, classify and validate a token, verifying its signature when keys are available.
    Inspect(InspectArgs),

    /// Fetch and show an issuer's OpenID configuration.
    Discover(DiscoverArgs),

    /// Show the reference documentation for a claim.
    Claim(ClaimArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProfileArg {
    /// OAuth 2.0 with RFC 9068 JWT access tokens.
    Oauth,
    /// OpenID Connect.
    Oidc,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Oauth => Profile::OAuth,
            ProfileArg::Oidc => Profile::Oidc,
        }
    }
}

#[derive(clap::Args)]
pub struct InspectArgs {
    /// The token to inspect. If omitted, reads from stdin.
    pub token: Option<String>,

    /// Read the token from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME", conflicts_with = "token")]
    pub token_env: Option<String>,

    /// The rule set used to classify and validate the token.
    #[arg(long, value_enum)]
    pub profile: Option<ProfileArg>,

    /// Discover the verification keys from this issuer.
    #[arg(long, value_name = "URL", group = "keys")]
    pub issuer: Option<String>,

    /// Fetch the verification keys from this JWKS endpoint.
    #[arg(long, value_name = "URL", group = "keys")]
    pub jwks_uri: Option<String>,

    /// Read the verification keys from a JWKS file.
    #[arg(long, value_name = "FILE", group = "keys")]
    pub jwks_file: Option<PathBuf>,

    /// Clock skew tolerated for `exp` and `nbf`, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub leeway: Option<u64>,

    /// Evaluate time-based claims at this UNIX timestamp instead of now.
    #[arg(long, value_name = "TIMESTAMP", allow_hyphen_values = true)]
    pub now: Option<i64>,

    /// Print the inspection as JSON.
    #[arg(long)]
    pub json: bool,
}

impl InspectArgs {
    pub fn has_key_source(&self) -> bool {
        self.issuer.is_some() || self.jwks_uri.is_some() || self.jwks_file.is_some()
    }
}

/// Redacts the token.
impl fmt::Debug for InspectArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InspectArgs")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_env", &self.token_env)
            .field("profile", &self.profile)
            .field("issuer", &self.issuer)
            .field("jwks_uri", &self.jwks_uri)
            .field("jwks_file", &self.jwks_file)
            .field("leeway", &self.leeway)
            .field("now", &self.now)
            .field("json", &self.json)
            .finish()
    }
}

#[derive(Debug, clap::Args)]
pub struct DiscoverArgs {
    /// The issuer URL, e.g. https://accounts.google.com
    pub issuer: String,

    /// Also fetch the JWKS and list its keys.
    #[arg(long)]
    pub keys: bool,

    /// Print the discovery document as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct ClaimArgs {
    /// The claim name, e.g. `azp`.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn key_sources_conflict() {
        let result = Cli::try_parse_from([
            "token-inspector",
            "inspect",
            "a.b.c",
            "--issuer",
            "https://id.example.com",
            "--jwks-uri",
            "https://id.example.com/keys",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_inspect_flags() {
        let cli = Cli::try_parse_from(["token-inspector", "inspect", "a.b.c", "--profile", "oidc", "--now", "-5", "--json"])
            .unwrap();
        let Commands::Inspect(args) = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(args.profile.map(Profile::from), Some(Profile::Oidc));
        assert_eq!(args.now, Some(-5));
        assert!(args.json);
        assert!(!args.has_key_source());
    }

    #[test]
    fn debug_redacts_token() {
        let cli = Cli::try_parse_from(["token-inspector", "inspect", "secret.token.value"]).unwrap();
        assert!(!format!("{cli:?}").contains("secret.token.value"));
    }
}

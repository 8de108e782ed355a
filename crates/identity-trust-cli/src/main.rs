//! identity-trust CLI: `itrust` command.
//!
//! Builds registries from configuration files, resolves keys and legal
//! names to well-known parties, and checks ownership of anonymous keys.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use identity_trust::cert::{create_self_signed, ValidityWindow};
use identity_trust::time::micros_to_rfc3339;
use identity_trust::{
    issue_fresh_anonymous_identity, AbstractParty, AnonymousParty, CertPath, CertRole,
    CertifiedIdentity, IdentityRegistry, InMemoryKeyService, IssuanceOptions, KeyService,
    LegalName, Party, PublicKey, RegistryConfig,
};

// ── Parsing helpers ───────────────────────────────────────────────────────────

fn parse_name(s: &str) -> Result<LegalName> {
    s.parse::<LegalName>()
        .with_context(|| format!("invalid legal name '{s}'"))
}

fn parse_key(s: &str) -> Result<PublicKey> {
    PublicKey::from_base64(s).with_context(|| format!("invalid public key '{s}'"))
}

fn load_registry(path: &Path) -> Result<IdentityRegistry> {
    let config = RegistryConfig::load(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    IdentityRegistry::from_config(config).context("configuration failed validation")
}

fn print_party(party: &Party) {
    println!("  Name:        {}", party.name());
    println!("  Fingerprint: {}", party.owning_key().fingerprint());
    println!("  Public Key:  {}", party.owning_key().to_base64());
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// identity-trust CLI: inspect identity registries and certificate paths.
#[derive(Parser, Debug)]
#[command(
    name = "itrust",
    about = "identity-trust CLI",
    version,
    long_about = "itrust: identity-trust CLI\n\nValidate registry configurations, resolve keys and legal names\nto well-known parties, and check ownership of anonymous keys."
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Issue a fresh anonymous identity for a throwaway party
    Demo {
        /// Legal name of the demo party
        #[arg(long, default_value = "O=Alice,L=London,C=GB")]
        name: String,

        /// Write the resulting registry configuration to this file
        #[arg(long)]
        write_config: Option<PathBuf>,
    },

    /// Build a registry from a configuration file and list its identities
    Check {
        /// Registry configuration (JSON)
        config: PathBuf,
    },

    /// Resolve a key or legal name to a well-known party
    Resolve {
        /// Registry configuration (JSON)
        config: PathBuf,

        /// Base64-encoded public key
        #[arg(long, conflicts_with = "name", required_unless_present = "name")]
        key: Option<String>,

        /// Legal name, e.g. "O=Alice,L=London,C=GB"
        #[arg(long)]
        name: Option<String>,
    },

    /// Search well-known parties by name attribute
    Search {
        /// Registry configuration (JSON)
        config: PathBuf,

        /// Text to match against name attributes
        query: String,

        /// Match whole attribute values only
        #[arg(long)]
        exact: bool,
    },

    /// Check that a well-known party owns an anonymous key
    Owner {
        /// Registry configuration (JSON)
        config: PathBuf,

        /// Legal name of the claimed owner
        #[arg(long)]
        owner: String,

        /// Base64-encoded anonymous public key
        #[arg(long)]
        anonymous: String,
    },
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let result = match cli.command {
        Commands::Demo { name, write_config } => {
            cmd_demo(&name, write_config.as_deref(), verbose)
        }
        Commands::Check { config } => cmd_check(&config, verbose),
        Commands::Resolve { config, key, name } => {
            cmd_resolve(&config, key.as_deref(), name.as_deref(), verbose)
        }
        Commands::Search {
            config,
            query,
            exact,
        } => cmd_search(&config, &query, exact, verbose),
        Commands::Owner {
            config,
            owner,
            anonymous,
        } => cmd_owner(&config, &owner, &anonymous, verbose),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `itrust demo [--name NAME] [--write-config FILE]`
fn cmd_demo(name: &str, write_config: Option<&Path>, verbose: bool) -> Result<()> {
    let legal_name = parse_name(name)?;
    let service = InMemoryKeyService::new();
    let registry = IdentityRegistry::new(None);

    let key = service.fresh_key().context("failed to generate issuer key")?;
    let signer = service.signer_for(&key)?;
    let cert = create_self_signed(
        CertRole::NodeCa,
        legal_name,
        signer.as_ref(),
        ValidityWindow::starting_now(Duration::from_secs(365 * 24 * 60 * 60)),
    )
    .context("failed to create issuer certificate")?;
    let issuer = CertifiedIdentity::from_path(CertPath::new(vec![cert])?);
    registry
        .register_identity(issuer.clone())
        .context("failed to register issuer")?;

    let fresh =
        issue_fresh_anonymous_identity(&service, &registry, &issuer, &IssuanceOptions::default())
            .context("failed to issue anonymous identity")?;
    registry
        .assert_ownership(issuer.party(), &fresh.anonymous)
        .context("ownership check failed")?;

    println!("Issuer:");
    print_party(issuer.party());
    println!("Anonymous identity:");
    println!("  Fingerprint: {}", fresh.anonymous.owning_key().fingerprint());
    println!("  Anonymous Key: {}", fresh.anonymous.owning_key().to_base64());
    println!("  Path Length: {}", fresh.path.len());
    println!(
        "  Valid Until: {}",
        micros_to_rfc3339(fresh.certificate.not_after())
    );
    println!("  Owner:       {} (verified)", issuer.name());

    if verbose {
        for (i, cert) in fresh.path.iter().enumerate() {
            println!("  [{i}] {cert}");
        }
    }

    if let Some(path) = write_config {
        registry
            .to_config()
            .save(path)
            .with_context(|| format!("failed to write configuration {}", path.display()))?;
        println!("Configuration written to {}", path.display());
    }
    Ok(())
}

/// `itrust check FILE`
fn cmd_check(config: &Path, verbose: bool) -> Result<()> {
    let registry = load_registry(config)?;
    let identities = registry.all_identities();

    println!("Registry: {}", config.display());
    println!("  Mode:       {}", registry.anchor_mode());
    if let Some(anchor) = registry.trust_anchor() {
        println!("  Trust Anchor: {}", anchor.subject());
    }
    println!("  Identities: {}", identities.len());
    println!(
        "  Anonymous Keys: {}",
        registry.len().saturating_sub(identities.len())
    );

    for party in &identities {
        println!();
        print_party(party);
        if verbose {
            if let Some(identity) = registry.certificate_from_party(party) {
                let leaf = identity.leaf_certificate();
                println!("  Path Length: {}", identity.certificate_path().len());
                println!("  Valid Until: {}", micros_to_rfc3339(leaf.not_after()));
            }
        }
    }
    Ok(())
}

/// `itrust resolve FILE (--key B64 | --name NAME)`
fn cmd_resolve(
    config: &Path,
    key: Option<&str>,
    name: Option<&str>,
    _verbose: bool,
) -> Result<()> {
    let registry = load_registry(config)?;

    let party = match (key, name) {
        (Some(key), _) => {
            let key = parse_key(key)?;
            registry
                .party_from_key(&key)
                .ok_or_else(|| anyhow!("no party registered for key {key}"))?
        }
        (None, Some(name)) => {
            let name = parse_name(name)?;
            registry
                .party_from_name(&name)
                .ok_or_else(|| anyhow!("no party registered under '{name}'"))?
        }
        (None, None) => return Err(anyhow!("either --key or --name is required")),
    };

    println!("Resolved party:");
    print_party(&party);
    Ok(())
}

/// `itrust search FILE QUERY [--exact]`
fn cmd_search(config: &Path, query: &str, exact: bool, _verbose: bool) -> Result<()> {
    let registry = load_registry(config)?;
    let parties = registry.parties_from_name(query, exact);

    if parties.is_empty() {
        println!("No parties match '{query}'.");
        return Ok(());
    }
    println!("{} part(ies) match '{query}':", parties.len());
    for party in &parties {
        println!("  {party}");
    }
    Ok(())
}

/// `itrust owner FILE --owner NAME --anonymous B64`
fn cmd_owner(config: &Path, owner: &str, anonymous: &str, verbose: bool) -> Result<()> {
    let registry = load_registry(config)?;
    let owner_name = parse_name(owner)?;
    let owner = registry
        .party_from_name(&owner_name)
        .ok_or_else(|| anyhow!("no party registered under '{owner_name}'"))?;
    let anonymous = AnonymousParty::new(parse_key(anonymous)?);

    registry
        .assert_ownership(&owner, &anonymous)
        .with_context(|| format!("{owner_name} does not own {anonymous}"))?;

    let resolved = registry
        .require_party_from_anonymous(&AbstractParty::from(anonymous))
        .context("anonymous key is not registered")?;
    println!("{anonymous} is owned by {}", resolved.name());
    if verbose {
        if let Some(path) = registry.path_for_anonymous(&anonymous) {
            for (i, cert) in path.iter().enumerate() {
                println!("  [{i}] {cert}");
            }
        }
    }
    Ok(())
}

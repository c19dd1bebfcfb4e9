//! `attestation-verify`: check a local file against its GitHub artifact attestations.

use std::path::PathBuf;
use std::process;

use attestation_verify::client::ClientConfig;
use attestation_verify::types::HashAlgorithm;
use attestation_verify::{verify, Error, TrustRootSource, VerificationResult, VerifyOptions};
use clap::{Parser, ValueEnum};
use color_eyre::eyre::Result;

/// Verify that a file was built by a GitHub Actions workflow of the expected
/// owner or repository.
#[derive(Parser)]
#[command(name = "attestation-verify", version, about, long_about = None)]
struct Cli {
    /// File to verify.
    file: PathBuf,

    /// Expected repository owner (user or organization). Ignored when --repo is given.
    #[arg(long, required_unless_present = "repo")]
    owner: Option<String>,

    /// Expected repository, as `owner/repo`.
    #[arg(long)]
    repo: Option<String>,

    /// Digest algorithm used to look up attestations.
    #[arg(long, default_value = "sha256")]
    algorithm: HashAlgorithm,

    /// GitHub API token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub REST API base URL (for GitHub Enterprise Server).
    #[arg(long, value_name = "URL", default_value = attestation_verify::client::DEFAULT_API_URL)]
    api_url: String,

    /// Trusted root JSON to verify against instead of the Sigstore public-good root.
    #[arg(long, value_name = "FILE", conflicts_with = "offline")]
    trusted_root: Option<PathBuf>,

    /// Use the embedded Sigstore trusted root instead of fetching it through TUF.
    #[arg(long)]
    offline: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose logging (repeat for more detail: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl Cli {
    fn options(&self) -> VerifyOptions {
        let trust_root = match (&self.trusted_root, self.offline) {
            (Some(path), _) => TrustRootSource::File(path.clone()),
            (None, true) => TrustRootSource::Embedded,
            (None, false) => TrustRootSource::Tuf,
        };

        VerifyOptions {
            algorithm: self.algorithm,
            github_token: self.token.clone(),
            owner: self.owner.clone(),
            repository: self.repo.clone(),
            client: ClientConfig::default().with_api_url(&self.api_url),
            trust_root,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match verify(&cli.file, &cli.options()).await {
        Ok(result) => print_result(&cli, &result),
        Err(Error::NoMatchingAttestation {
            artifact,
            rejections,
        }) => {
            eprintln!("no matching attestation found for {artifact}");
            for rejection in &rejections {
                eprintln!("  [{}] {}", rejection.error.category(), rejection);
            }
            process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn print_result(cli: &Cli, result: &VerificationResult) -> Result<()> {
    match cli.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(result)?),
        Format::Text => {
            let ext = &result.extensions;
            println!("Verified {}", cli.file.display());
            let fields = [
                ("Repository", &ext.source_repository_uri),
                ("Ref", &ext.source_repository_ref),
                ("Commit", &ext.source_repository_digest),
                ("Workflow", &ext.build_signer_uri),
                ("Trigger", &ext.build_trigger),
                ("Run", &ext.run_invocation_uri),
                ("Runner", &ext.runner_environment),
            ];
            for (label, value) in fields {
                if let Some(value) = value {
                    println!("  {label}: {value}");
                }
            }
            println!("  Predicate: {}", result.statement.predicate_type);
        }
    }
    Ok(())
}

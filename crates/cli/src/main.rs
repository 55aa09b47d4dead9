use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use vault_core::config::environment_from_env_value;
use vault_core::{
    normalize_name, standardize, ComplianceStandard, CoreConfig, ExtractionResult,
    RawVaccineEntry, VaultError, VaultResult, VisionEnv,
};
use vault_vision::{extractor_from_config, VisionExtractor};

#[derive(Parser)]
#[command(name = "vault")]
#[command(about = "Personal Vault vaccination compliance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List compliance standards and their required vaccines
    Standards,
    /// Print the canonical vaccine for each name
    Normalise {
        /// Vaccine names as written on a record
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Check an extraction JSON file against a standard
    Check {
        /// Standard id (unknown ids fall back to us_cdc)
        standard: String,
        /// Extraction result, or a bare array of vaccine entries
        extraction_json: PathBuf,
    },
    /// Run the configured extractor on a local image
    Extract {
        /// Image file (JPEG, PNG or PDF)
        image: PathBuf,
        /// Also check the extraction against this standard
        #[arg(long)]
        standard: Option<String>,
    },
}

/// Accepts either a full extraction payload or just its `extracted_vaccines` array.
fn parse_entries(json: &str) -> VaultResult<Vec<RawVaccineEntry>> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(VaultError::Deserialization)?;
    if value.is_array() {
        serde_json::from_value(value).map_err(VaultError::Deserialization)
    } else {
        let extraction: ExtractionResult =
            serde_json::from_value(value).map_err(VaultError::Deserialization)?;
        Ok(extraction.extracted_vaccines)
    }
}

/// Runs `extractor` on the image at `image` and renders the extraction, plus a verdict
/// when `standard` is given.
async fn extract_image(
    extractor: &dyn VisionExtractor,
    image: &Path,
    standard: Option<&str>,
) -> Result<String, Box<dyn Error>> {
    let bytes = std::fs::read(image)?;
    let mime_type = vault_files::detect_media_type(&bytes)
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| "image/jpeg".into());

    let extraction = extractor
        .extract(&bytes, &mime_type)
        .await
        .map_err(|e| format!("Error extracting {}: {}", image.display(), e))?;

    let mut out = serde_json::to_string_pretty(&extraction)?;
    if let Some(standard) = standard {
        let verdict = standardize(standard, &extraction.extracted_vaccines);
        out.push('\n');
        out.push_str(&serde_json::to_string_pretty(&verdict)?);
    }
    Ok(out)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Standards) => {
            for standard in ComplianceStandard::ALL {
                let required: Vec<&str> = standard
                    .required_vaccines()
                    .into_iter()
                    .map(|v| v.as_str())
                    .collect();
                println!(
                    "{} ({}): {}",
                    standard.id(),
                    standard.display_name(),
                    required.join(", ")
                );
            }
        }
        Some(Commands::Normalise { names }) => {
            for name in names {
                println!("{} -> {}", name, normalize_name(&name));
            }
        }
        Some(Commands::Check {
            standard,
            extraction_json,
        }) => {
            let json = std::fs::read_to_string(&extraction_json)?;
            let entries = parse_entries(&json)?;
            let verdict = standardize(&standard, &entries);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Some(Commands::Extract { image, standard }) => {
            let cfg = CoreConfig::new(
                PathBuf::from("."),
                VisionEnv::from_env().resolve()?,
                environment_from_env_value(std::env::var("ENVIRONMENT").ok()),
            )?;
            let extractor = extractor_from_config(&cfg)?;
            let out = extract_image(extractor.as_ref(), &image, standard.as_deref()).await?;
            println!("{}", out);
        }
        None => {
            println!("Use 'vault --help' for commands");
        }
    }

    Ok(())
}

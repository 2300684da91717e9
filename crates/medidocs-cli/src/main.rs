//! Medidocs CLI: browse, preview, download and submit admission documents.
//!
//! Set MEDIDOCS_API_URL (or API_URL) to the file upload endpoint.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use medidocs_api_client::{ApiClient, DeliveryResolver, DocumentFetcher, RecordFetcher, RecordsView};
use medidocs_cli::{format_records_table, init_tracing, save_artifact};
use medidocs_core::mime;
use medidocs_core::models::{Attachment, DocumentType, FileDescriptor, RecordSubmission};
use medidocs_core::{ClientConfig, DeliveryMode, PreviewCapabilities, PreviewState};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "medidocs", about = "Admission document records CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List records grouped by patient admission
    List {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Preview a file: inline types are written to a temporary file, others are downloaded
    Preview {
        /// Storage handle of the file
        file_id: String,
        /// File name shown to the user
        #[arg(long)]
        name: String,
        /// File-type tag (defaults to the name's extension)
        #[arg(long)]
        r#type: Option<String>,
        /// Print the inline data URI instead of materializing a temporary file
        #[arg(long)]
        data_uri: bool,
        /// Directory for files that cannot be previewed
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Download a file to disk
    Download {
        /// Storage handle of the file
        file_id: String,
        /// Suggested file name
        #[arg(long, default_value = "")]
        name: String,
        /// File-type tag (defaults to the name's extension)
        #[arg(long)]
        r#type: Option<String>,
        /// Patient ID, routes the request through the owning admission
        #[arg(long, requires = "admission_id")]
        patient_id: Option<String>,
        /// Admission ID, routes the request through the owning admission
        #[arg(long, requires = "patient_id")]
        admission_id: Option<String>,
        /// Target directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Print the backend preview link for a file
    Link {
        /// Storage handle of the file
        file_id: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Submit a record with one or more files
    Submit {
        #[arg(long)]
        patient_id: String,
        #[arg(long)]
        admission_id: String,
        #[arg(long)]
        hospital_id: String,
        #[arg(long, default_value = "")]
        doctor_id: String,
        /// x-ray, diagnostic_report, prescription, consent_form, surgical_note, pathological, imaging, other
        #[arg(long)]
        document_type: DocumentType,
        #[arg(long, default_value = "")]
        remarks: String,
        /// Files to attach
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Serialize)]
struct DeliveryOutput<'a> {
    file_name: &'a str,
    content_type: &'a str,
    mode: DeliveryMode,
    location: String,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn descriptor_for(file_id: String, name: String, tag: Option<String>) -> FileDescriptor {
    let tag = tag
        .or_else(|| mime::tag_from_file_name(&name).map(str::to_string))
        .unwrap_or_default();
    FileDescriptor::new(Some(file_id), name, tag)
}

async fn download<F: DocumentFetcher>(
    fetcher: F,
    descriptor: &FileDescriptor,
    out: &Path,
) -> anyhow::Result<()> {
    // Downloads never preview, so every type resolves to the raw bytes.
    let resolver = DeliveryResolver::new(fetcher).with_capabilities(PreviewCapabilities::none());
    let resolved = resolver.resolve(descriptor).await?;
    let path = save_artifact(out, &resolved.artifact)?;
    tracing::info!(path = %path.display(), "File saved");
    print_json(&DeliveryOutput {
        file_name: &resolved.artifact.file_name,
        content_type: &resolved.artifact.content_type,
        mode: resolved.mode,
        location: path.display().to_string(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = ClientConfig::from_env()
        .context("Invalid configuration. Set MEDIDOCS_API_URL (or API_URL)")?;
    let client = ApiClient::new(&config).context("Failed to create API client")?;

    match cli.command {
        Commands::List { format } => {
            let mut view = RecordsView::new();
            view.refresh(&client).await?;
            match format {
                OutputFormat::Json => print_json(&view.records())?,
                OutputFormat::Table => print!("{}", format_records_table(view.records())),
            }
        }
        Commands::Preview {
            file_id,
            name,
            r#type,
            data_uri,
            out,
        } => {
            let descriptor = descriptor_for(file_id, name, r#type);
            let resolver = DeliveryResolver::new(&client);
            let mut view = RecordsView::new();

            let resolved = match view.preview_descriptor(&resolver, &descriptor).await {
                PreviewState::Resolved(resolved) => resolved.clone(),
                PreviewState::Failed(err) => return Err(err.clone().into()),
                _ => anyhow::bail!("Preview did not complete"),
            };

            let location = match resolved.mode {
                DeliveryMode::InlinePreview if data_uri => resolved
                    .artifact
                    .payload
                    .as_uri()
                    .unwrap_or_default()
                    .to_string(),
                DeliveryMode::InlinePreview => view.preview_mut().materialize()?,
                _ => save_artifact(&out, &resolved.artifact)?.display().to_string(),
            };

            print_json(&DeliveryOutput {
                file_name: &resolved.artifact.file_name,
                content_type: &resolved.artifact.content_type,
                mode: resolved.mode,
                location,
            })?;

            if resolved.mode == DeliveryMode::InlinePreview && !data_uri {
                // Keep the temporary file around long enough for a viewer to open it.
                tokio::time::sleep(config.preview_revoke_delay()).await;
            }
            view.close_preview();
        }
        Commands::Download {
            file_id,
            name,
            r#type,
            patient_id,
            admission_id,
            out,
        } => {
            let descriptor = descriptor_for(file_id, name, r#type);
            match (patient_id, admission_id) {
                (Some(patient_id), Some(admission_id)) => {
                    let fetcher = RecordFetcher::new(&client, &patient_id, &admission_id);
                    download(fetcher, &descriptor, &out).await?;
                }
                _ => download(&client, &descriptor, &out).await?,
            }
        }
        Commands::Link { file_id, name } => {
            let descriptor = descriptor_for(file_id, name, None);
            let resolved = client.external_link(&descriptor)?;
            print_json(&DeliveryOutput {
                file_name: &resolved.artifact.file_name,
                content_type: &resolved.artifact.content_type,
                mode: resolved.mode,
                location: resolved.artifact.payload.as_uri().unwrap_or_default().to_string(),
            })?;
        }
        Commands::Submit {
            patient_id,
            admission_id,
            hospital_id,
            doctor_id,
            document_type,
            remarks,
            files,
        } => {
            let mut submission =
                RecordSubmission::new(&patient_id, &admission_id, &hospital_id, document_type)
                    .with_doctor(&doctor_id)
                    .with_remarks(&remarks);
            for path in &files {
                let data = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("Failed to read file: {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("file")
                    .to_string();
                submission = submission.with_attachment(Attachment::new(file_name, data));
            }

            let response = client.submit_record(&submission).await?;
            print_json(&response)?;
        }
    }

    Ok(())
}

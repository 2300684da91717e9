use std::path::{Path, PathBuf};

use anyhow::Context;
use medidocs_core::models::AggregatedRecord;
use medidocs_core::{DeliveryArtifact, FALLBACK_FILE_NAME};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render aggregated records as a plain-text table, one row per record.
pub fn format_records_table(records: &[AggregatedRecord]) -> String {
    if records.is_empty() {
        return "No records found\n".to_string();
    }

    let mut out = format!(
        "{:<6} {:<10} {:<12} {:<11} {:<9} {:<18} {:<24} {}\n",
        "Serial", "Patient", "Admission", "Hospital", "Doctor", "Document Type", "Remarks", "Files"
    );
    out.push_str(&"-".repeat(120));
    out.push('\n');

    for (idx, record) in records.iter().enumerate() {
        let files = record
            .files
            .iter()
            .map(|f| match f.retrievable_id() {
                Some(id) => format!("{} [{}]", f.file_name(), id),
                None => format!("{} [no id]", f.file_name()),
            })
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "{:<6} {:<10} {:<12} {:<11} {:<9} {:<18} {:<24} {}\n",
            idx + 1,
            truncate_string(&record.patient_id, 10),
            truncate_string(&record.admission_id, 12),
            truncate_string(&record.hospital_id, 11),
            truncate_string(&record.doctor_id, 9),
            truncate_string(&record.document_type, 18),
            truncate_string(&record.remarks, 24),
            files
        ));
    }

    out
}

/// Strip any directory components from a suggested file name.
pub fn safe_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string()
}

/// Hand a download artifact to the filesystem: write its bytes under `dir`.
pub fn save_artifact(dir: &Path, artifact: &DeliveryArtifact) -> anyhow::Result<PathBuf> {
    let data = artifact.bytes()?;
    let path = dir.join(safe_file_name(&artifact.file_name));
    std::fs::write(&path, &data)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

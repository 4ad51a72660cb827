//! Document management commands
//!
//! Handlers for `docs list`, `docs upload`, and `docs delete`. Uploads are
//! staged into memory first so a failed file aborts the whole batch before
//! anything reaches the backend.

use std::path::PathBuf;

use colored::Colorize;
use prettytable::{row, Table};

use crate::api::{ApiClient, UploadFile};
use crate::error::Result;

/// List indexed documents in a table
pub async fn list(client: &ApiClient) -> Result<()> {
    let documents = client.list_documents().await?;

    if documents.is_empty() {
        println!("{}", "No documents indexed yet.".yellow());
        println!(
            "Add some with {}.",
            "askdocs docs upload <FILES>".cyan()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(row![
        "ID",
        "Filename",
        "Type",
        "Chunks",
        "Embeddings",
        "Uploaded"
    ]);

    for document in &documents {
        table.add_row(row![
            // Full id; delete takes it verbatim.
            document.id,
            display_filename(&document.filename),
            document.content_type,
            document.chunk_count,
            document.embedding_count,
            display_timestamp(&document.created_at)
        ]);
    }

    println!("\nIndexed documents:\n");
    table.printstd();
    println!();
    println!(
        "Use {} to remove a document.",
        "askdocs docs delete <ID>".cyan()
    );
    println!();
    Ok(())
}

/// Upload files for indexing
pub async fn upload(client: &ApiClient, files: &[PathBuf]) -> Result<()> {
    let staged = files
        .iter()
        .map(|path| UploadFile::from_path(path))
        .collect::<Result<Vec<_>>>()?;

    let receipt = client.upload_documents(&staged).await?;

    println!(
        "{}",
        format!("Uploaded {} document(s)", receipt.count).green()
    );
    for document in &receipt.documents {
        println!(
            "  {} ({} chunks, {} embeddings)",
            document.filename.cyan(),
            document.chunk_count,
            document.embedding_count
        );
    }
    Ok(())
}

/// Delete one document by id
pub async fn delete(client: &ApiClient, id: &str) -> Result<()> {
    client.delete_document(id).await?;
    println!("{}", format!("Deleted document {}", id).green());
    Ok(())
}

/// Shorten long filenames so the table stays readable.
fn display_filename(filename: &str) -> String {
    if filename.chars().count() > 40 {
        let kept: String = filename.chars().take(37).collect();
        format!("{}...", kept)
    } else {
        filename.to_string()
    }
}

/// Render the backend timestamp compactly, leaving it untouched when it is
/// not RFC 3339.
fn display_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

//! Wash example demonstrating the marker lifecycle on real files.
//!
//! This example shows how to:
//! - Mark files with a zone through the filesystem store
//! - Load them into a TargetList with a wash preview
//! - Wash them until every marker is gone
//!
//! Run with: cargo run --example wash_files

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use zonewash::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Zonewash Wash Example ===\n");

    let dir = tempfile::tempdir()?;
    let store = Arc::new(FsZoneStore::new());

    // A few "downloads" coming from different zones
    let downloads = [
        ("installer.exe", Some(ZoneId::RESTRICTED)),
        ("report.pdf", Some(ZoneId::INTERNET)),
        ("notes.txt", None),
    ];
    let mut paths = Vec::new();
    for (name, zone) in downloads {
        let path = dir.path().join(name);
        tokio::fs::write(&path, b"payload").await?;
        if let Some(zone) = zone {
            store
                .write(&path, zone, Some("https://downloads.example.com/"))
                .await?;
        }
        paths.push(path);
    }

    let mut targets = TargetList::new();
    let report = targets.add_paths(store.as_ref(), paths.clone()).await;
    println!("Added {} files", report.added.len());

    // Adding the same files again is a no-op
    let report = targets.add_paths(store.as_ref(), paths).await;
    println!("Skipped {} files, already present\n", report.duplicates());

    let orchestrator = BatchOrchestrator::builder()
        .with_arc_store(store.clone())
        .build()?;

    let mut pass = 1;
    while targets.iter().any(FileTarget::needs_wash) {
        println!("--- Pass {pass} ---");
        for target in &targets {
            println!(
                "  {:<15} {:>14} -> {}",
                file_name(target),
                describe(target.current_zone),
                describe(target.next_zone),
            );
        }

        let summary = orchestrator
            .run_batch(
                targets.as_slice(),
                BatchOperation::Wash,
                &CancellationToken::new(),
                |_| {},
            )
            .await?;
        targets.apply(&summary);

        println!("  {summary}\n");
        if summary.counts.washed + summary.counts.removed == 0 {
            // Failed targets keep their zone, so another pass would not help.
            println!("No marker changed in this pass; stopping.");
            return Ok(());
        }
        pass += 1;
    }

    println!("All markers removed.");
    Ok(())
}

fn file_name(target: &FileTarget) -> String {
    target
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn describe(zone: Option<ZoneId>) -> String {
    match zone {
        Some(zone) => format!("{} ({})", zone.value(), zone.name()),
        None => "unmarked".to_string(),
    }
}

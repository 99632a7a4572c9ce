//! Background batch example demonstrating progress and cancellation.
//!
//! This example shows how to:
//! - Start a batch in the background with spawn_batch
//! - Receive per-file progress over a channel
//! - Cancel the batch part way and read the partial summary
//!
//! Run with: cargo run --example background_batch

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use zonewash::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Zonewash Background Batch Example ===\n");

    // A slow in-memory store so the batch is still running when we cancel
    let mut store = MemoryZoneStore::new().with_latency(Duration::from_millis(50));
    let paths: Vec<String> = (0..40).map(|i| format!("/downloads/file{i:02}.bin")).collect();
    for path in &paths {
        store = store.with_file(path.as_str());
    }
    store = store.with_failure("/downloads/file07.bin", ErrorKind::AccessDenied);

    let orchestrator = Arc::new(
        BatchOrchestrator::builder()
            .with_store(store)
            .with_config(BatchConfig::new().with_max_workers(4))
            .build()?,
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = orchestrator.spawn_batch(&paths, BatchOperation::Mark(3), move |item| {
        let _ = tx.send(item.clone());
    })?;
    println!("Started batch {}", handle.id);

    // A second batch is refused while the first runs
    if let Err(e) = orchestrator.spawn_batch(&paths, BatchOperation::Wash, |_| {}) {
        println!("Second batch refused: {e}");
    }

    let mut received = 0;
    while let Some(item) = rx.recv().await {
        received += 1;
        match &item.outcome {
            BatchOutcome::Failed { kind, detail } => {
                println!("  #{:<2} {} failed ({kind}): {detail}", item.index, item.path.display());
            }
            outcome => println!("  #{:<2} {} {:?}", item.index, item.path.display(), outcome),
        }
        if received == 12 {
            println!("Cancelling...");
            handle.cancel();
        }
    }

    let summary = handle.join().await?;
    println!("\n{summary}");
    println!(
        "Attempted {} of {} in {} ms",
        summary.attempted,
        summary.total,
        summary
            .duration()
            .map(|d| d.num_milliseconds())
            .unwrap_or_default()
    );
    println!("Orchestrator state: {}", orchestrator.state().name());

    Ok(())
}

//! End-to-end intake walkthrough against the live services.
//!
//! Usage: cargo run --example intake_flow --features gemini,webhook -- <document> [voucher]
//!
//! Requires GEMINI_API_KEY and LEDGER_WEBHOOK_URL in the environment (a
//! .env file works). The document is classified as an expense, an optional
//! voucher is folded in, and the finalized record is persisted to the
//! in-memory store plus the ledger webhook.

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use treasury_intake::llm::{DocumentExtractor, GeminiClient, DEFAULT_MODEL};
use treasury_intake::*;

fn load_payload(path: &str) -> Result<DocumentPayload> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path))?;
    let mime_type = mime_guess::from_path(path).first_or_octet_stream().to_string();
    Ok(DocumentPayload::new(bytes, mime_type))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env();
    for warning in config.warnings() {
        eprintln!("⚠️  {}", warning);
    }

    let mut args = std::env::args().skip(1);
    let Some(document_path) = args.next() else {
        bail!("usage: intake_flow <document> [voucher]");
    };
    let voucher_path = args.next();

    let Some(api_key) = config.gemini_api_key.clone() else {
        bail!("GEMINI_API_KEY is required for this demo");
    };
    let extractor = DocumentExtractor::new(GeminiClient::new(api_key), DEFAULT_MODEL);

    let mut session = DraftSession::new(Category::Expense);
    let document = load_payload(&document_path)?;

    println!("🔍 Extracting {} ...", document_path);
    match extractor.scan_primary(&mut session, &document).await {
        Ok(()) => println!("   extracted: {:#?}", session.draft().fields),
        Err(err) => println!("   extraction failed ({}), draft left blank for manual entry", err),
    }

    if let Some(path) = voucher_path {
        println!("🧾 Attaching voucher {} ...", path);
        extractor.attach_voucher(&mut session, load_payload(&path)?).await?;
        println!("   voucher amount: {}", session.draft().fields.voucher_amount);
    }

    let ledger_url = config
        .ledger_webhook_url
        .clone()
        .context("LEDGER_WEBHOOK_URL is required for this demo")?;
    let mut pipeline = IntakePipeline::new(MemoryStore::new(), LedgerWebhook::new(ledger_url));

    let outcome = pipeline.submit(session.draft(), Some(&document)).await?;
    println!(
        "💾 Persisted record {} ({:?}, folder {:?})",
        outcome.record.id, outcome.record.operation_state, outcome.record.folder_path.0
    );
    for error in outcome.sync_errors() {
        println!("   sync error: {}", error);
    }

    Ok(())
}

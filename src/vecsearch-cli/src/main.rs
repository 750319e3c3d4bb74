//! Walks through the client API against a live engine:
//! create index → insert one → list → bulk insert → list → KNN search → delete index.
//!
//! Requires `OPENSEARCH_HOSTS`, `OPENSEARCH_USERNAME` and `OPENSEARCH_PASSWORD`.

use anyhow::Result;
use tracing::{error, info, warn};
use vecsearch_rs::{CancellationToken, Client, Config, IndexSettings, SearchResult, VectorDoc};

mod telemetry;

const INDEX_NAME: &str = "test_index";

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = telemetry::init_telemetry()?;

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("vecsearch demo starting");
    info!("  Addresses: {:?}", config.addresses);
    info!("  Verify TLS: {}", !config.insecure_skip_verify);

    let client = match Client::init_global(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build search client: {}", e);
            std::process::exit(1);
        }
    };

    run_demo(client).await;
    Ok(())
}

async fn run_demo(client: &Client) {
    let token = CancellationToken::new();
    let settings = IndexSettings::new(1, 1, 3).body();

    match client.create_index(&token, INDEX_NAME, &settings).await {
        Ok(()) => info!("✓ Created index {}", INDEX_NAME),
        Err(e) => warn!("Create index failed: {}", e),
    }

    let doc = VectorDoc::new("1001", vec![100.0, 100.0, 100.0]);
    match client.insert_document(&token, INDEX_NAME, &doc).await {
        Ok(()) => info!("✓ Inserted document {}", doc.id),
        Err(e) => warn!("Insert failed: {}", e),
    }

    list_all(client).await;

    let docs = vec![
        VectorDoc::new("1002", vec![100.0, 101.0, 101.0]),
        VectorDoc::new("1003", vec![101.0, 101.0, 101.0]),
        VectorDoc::new("1004", vec![101.0, 100.0, 100.0]),
        VectorDoc::new("1005", vec![10.0, 10.0, 10.0]),
        VectorDoc::new("1006", vec![1000.0, 1000.0, 1000.0]),
        VectorDoc::new("1007", vec![1.0, 1.0, 1.0]),
        // Wrong dimension, the engine rejects it
        VectorDoc::new("1008", vec![10011.0, 10011.0, 10011.0, 10011.0]),
        VectorDoc::new("1009", vec![1.0, 2.0, 3.0]),
        VectorDoc::new("1010", vec![10.0, 10.0, 100.0]),
    ];
    match client.bulk_insert_documents(&token, INDEX_NAME, &docs).await {
        Ok(summary) => info!("✓ Bulk inserted {} documents", summary.indexed),
        Err(e) => match e.bulk_failure() {
            Some(failure) => warn!("Bulk insert failed for {:?}", failure.failed_ids()),
            None => warn!("Bulk insert failed: {}", e),
        },
    }

    list_all(client).await;

    match client
        .search_by_knn(&token, INDEX_NAME, &[100.0, 100.0, 100.0], 3)
        .await
    {
        Ok(result) => {
            info!("✓ KNN search returned {:?}", result.ids());
            print_result(&result);
        }
        Err(e) => warn!("KNN search failed: {}", e),
    }

    match client.delete_index(&token, INDEX_NAME).await {
        Ok(()) => info!("✓ Deleted index {}", INDEX_NAME),
        Err(e) => warn!("Delete index failed: {}", e),
    }
}

async fn list_all(client: &Client) {
    match client.get_all_documents(INDEX_NAME).await {
        Ok(result) => {
            info!("Index {} holds {} documents", INDEX_NAME, result.hits.total.value);
            print_result(&result);
        }
        Err(e) => warn!("Listing documents failed: {}", e),
    }
}

fn print_result(result: &SearchResult) {
    match serde_json::to_string_pretty(result) {
        Ok(text) => println!("{}", text),
        Err(e) => warn!("Failed to render search result: {}", e),
    }
}

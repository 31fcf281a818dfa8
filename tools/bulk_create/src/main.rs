use dotenvy::dotenv;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::env;

fn is_dry_run() -> bool {
    !env::args().any(|a| a == "--apply")
}

fn spec_path() -> String {
    env::args()
        .skip(1)
        .find(|a| !a.starts_with("--"))
        .unwrap_or_else(|| "scripts/class_specs.json".to_string())
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    message: String,
    count: usize,
    outcomes: Vec<Outcome>,
}

#[derive(Debug, Deserialize)]
struct Outcome {
    index: usize,
    class_id: Option<String>,
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let api_url = env::var("API_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
    let path = spec_path();

    let contents = std::fs::read_to_string(&path)?;
    let specs: Vec<Value> = serde_json::from_str(&contents)?;

    if is_dry_run() {
        for (i, spec) in specs.iter().enumerate() {
            println!(
                "[DRY RUN] Would submit #{}: {} ({})",
                i,
                spec.get("name").and_then(Value::as_str).unwrap_or("<no name>"),
                spec.get("level").and_then(Value::as_str).unwrap_or("<no level>")
            );
        }
        println!("{} specs read from {}; pass --apply to submit", specs.len(), path);
        return Ok(());
    }

    let client = Client::new();
    let total = specs.len();
    let response: BulkResponse = client
        .post(format!("{}/api/classes/bulk", api_url))
        .json(&serde_json::json!({ "classes": specs }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    for outcome in &response.outcomes {
        match (&outcome.class_id, &outcome.error) {
            (Some(id), _) => println!("#{} created {}", outcome.index, id),
            (None, Some(err)) => println!("#{} skipped: {}", outcome.index, err),
            (None, None) => println!("#{} skipped", outcome.index),
        }
    }

    println!("{} ({} / {})", response.message, response.count, total);

    Ok(())
}

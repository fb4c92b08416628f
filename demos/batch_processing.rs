use realitydefender::utils::file_exists;
use realitydefender::{BatchOptions, Client, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new(Config::from_env()?)?;

    // List of files to analyze - replace with paths to actual files on your system
    let files = vec![
        "images/image1.jpg",
        "images/image2.jpg",
        "images/video1.mp4",
    ];

    let mut valid_files = Vec::new();
    for file in &files {
        if file_exists(file) {
            valid_files.push(*file);
        } else {
            println!("Warning: File does not exist at path: {}", file);
        }
    }

    if valid_files.is_empty() {
        println!("No valid files found. Please provide paths to existing files.");
        return Ok(());
    }

    println!("Processing {} valid files in batch...", valid_files.len());

    let results = client
        .process_batch(
            valid_files,
            BatchOptions {
                max_concurrency: Some(2), // Process 2 files at a time
                max_attempts: Some(60),
                polling_interval: Some(2000),
            },
        )
        .await?;

    println!("\nBatch processing complete!");
    for result in &results {
        println!("\nRequest ID: {}", result.request_id());
        println!("Status: {}", result.status());

        if let Some(score) = result.score() {
            println!("Score: {:.4} ({:.1}%)", score, score * 100.0);
        } else {
            println!("No overall score available");
        }

        if !result.models().is_empty() {
            println!("Model-specific results:");
            for model in result.models() {
                println!(
                    "- {}: Status: {}, Score: {}",
                    model.name,
                    model.status,
                    model
                        .score
                        .map_or("N/A".to_string(), |s| format!("{:.4}", s))
                );
            }
        }
    }

    client.close().await;
    Ok(())
}

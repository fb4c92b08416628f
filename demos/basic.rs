use realitydefender::{Client, Config, GetResultOptions, UploadOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Reads REALITY_DEFENDER_API_KEY (and optionally REALITY_DEFENDER_BASE_URL)
    let client = Client::new(Config::from_env()?)?;

    // Path to the file to analyze - make sure this file exists
    let file_path = "files/test_image.jpg";

    if !std::path::Path::new(file_path).exists() {
        println!("Warning: File does not exist at path: {}", file_path);
        println!("Please provide a valid file path to an existing image or video file.");
        return Ok(());
    }

    println!("Uploading file: {}", file_path);

    let upload_result = client
        .upload(UploadOptions {
            file_path: file_path.to_string(),
        })
        .await?;

    println!(
        "Upload successful! Request ID: {}",
        upload_result.request_id
    );

    // Give up after a minute of polling every two seconds
    println!("Waiting for analysis result...");
    let result = client
        .get_result(
            &upload_result.request_id,
            Some(GetResultOptions {
                polling_interval: Some(2000),
                max_duration: Some(60_000),
                ..Default::default()
            }),
        )
        .await;

    match result {
        Ok(result) => {
            println!("Analysis complete!");
            println!("Status: {}", result.status());

            if let Some(score) = result.score() {
                println!("Score: {:.4} ({:.1}%)", score, score * 100.0);
            } else {
                println!("No overall score available");
            }

            if !result.models().is_empty() {
                println!("\nModel-specific results:");
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
        Err(e) if e.is_timeout() => {
            println!("Analysis still running, check back later: {}", e);
        }
        Err(e) => return Err(e.into()),
    }

    client.close().await;
    Ok(())
}

use realitydefender::{Client, Config, Error};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new(Config::from_env()?)?;

    // Example social media URLs to analyze
    let social_media_urls = vec![
        "https://www.youtube.com/watch?v=6O0fySNw-Lw",
        "https://youtube.com/watch?v=ABC123",
    ];

    println!("🔗 Analyzing social media links...\n");

    for (i, url) in social_media_urls.iter().enumerate() {
        println!("📤 Submitting link {}: {}", i + 1, url);

        // Submit the link and wait with the client's default polling settings
        match client.detect_social_media(url).await {
            Ok(detection_result) => {
                println!("🎯 Analysis completed!");
                println!("   Request ID: {}", detection_result.request_id());
                println!("   Status: {}", detection_result.status());

                if let Some(score) = detection_result.score() {
                    println!("   Overall Score: {:.2}% ({:.3})", score * 100.0, score);

                    let interpretation = match score {
                        s if s < 0.3 => "Likely authentic",
                        s if s < 0.7 => "Uncertain - requires human review",
                        _ => "Likely manipulated",
                    };
                    println!("   Interpretation: {}", interpretation);
                } else {
                    println!("   Score: Not available");
                }

                if !detection_result.models().is_empty() {
                    println!("   Model Results:");
                    for model in detection_result.models() {
                        let model_score = model
                            .score
                            .map(|s| format!("{:.2}% ({:.3})", s * 100.0, s))
                            .unwrap_or_else(|| "N/A".to_string());
                        println!(
                            "     - {}: {} (Score: {})",
                            model.name, model.status, model_score
                        );
                    }
                }
            }
            Err(Error::InvalidRequest(msg)) => {
                eprintln!("❌ Link rejected: {}", msg);
                if msg.contains("http or https scheme") {
                    eprintln!("   💡 Tip: Only HTTP and HTTPS URLs are supported");
                } else if msg.contains("not an IP address") {
                    eprintln!(
                        "   💡 Tip: Social media links must use domain names, not IP addresses"
                    );
                }
            }
            Err(e @ Error::Unauthorized { .. }) => {
                eprintln!("❌ Not allowed: {}", e);
            }
            Err(e) => {
                eprintln!("❌ Analysis failed: {}", e);
            }
        }

        println!();
    }

    println!("🏁 Social media analysis complete!");

    client.close().await;
    Ok(())
}

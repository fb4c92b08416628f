use realitydefender::{Client, Config, DetectionResultPage, GetResultsOptions};

/// Example demonstrating how to retrieve paginated detection results
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new(Config::from_env()?)?;

    println!("Reality Defender SDK - Get Results Example");
    println!("=========================================\n");

    // Example 1: Get first page of results with default settings
    println!("1. Fetching first page of results (default settings):");
    match client.get_results(None).await {
        Ok(results) => print_results(&results),
        Err(e) => eprintln!("Error fetching results: {:?}", e),
    }

    // Example 2: Get results with date and name filters
    println!("\n2. Fetching results with filters:");
    let filtered = GetResultsOptions {
        page_number: Some(0),
        size: Some(5),
        name: Some("test".to_string()),
        start_date: Some("2024-01-01".to_string()),
        end_date: Some("2025-12-31".to_string()),
        ..Default::default()
    };

    match client.get_results(Some(filtered)).await {
        Ok(results) => print_results(&results),
        Err(e) => eprintln!("Error fetching filtered results: {:?}", e),
    }

    // Example 3: Keep fetching until nothing on the page is analyzing
    println!("\n3. Fetching results with polling for completion:");
    let polling_options = GetResultsOptions {
        page_number: Some(0),
        size: Some(5),
        max_attempts: Some(30),
        polling_interval: Some(2000),
        ..Default::default()
    };

    match client.get_results_async(Some(polling_options)).await {
        Ok(results) => print_results(&results),
        Err(e) if e.is_timeout() => eprintln!("Page is still analyzing: {}", e),
        Err(e) => eprintln!("Error fetching results with polling: {:?}", e),
    }

    client.close().await;
    Ok(())
}

fn print_results(results: &DetectionResultPage) {
    println!("Total Results: {}", results.total_items);
    println!(
        "Current Page: {} of {}",
        results.current_page + 1,
        results.total_pages
    );
    println!("Results on this page: {}", results.current_page_items_count);

    if results.items.is_empty() {
        println!("\nNo results found.");
        return;
    }

    println!("\nDetection Results:");
    for (i, result) in results.items.iter().enumerate() {
        println!("\n{}. Request ID: {}", i + 1, result.request_id());
        println!("   Status: {}", result.status());
        match result.score() {
            Some(score) => println!("   Score: {:.4} ({:.1}%)", score, score * 100.0),
            None => println!("   Score: None"),
        }

        if !result.models().is_empty() {
            println!("   Models:");
            for model in result.models() {
                print!("     - {}: {}", model.name, model.status);
                match model.score {
                    Some(model_score) => println!(" (Score: {:.4})", model_score),
                    None => println!(" (Score: None)"),
                }
            }
        }
    }
}

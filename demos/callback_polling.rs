use realitydefender::{Client, Config, UploadOptions};
use std::time::Duration;
use tokio::sync::mpsc;

/// Submits several files and lets the client's scheduler poll for all of
/// them at once, reporting through callbacks.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new(Config::from_env()?)?;

    let files = ["files/test_image.jpg", "files/test_video.mp4"];
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut outstanding = 0;

    for file in files {
        let upload = match client
            .upload(UploadOptions {
                file_path: file.to_string(),
            })
            .await
        {
            Ok(upload) => upload,
            Err(e) => {
                eprintln!("Skipping {}: {}", file, e);
                continue;
            }
        };

        println!("Submitted {} as {}", file, upload.request_id);
        outstanding += 1;

        let on_result = tx.clone();
        let on_error = tx.clone();
        let name = file.to_string();
        let failed_name = name.clone();

        client.poll_for_results(
            &upload.request_id,
            Duration::from_secs(2),
            Duration::from_secs(120),
            move |result| {
                let _ = on_result.send(format!(
                    "{}: {} (score: {})",
                    name,
                    result.status(),
                    result
                        .score()
                        .map_or("N/A".to_string(), |s| format!("{:.4}", s))
                ));
            },
            move |err| {
                let _ = on_error.send(format!("{}: failed: {}", failed_name, err));
            },
        );
    }

    // Polls run in the background; this task only collects their outcomes
    for _ in 0..outstanding {
        if let Some(line) = rx.recv().await {
            println!("{}", line);
        }
    }

    client.close().await;
    Ok(())
}

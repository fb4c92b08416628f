use crate::error::{Error, Result};
use addr::parse_domain_name;
use std::path::Path;
use url::Host;

/// Determine the content type of a file based on its extension, ignoring case
pub fn determine_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("flac") => "audio/flac",
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") | Some("alac") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("ogg") => "audio/ogg",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Check whether a path exists on disk
pub fn file_exists(path: &str) -> bool {
    !path.is_empty() && Path::new(path).exists()
}

/// Validate a social media URL: http(s) scheme and a real domain name
pub fn is_valid_url(url: &str) -> Result<()> {
    let parsed_url = match url::Url::parse(url) {
        Ok(url) => url,
        Err(_) => return Err(Error::InvalidRequest("Invalid URL: ".to_string() + url)),
    };

    match parsed_url.scheme() {
        "http" | "https" => {}
        _ => {
            return Err(Error::InvalidRequest(
                "URL must use http or https scheme".to_string(),
            ))
        }
    }

    let host = match parsed_url.host() {
        Some(Host::Domain(host)) if !host.is_empty() => host,
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {
            return Err(Error::InvalidRequest(
                "URL must use a domain, not an IP address".to_string(),
            ))
        }
        _ => {
            return Err(Error::InvalidRequest(
                "URL must have a valid domain".to_string(),
            ))
        }
    };

    if parse_domain_name(host).is_err() {
        return Err(Error::InvalidRequest(
            "URL must have a valid domain".to_string(),
        ));
    }

    Ok(())
}

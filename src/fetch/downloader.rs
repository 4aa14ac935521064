use crate::config::config::DatasetCfg;
use anyhow::{Context, Result};
use futures::StreamExt;
use reqwest::Client;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

/// Downloads `url` to `dest`, overwriting any prior content.
///
/// An attempt only counts as a success when the HTTP request returned 2xx AND
/// the bytes on disk open as a zip archive; upstream sometimes serves an HTML
/// redirect page with a 200 status.
pub async fn download(client: &Client, url: &str, dest: &Path) -> Result<()> {
    info!("Attempting to download from: {}", url);

    let res = client
        .get(url)
        .send()
        .await
        .context("requesting dataset archive")?;

    if !res.status().is_success() {
        anyhow::bail!("download failed: status={}, url={}", res.status(), url);
    }

    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if content_type.contains("text/html") && !url.ends_with(".zip") {
        warn!("Got HTML response, might be a redirect page");
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("creating {}", dest.display()))?;
    let mut stream = res.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("reading response body")?;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("writing {}", dest.display()))?;
    }
    file.flush().await.context("flushing download")?;
    drop(file);

    validate_archive(dest)?;
    info!("Successfully downloaded valid archive: {}", dest.display());
    Ok(())
}

fn validate_archive(path: &Path) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("reopening {}", path.display()))?;
    zip::ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid zip archive", path.display()))?;
    Ok(())
}

/// Tries the primary URL, then each fallback in order, short-circuiting on
/// the first attempt that yields a valid archive on disk.
pub async fn download_with_fallback(client: &Client, cfg: &DatasetCfg, dest: &Path) -> bool {
    match download(client, &cfg.url, dest).await {
        Ok(()) => return true,
        Err(e) => warn!("Download failed: {:#}", e),
    }

    for url in &cfg.fallback_urls {
        info!("Trying alternative URL: {}", url);
        match download(client, url, dest).await {
            Ok(()) => return true,
            Err(e) => warn!("Download failed: {:#}", e),
        }
    }

    error!("Failed to download dataset after trying all URLs: {}", cfg.url);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_archive_rejects_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("download.zip");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"<html><body>moved</body></html>").unwrap();
        drop(file);

        assert!(validate_archive(&path).is_err());
    }

    #[test]
    fn test_validate_archive_accepts_empty_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("download.zip");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer.finish().unwrap();

        assert!(validate_archive(&path).is_ok());
    }
}

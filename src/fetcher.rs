use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

// async fn in traits is not object safe yet, so go through async_trait
#[async_trait]
pub trait Fetch {
    type Error;
    async fn fetch(&self) -> Result<String, Self::Error>;
}

/// Reads the raw dataset text from an http(s) URL or a `file://` path.
pub async fn retrieve_data(source: impl AsRef<str>) -> Result<String> {
    let name = source.as_ref();
    let text = if name.starts_with("http://") || name.starts_with("https://") {
        UrlFetcher(name).fetch().await?
    } else if name.starts_with("file://") {
        FileFetcher(name).fetch().await?
    } else {
        return Err(anyhow!(
            "unsupported source {name:?}: only http/https/file are supported"
        ));
    };

    info!(source = name, bytes = text.len(), "retrieved dataset");
    Ok(text)
}

struct UrlFetcher<'a>(pub(crate) &'a str);

#[async_trait]
impl<'a> Fetch for UrlFetcher<'a> {
    type Error = anyhow::Error;

    async fn fetch(&self) -> Result<String, Self::Error> {
        debug!(url = self.0, "GET");
        let response = reqwest::get(self.0)
            .await
            .with_context(|| format!("request to {} failed", self.0))?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

struct FileFetcher<'a>(pub(crate) &'a str);

#[async_trait]
impl<'a> Fetch for FileFetcher<'a> {
    type Error = anyhow::Error;

    async fn fetch(&self) -> Result<String, Self::Error> {
        let path = self.0.strip_prefix("file://").unwrap_or(self.0);
        fs::read_to_string(path)
            .await
            .with_context(|| format!("cannot read {path}"))
    }
}

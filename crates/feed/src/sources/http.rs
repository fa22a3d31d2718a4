use async_trait::async_trait;

use crate::error::Result;
use crate::models::ResultsDocument;
use crate::traits::ResultFeed;

/// Results published as JSON over HTTP.
pub struct HttpFeed {
    url: String,
    client: reqwest::Client,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .user_agent(concat!("porra-feed/", env!("CARGO_PKG_VERSION")))
                .build()?,
        })
    }
}

#[async_trait]
impl ResultFeed for HttpFeed {
    async fn fetch(&self) -> Result<ResultsDocument> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let data = response.json::<ResultsDocument>().await?;

        Ok(data)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

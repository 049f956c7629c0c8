//! HTTP link probing for tag validation.

use anyhow::Result;
use async_trait::async_trait;
use doctags_core::validate::LinkChecker;
use reqwest::redirect::Policy;
use std::time::Duration;

use crate::config::ValidationConfig;

/// Issues a `GET` per link with a bounded timeout and redirect budget.
///
/// A redirect past the budget is not followed; its 3xx response is returned
/// as the status.
pub struct HttpLinkChecker {
    client: reqwest::Client,
}

impl HttpLinkChecker {
    pub fn new(config: &ValidationConfig) -> Result<Self> {
        let max_redirects = config.max_redirects;
        let policy = Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.stop()
            } else {
                attempt.follow()
            }
        });
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(policy)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LinkChecker for HttpLinkChecker {
    async fn status(&self, url: &str) -> Result<u16> {
        let resp = self.client.get(url).send().await?;
        Ok(resp.status().as_u16())
    }
}

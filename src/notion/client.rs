//! HTTP client for the Notion pages API

use super::blocks::{paragraph_blocks, Block, TextContent};
use super::{PagePublisher, PublishResult};
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use url::Url;

#[derive(Debug, Serialize)]
struct CreatePageRequest<'a> {
    parent: Parent<'a>,
    properties: Properties,
    children: Vec<Block>,
}

#[derive(Debug, Serialize)]
struct Parent<'a> {
    page_id: &'a str,
}

#[derive(Debug, Serialize)]
struct Properties {
    title: Vec<TitleRun>,
}

#[derive(Debug, Serialize)]
struct TitleRun {
    text: TextContent,
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Error body returned by the Notion API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Creates pages under a fixed parent page
pub struct NotionClient {
    client: Client,
    pages_url: Url,
    version: String,
    api_key: Option<String>,
    parent_page_id: Option<String>,
}

impl NotionClient {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&format!(
            "{}/",
            config.notion.api_url.trim_end_matches('/')
        ))?;
        let pages_url = base_url.join("pages")?;
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            client,
            pages_url,
            version: config.notion.version.clone(),
            api_key: config.api_key.clone(),
            parent_page_id: config.parent_page_id.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.parent_page_id.is_some()
    }

    async fn post_page(&self, api_key: &str, request: &CreatePageRequest<'_>) -> Result<CreatedPage> {
        let response = self
            .client
            .post(self.pages_url.clone())
            .bearer_auth(api_key)
            .header("Notion-Version", &self.version)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Notion(describe_failure(status, &body)));
        }

        Ok(response.json::<CreatedPage>().await?)
    }
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("{}: {}: {}", status, code, message),
        Ok(ApiErrorBody {
            message: Some(message),
            ..
        }) => format!("{}: {}", status, message),
        _ => status.to_string(),
    }
}

#[async_trait]
impl PagePublisher for NotionClient {
    async fn create_page(&self, title: &str, content: &str, source_path: &str) -> PublishResult {
        let (Some(api_key), Some(parent_page_id)) = (&self.api_key, &self.parent_page_id) else {
            warn!("Notion API key or parent page ID not configured");
            return PublishResult::not_configured();
        };

        let request = CreatePageRequest {
            parent: Parent {
                page_id: parent_page_id,
            },
            properties: Properties {
                title: vec![TitleRun {
                    text: TextContent::new(title),
                }],
            },
            children: paragraph_blocks(content),
        };

        debug!(
            "Creating page '{}' from {} with {} blocks",
            title,
            source_path,
            request.children.len()
        );

        match self.post_page(api_key, &request).await {
            Ok(page) => {
                info!(
                    "Created Notion page for {} ({})",
                    source_path,
                    page.id.as_deref().unwrap_or("unknown id")
                );
                PublishResult::created(page.id, page.url)
            }
            Err(e) => {
                error!("Failed to create Notion page for {}: {}", source_path, e);
                PublishResult::failed(e.to_string())
            }
        }
    }
}

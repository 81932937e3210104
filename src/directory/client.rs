use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use futures::stream;
use reqwest::header::AUTHORIZATION;
use tracing::debug;

use super::atom;
use super::connection::ConnectionString;
use super::records::{NamespaceProperties, QueueRecord, RuleRecord, SubscriptionRecord, TopicRecord};
use super::{Connector, DirectoryService, Pages};
use crate::config::ClientSettings;
use crate::utils::{ExportError, Result};

/// Longest slice of an error response body kept in `ExportError::Status`.
const ERROR_BODY_LIMIT: usize = 512;

/// Opens an `HttpDirectory` per connection string.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    settings: ClientSettings,
}

impl HttpConnector {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

impl Connector for HttpConnector {
    type Directory = HttpDirectory;

    fn connect(&self, connection: &str) -> Result<HttpDirectory> {
        HttpDirectory::new(connection.parse()?, &self.settings)
    }
}

/// `DirectoryService` backed by the namespace management REST API.
///
/// Listings page with `$skip`/`$top`; a page shorter than the configured
/// page size is the last one. Every request is signed with a fresh shared
/// access signature.
#[derive(Debug)]
pub struct HttpDirectory {
    connection: ConnectionString,
    client: reqwest::Client,
    api_version: String,
    page_size: usize,
    token_ttl: Duration,
}

impl HttpDirectory {
    pub fn new(connection: ConnectionString, settings: &ClientSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            connection,
            client,
            api_version: settings.api_version.clone(),
            page_size: settings.page_size.max(1),
            token_ttl: Duration::from_secs(settings.token_ttl_secs),
        })
    }

    pub fn host(&self) -> &str {
        &self.connection.host
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.connection.base_url(), path);
        let expiry = Utc::now().timestamp() + self.token_ttl.as_secs() as i64;
        let authorization = self.connection.authorization(expiry)?;

        let response = self
            .client
            .get(&url)
            .query(&[("api-version", self.api_version.as_str())])
            .query(query)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExportError::Status {
                url,
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        Ok(body)
    }

    fn pages<T>(&self, path: String, decode: fn(&str) -> Result<Vec<T>>) -> Pages<'_, T>
    where
        T: Send + 'static,
    {
        // State is the offset of the next page; `None` once the listing is done.
        stream::try_unfold(Some(0usize), move |skip| {
            let path = path.clone();
            async move {
                match skip {
                    Some(skip) => self.fetch_page(&path, skip, decode).await,
                    None => Ok(None),
                }
            }
        })
        .boxed()
    }

    async fn fetch_page<T>(
        &self,
        path: &str,
        skip: usize,
        decode: fn(&str) -> Result<Vec<T>>,
    ) -> Result<Option<(Vec<T>, Option<usize>)>> {
        let query = [("$skip", skip.to_string()), ("$top", self.page_size.to_string())];
        let body = self.get(path, &query).await?;
        let page = decode(&body)?;
        debug!(path, skip, count = page.len(), "fetched page");

        if page.is_empty() {
            return Ok(None);
        }
        let next = (page.len() >= self.page_size).then_some(skip + page.len());
        Ok(Some((page, next)))
    }
}

#[async_trait]
impl DirectoryService for HttpDirectory {
    async fn namespace_properties(&self) -> Result<NamespaceProperties> {
        let body = self.get("$namespaceinfo", &[]).await?;
        atom::decode_namespace(&body)
    }

    fn list_queues(&self) -> Pages<'_, QueueRecord> {
        self.pages("$Resources/Queues".to_string(), atom::decode_queues)
    }

    fn list_topics(&self) -> Pages<'_, TopicRecord> {
        self.pages("$Resources/Topics".to_string(), atom::decode_topics)
    }

    fn list_subscriptions(&self, topic: &str) -> Pages<'_, SubscriptionRecord> {
        self.pages(format!("{topic}/Subscriptions"), atom::decode_subscriptions)
    }

    fn list_rules(&self, topic: &str, subscription: &str) -> Pages<'_, RuleRecord> {
        self.pages(
            format!("{topic}/Subscriptions/{subscription}/Rules"),
            atom::decode_rules,
        )
    }
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

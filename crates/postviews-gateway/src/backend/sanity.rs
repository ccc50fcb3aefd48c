//! Sanity Content Lake client.
//!
//! [`SanityStore`] implements [`ContentStore`] over the HTTP query and mutate
//! APIs:
//!
//! - `GET  {host}/v{api_version}/data/query/{dataset}?query=…&$param=…`
//! - `POST {host}/v{api_version}/data/mutate/{dataset}`
//!
//! The counter lookup and all mutations go to the live API with the write
//! token. Listings may use the CDN host without credentials.
//!
//! Responses are decoded into typed projections here; nothing above this
//! module sees raw JSON.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postviews_kernel::{ContentStore, PostId, PostSummary, StoreError, ViewRecord};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::config::SanityConfig;

const VIEWS_QUERY: &str = r#"*[_type == "post" && _id == $postId][0]{ views }"#;

const POSTS_QUERY: &str = r#"*[_type == "post" && defined(slug.current)]{
    _id,
    title,
    "slug": slug.current,
    "views": coalesce(views, 0),
    publishedAt
}"#;

/// Envelope of every query response.
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct MutateResponse {
    #[serde(rename = "transactionId", default)]
    transaction_id: Option<String>,
}

/// Listing projection as Sanity returns it.
#[derive(Debug, Deserialize)]
struct SanityPost {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    views: Option<u64>,
    #[serde(rename = "publishedAt", default)]
    published_at: Option<DateTime<Utc>>,
}

impl SanityPost {
    fn into_summary(self) -> Option<PostSummary> {
        let id = match PostId::parse(&self.id) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "skipping post with unusable id");
                return None;
            }
        };
        Some(PostSummary {
            id,
            title: self.title.unwrap_or_default(),
            slug: self.slug?,
            views: self.views.unwrap_or(0),
            published_at: self.published_at,
        })
    }
}

/// [`ContentStore`] talking to a Sanity project.
pub struct SanityStore {
    client: Client,
    api_base: String,
    read_base: String,
    dataset: String,
    write_token: Option<String>,
}

impl SanityStore {
    /// Build a client for the project described by `config`.
    pub fn new(config: &SanityConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let api_base = format!(
            "https://{}.api.sanity.io/v{}",
            config.project_id, config.api_version
        );
        let read_base = if config.use_cdn_for_reads {
            format!(
                "https://{}.apicdn.sanity.io/v{}",
                config.project_id, config.api_version
            )
        } else {
            api_base.clone()
        };

        Ok(Self::with_bases(
            client,
            api_base,
            read_base,
            config.dataset.clone(),
            config.write_token.clone(),
        ))
    }

    /// Point the client at explicit hosts (e.g. a local fake of the API).
    pub fn with_bases(
        client: Client,
        api_base: impl Into<String>,
        read_base: impl Into<String>,
        dataset: impl Into<String>,
        write_token: Option<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            read_base: read_base.into().trim_end_matches('/').to_string(),
            dataset: dataset.into(),
            write_token: write_token.filter(|t| !t.trim().is_empty()),
        }
    }

    fn query_url(&self, base: &str) -> String {
        format!("{}/data/query/{}", base, self.dataset)
    }

    fn mutate_url(&self) -> String {
        format!("{}/data/mutate/{}", self.api_base, self.dataset)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.write_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn query<T>(
        &self,
        builder: RequestBuilder,
        params: &[(&str, String)],
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .query(params)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: QueryResponse<T> = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(envelope.result)
    }

    async fn mutate(&self, mutations: Vec<serde_json::Value>) -> Result<(), StoreError> {
        let token = self
            .write_token
            .as_deref()
            .ok_or(StoreError::MissingCredential)?;

        let response = self
            .client
            .post(self.mutate_url())
            .bearer_auth(token)
            .json(&json!({ "mutations": mutations }))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: MutateResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        debug!(transaction_id = ?body.transaction_id, "mutation committed");
        Ok(())
    }
}

fn patch_views(id: &PostId, views: u64) -> serde_json::Value {
    json!({ "patch": { "id": id.as_str(), "set": { "views": views } } })
}

/// GROQ parameters are JSON-encoded values.
fn param(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[async_trait]
impl ContentStore for SanityStore {
    #[instrument(skip(self), fields(dataset = %self.dataset))]
    async fn fetch_views(&self, id: &PostId) -> Result<Option<ViewRecord>, StoreError> {
        let builder = self.authorized(self.client.get(self.query_url(&self.api_base)));
        self.query(
            builder,
            &[
                ("query", VIEWS_QUERY.to_string()),
                ("$postId", param(id.as_str())),
            ],
        )
        .await
    }

    #[instrument(skip(self), fields(dataset = %self.dataset))]
    async fn set_views(&self, id: &PostId, views: u64) -> Result<(), StoreError> {
        self.mutate(vec![patch_views(id, views)]).await
    }

    #[instrument(skip(self), fields(dataset = %self.dataset))]
    async fn list_posts(&self) -> Result<Vec<PostSummary>, StoreError> {
        let builder = self.client.get(self.query_url(&self.read_base));
        let posts: Vec<SanityPost> = self
            .query(builder, &[("query", POSTS_QUERY.to_string())])
            .await?;
        Ok(posts.into_iter().filter_map(SanityPost::into_summary).collect())
    }

    #[instrument(skip(self, updates), fields(dataset = %self.dataset, count = updates.len()))]
    async fn set_views_batch(&self, updates: &[(PostId, u64)]) -> Result<(), StoreError> {
        if updates.is_empty() {
            return Ok(());
        }
        // One request is one transaction on Sanity's side.
        let mutations = updates
            .iter()
            .map(|(id, views)| patch_views(id, *views))
            .collect();
        self.mutate(mutations).await
    }

    #[instrument(skip(self), fields(dataset = %self.dataset))]
    async fn most_viewed(&self, limit: usize) -> Result<Vec<PostSummary>, StoreError> {
        // `limit` is a clamped integer, safe to splice into the slice.
        let groq = format!(
            r#"*[_type == "post" && defined(slug.current) && views > 0]
    | order(views desc, publishedAt desc)[0...{limit}]{{
    _id,
    title,
    "slug": slug.current,
    views,
    publishedAt
}}"#
        );
        let builder = self.client.get(self.query_url(&self.read_base));
        let posts: Vec<SanityPost> = self.query(builder, &[("query", groq)]).await?;
        Ok(posts.into_iter().filter_map(SanityPost::into_summary).collect())
    }
}

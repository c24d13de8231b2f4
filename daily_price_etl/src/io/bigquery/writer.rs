use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;

use crate::io::bigquery::auth::TokenProvider;
use crate::io::sink::{InsertBatch, LoadError, RowInsertError, TableWriter};
use crate::models::table::TableRef;

pub const DEFAULT_API_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct InsertAllResponse {
    #[serde(default)]
    insert_errors: Vec<RowInsertError>,
}

/// Writes batches through `tabledata.insertAll`.
///
/// One instance is meant to live for the whole run so the connection pool and
/// the cached access token are shared across symbols.
pub struct BigQueryWriter {
    client: Client,
    api_url: String,
    tokens: TokenProvider,
}

impl BigQueryWriter {
    pub fn new(api_url: impl Into<String>, tokens: TokenProvider) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(WRITE_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            tokens,
        })
    }

    fn insert_all_url(&self, table: &TableRef) -> String {
        format!(
            "{}/projects/{}/datasets/{}/tables/{}/insertAll",
            self.api_url.trim_end_matches('/'),
            table.project,
            table.dataset,
            table.table
        )
    }
}

#[async_trait]
impl TableWriter for BigQueryWriter {
    async fn insert_all(
        &self,
        table: &TableRef,
        batch: &InsertBatch,
    ) -> Result<Vec<RowInsertError>, LoadError> {
        let token = self.tokens.access_token(&self.client).await?;
        let request_error = |source: reqwest::Error| LoadError::Request {
            table: table.to_string(),
            source,
        };

        debug!(%table, rows = batch.len(), "submitting insertAll");
        let response = self
            .client
            .post(self.insert_all_url(table))
            .bearer_auth(token.expose_secret())
            .json(batch)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LoadError::Status {
                table: table.to_string(),
                status,
                body,
            });
        }

        let payload: InsertAllResponse = response.json().await.map_err(request_error)?;
        Ok(payload.insert_errors)
    }
}

//! Implements the `Backend` trait against the hosted service's REST row API.

use crate::api::Backend;
use crate::model::{Column, Row, Sheet, SheetType};
use crate::{Config, Result};
use anyhow::{bail, Context};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::trace;

/// Path of the sheets collection under the service's REST root.
const SHEETS_PATH: &str = "rest/v1/spreadsheets";

/// Path of the rows collection under the service's REST root.
const ROWS_PATH: &str = "rest/v1/rows";

/// Column selection that embeds each sheet's rows in the response.
const SELECT_WITH_ROWS: &str = "*,rows(*)";

/// Implements the `Backend` trait over HTTP. The API key comes from the
/// injected `Config` and is attached to every request; token refresh and
/// timeouts are the transport's concern.
pub(super) struct RestBackend {
    config: Config,
    client: reqwest::Client,
}

impl RestBackend {
    pub(super) fn new(config: Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(config.api_key())
            .context("The API key contains invalid header characters")?;
        headers.insert("apikey", api_key);
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
            .context("The API key contains invalid header characters")?;
        headers.insert(AUTHORIZATION, bearer);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Unable to build the HTTP client")?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.backend_url().trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl Backend for RestBackend {
    async fn fetch_all_sheets(&self) -> Result<Vec<Sheet>> {
        trace!("fetch_all_sheets");
        let response = self
            .client
            .get(self.url(SHEETS_PATH))
            .query(&[("select", SELECT_WITH_ROWS), ("order", "createdAt.desc")])
            .send()
            .await
            .context("Failed to send the sheets request")?;
        let response = ensure_success(response, "Fetching sheets").await?;
        response
            .json()
            .await
            .context("Failed to parse the sheets response")
    }

    async fn fetch_sheet_by_id(&self, id: &str) -> Result<Option<Sheet>> {
        trace!("fetch_sheet_by_id {id}");
        let id_filter = format!("eq.{id}");
        let response = self
            .client
            .get(self.url(SHEETS_PATH))
            .query(&[("select", SELECT_WITH_ROWS), ("id", id_filter.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send the request for sheet {id}"))?;
        let response = ensure_success(response, "Fetching the sheet").await?;
        let sheets: Vec<Sheet> = response
            .json()
            .await
            .context("Failed to parse the sheet response")?;
        Ok(sheets.into_iter().next())
    }

    async fn rename_sheet(&self, id: &str, name: &str) -> Result<()> {
        trace!("rename_sheet {id}");
        let id_filter = format!("eq.{id}");
        let response = self
            .client
            .patch(self.url(SHEETS_PATH))
            .query(&[("id", id_filter.as_str())])
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await
            .with_context(|| format!("Failed to send the rename request for sheet {id}"))?;
        ensure_success(response, "Renaming the sheet").await?;
        Ok(())
    }

    async fn delete_sheet(&self, id: &str) -> Result<()> {
        trace!("delete_sheet {id}");
        let id_filter = format!("eq.{id}");
        let response = self
            .client
            .delete(self.url(SHEETS_PATH))
            .query(&[("id", id_filter.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send the delete request for sheet {id}"))?;
        ensure_success(response, "Deleting the sheet").await?;
        Ok(())
    }

    async fn create_sheet(
        &self,
        name: &str,
        kind: SheetType,
        columns: &[Column],
    ) -> Result<String> {
        trace!("create_sheet '{name}' ({kind})");
        let response = self
            .client
            .post(self.url(SHEETS_PATH))
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({
                "name": name,
                "type": kind,
                "columns": columns,
            }))
            .send()
            .await
            .context("Failed to send the create request")?;
        let response = ensure_success(response, "Creating the sheet").await?;

        // The service answers an insert with the array of created records.
        let created: Vec<serde_json::Value> = response
            .json()
            .await
            .context("Failed to parse the create response")?;
        created
            .first()
            .and_then(|record| record.get("id"))
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .context("The create response is missing the new sheet id")
    }

    async fn insert_rows(&self, sheet_id: &str, rows: &[Row]) -> Result<()> {
        trace!("insert_rows into {sheet_id} ({} rows)", rows.len());
        let mut payload = Vec::with_capacity(rows.len());
        for row in rows {
            let mut value = serde_json::to_value(row).context("Unable to serialize a row")?;
            if let serde_json::Value::Object(record) = &mut value {
                record.insert(
                    "spreadsheetId".to_string(),
                    serde_json::Value::String(sheet_id.to_string()),
                );
            }
            payload.push(value);
        }
        let response = self
            .client
            .post(self.url(ROWS_PATH))
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to send the insert request for sheet {sheet_id}"))?;
        ensure_success(response, "Inserting rows").await?;
        Ok(())
    }
}

/// Turns a non-success response into an error carrying the status and body.
async fn ensure_success(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());
        bail!("{what} failed with status {status}: {body}");
    }
    Ok(response)
}

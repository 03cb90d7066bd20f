//! Google Sheets adapter over the v4 `values` REST API.
//!
//! Authentication is a pre-issued OAuth access token; minting it from a
//! service account is left to the caller (e.g. `gcloud auth print-access-token`).

use super::{column_letters, TabularStore};
use crate::config::SheetConfig;
use crate::error::ScrapeError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use wreq::Client;

const SHEETS_API: &str = "https://sheets.googleapis.com";

/// Environment variable holding the OAuth access token.
pub const TOKEN_ENV: &str = "GROCER_SHEETS_TOKEN";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: [[&'a str; 1]; 1],
}

pub struct GoogleSheet {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    worksheet: String,
    token: String,
}

impl GoogleSheet {
    /// Builds a sheet from config plus a token; either missing is a configuration error.
    pub fn from_config(sheet: &SheetConfig, token: Option<String>) -> Result<Self> {
        let spreadsheet_id = sheet
            .spreadsheet_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ScrapeError::config("no spreadsheet_id configured"))?;
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ScrapeError::config(format!("{} is not set", TOKEN_ENV)))?;

        Self::with_base_url(SHEETS_API.to_string(), spreadsheet_id, sheet.worksheet.clone(), token)
    }

    /// Creates a sheet client against a custom API base URL (for testing).
    pub fn with_base_url(
        base_url: String,
        spreadsheet_id: String,
        worksheet: String,
        token: String,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, base_url, spreadsheet_id, worksheet, token })
    }

    /// A1 range on this worksheet; the sheet name is quoted so spaces are safe.
    fn range(&self, cell: Option<&str>) -> String {
        let quoted = format!("'{}'", self.worksheet.replace('\'', "''"));
        match cell {
            Some(cell) => format!("{}!{}", quoted, cell),
            None => quoted,
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url,
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(range)
        )
    }
}

#[async_trait]
impl TabularStore for GoogleSheet {
    async fn read_all_rows(&mut self) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(&self.range(None));
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to reach Google Sheets")?;

        let status = response.status();
        if matches!(status.as_u16(), 400 | 401 | 403 | 404) {
            return Err(ScrapeError::config(format!(
                "cannot open worksheet '{}' of spreadsheet {} (status {})",
                self.worksheet, self.spreadsheet_id, status
            ))
            .into());
        }
        if !status.is_success() {
            anyhow::bail!("Google Sheets read failed with status: {}", status);
        }

        let body = response.text().await.context("Failed to read response body")?;
        let range: ValueRange =
            serde_json::from_str(&body).context("Unexpected Google Sheets response")?;

        info!("Read {} rows from '{}'", range.values.len(), self.worksheet);
        Ok(range.values)
    }

    async fn write_cell(&mut self, row: usize, col: usize, value: &str) -> Result<()> {
        if row == 0 || col == 0 {
            anyhow::bail!("Cell addresses are 1-based, got ({}, {})", row, col);
        }

        let range = self.range(Some(&format!("{}{}", column_letters(col), row)));
        let url = format!("{}?valueInputOption=USER_ENTERED", self.values_url(&range));
        let body = serde_json::to_string(&ValueUpdate {
            range: &range,
            major_dimension: "ROWS",
            values: [[value]],
        })?;

        debug!("PUT {} = {:?}", range, value);

        let response = self
            .client
            .put(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .context("Failed to reach Google Sheets")?;

        if !response.status().is_success() {
            anyhow::bail!("Google Sheets write to {} failed with status: {}", range, response.status());
        }

        Ok(())
    }
}

//! Best-effort calls to the remote purchase-order backend.
//!
//! Nothing here feeds back into local state: results are only used to decide
//! which notice to show and what to log.

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::models::{ExportRecord, PurchaseOrder};

pub const CREATE_PATH: &str = "/api/purchase-orders";
pub const EXPORT_PATH: &str = "/api/export-to-snowflake";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Delivered,
    Rejected(u16),
    Unreachable(String),
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Transmitted { count: usize },
    LocalFallback { reason: String, records: Vec<ExportRecord> },
}

impl ExportOutcome {
    pub fn notice(&self) -> String {
        match self {
            ExportOutcome::Transmitted { count } => {
                format!("Successfully exported {} purchase orders.", count)
            }
            ExportOutcome::LocalFallback { .. } => {
                "Backend not connected. The export was not transmitted; review the locally prepared export data below.".to_string()
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequest<'a> {
    purchase_orders: &'a [PurchaseOrder],
}

#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: Option<String>,
}

impl RemoteClient {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    /// A client with no remote configured; every call is skipped or falls back.
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            base_url: None,
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// POSTs a newly created record. Failures are logged and swallowed.
    pub async fn push_created(&self, record: &PurchaseOrder) -> SyncOutcome {
        let Some(base_url) = &self.base_url else {
            log::debug!("No remote configured, {} saved locally only", record.po_number);
            return SyncOutcome::Skipped;
        };

        let url = format!("{}{}", base_url, CREATE_PATH);
        match self.client.post(&url).json(record).send().await {
            Ok(response) if response.status().is_success() => {
                log::info!("Synced purchase order {} to {}", record.po_number, url);
                SyncOutcome::Delivered
            }
            Ok(response) => {
                let status = response.status().as_u16();
                log::warn!("Backend answered {} for {}, saved locally only", status, record.po_number);
                SyncOutcome::Rejected(status)
            }
            Err(e) => {
                log::warn!("Backend not available, saved locally only: {}", e);
                SyncOutcome::Unreachable(e.to_string())
            }
        }
    }

    /// Runs [`push_created`](Self::push_created) in the background. The save
    /// that triggered it has already completed.
    pub fn spawn_push_created(&self, record: PurchaseOrder) -> JoinHandle<SyncOutcome> {
        let remote = self.clone();
        tokio::spawn(async move { remote.push_created(&record).await })
    }

    /// Sends the whole collection to the bulk export endpoint. Any failure
    /// produces the locally shaped export records instead.
    pub async fn export_all(&self, records: &[PurchaseOrder]) -> ExportOutcome {
        match self.try_export(records).await {
            Ok(()) => {
                log::info!("Exported {} purchase orders", records.len());
                ExportOutcome::Transmitted { count: records.len() }
            }
            Err(reason) => {
                log::warn!("Export failed: {}", reason);
                let records: Vec<ExportRecord> = records.iter().map(ExportRecord::from).collect();
                match serde_json::to_string_pretty(&records) {
                    Ok(payload) => log::info!("Data ready for export:\n{}", payload),
                    Err(e) => log::warn!("Could not render export payload: {}", e),
                }
                ExportOutcome::LocalFallback { reason, records }
            }
        }
    }

    async fn try_export(&self, records: &[PurchaseOrder]) -> Result<(), String> {
        let base_url = self
            .base_url
            .as_ref()
            .ok_or_else(|| "no remote endpoint configured".to_string())?;

        let url = format!("{}{}", base_url, EXPORT_PATH);
        let response = self
            .client
            .post(&url)
            .json(&ExportRequest { purchase_orders: records })
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("{} answered {}", url, response.status()))
        }
    }
}

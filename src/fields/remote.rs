//! Persistence of fields on the remote fields service.

use crate::core::constants::FIELDS_ENDPOINT;
use crate::data::geojson::BoundaryGeometry;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};

/// Shared client so connection pooling survives across requests
static HTTP_CLIENT: Lazy<Client> = Lazy::new(Client::new);

/// Field as exchanged with the fields service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub id: String,
    pub name: String,
    pub boundary: BoundaryGeometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_acres: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Remote collaborator that stores fields
#[async_trait(?Send)]
pub trait FieldRemote {
    async fn save_field(&self, record: &FieldRecord) -> Result<()>;

    /// Every stored field. Entries that cannot be decoded are skipped.
    async fn load_fields(&self) -> Result<Vec<FieldRecord>>;
}

/// The service answers either with a bare array or wrapped in `{"fields": …}`
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldListing {
    Bare(Vec<serde_json::Value>),
    Wrapped { fields: Vec<serde_json::Value> },
}

/// [`FieldRemote`] speaking JSON over HTTP to `{base}/api/v1/fields`
#[derive(Debug, Clone)]
pub struct HttpFieldRemote {
    client: Client,
    endpoint: Url,
}

impl HttpFieldRemote {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(HTTP_CLIENT.clone(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| Error::ParseError(format!("invalid API base URL {:?}: {}", base_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(FIELDS_ENDPOINT)
            .map_err(|e| Error::ParseError(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(Error::Remote {
        status: status.as_u16(),
        message,
    })
}

fn decode_listing(listing: FieldListing) -> Vec<FieldRecord> {
    let entries = match listing {
        FieldListing::Bare(entries) | FieldListing::Wrapped { fields: entries } => entries,
    };
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<FieldRecord>(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("skipping malformed field record: {}", e);
                None
            }
        })
        .collect()
}

#[async_trait(?Send)]
impl FieldRemote for HttpFieldRemote {
    async fn save_field(&self, record: &FieldRecord) -> Result<()> {
        log::debug!("POST {} ({})", self.endpoint, record.id);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(record)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn load_fields(&self) -> Result<Vec<FieldRecord>> {
        log::debug!("GET {}", self.endpoint);
        let response = self.client.get(self.endpoint.clone()).send().await?;
        let listing: FieldListing = check_status(response).await?.json().await?;
        let records = decode_listing(listing);
        log::info!("loaded {} field records", records.len());
        Ok(records)
    }
}

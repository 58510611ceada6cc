// Azure Blob Storage download adapter

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use sha2::Sha256;
use url::Url;

use crate::services::{BlobContent, BlobStore};

const STORAGE_API_VERSION: &str = "2023-11-03";

type HmacSha256 = Hmac<Sha256>;

/// How blob requests are authorized
///
/// A shared access signature wins when a connection string carries both.
#[derive(Clone, PartialEq, Eq)]
pub enum BlobCredential {
    Sas(String),
    SharedKey { account: String, key: Vec<u8> },
    Anonymous,
}

impl fmt::Debug for BlobCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sas(_) => f.write_str("Sas(..)"),
            Self::SharedKey { account, .. } => write!(f, "SharedKey {{ account: {account}, .. }}"),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

impl BlobCredential {
    /// `SharedKey` authorization header value for a GET of `url`
    ///
    /// Only the headers this adapter sends take part in the signature. The
    /// URL must not carry a query string.
    pub fn shared_key_authorization(account: &str, key: &[u8], url: &Url, date: &str) -> Result<String> {
        let string_to_sign = format!(
            "GET{}x-ms-date:{}\nx-ms-version:{}\n/{}{}",
            "\n".repeat(12),
            date,
            STORAGE_API_VERSION,
            account,
            url.path()
        );

        let mut mac = HmacSha256::new_from_slice(key).context("Invalid storage account key")?;
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        Ok(format!("SharedKey {}:{}", account, signature))
    }
}

/// Parsed storage connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobConnection {
    pub endpoint: Url,
    pub credential: BlobCredential,
}

impl FromStr for BlobConnection {
    type Err = anyhow::Error;

    fn from_str(connection_string: &str) -> Result<Self> {
        let mut protocol = "https";
        let mut account_name = None;
        let mut endpoint_suffix = "core.windows.net";
        let mut blob_endpoint = None;
        let mut sas_token = None;
        let mut account_key = None;

        for pair in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            // Keys and SAS values end in '=' padding, so split on the first one only
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("Malformed connection string segment '{}'", pair))?;

            match key {
                "DefaultEndpointsProtocol" => protocol = value,
                "AccountName" => account_name = Some(value),
                "EndpointSuffix" => endpoint_suffix = value,
                "BlobEndpoint" => blob_endpoint = Some(value),
                "SharedAccessSignature" => sas_token = Some(value.trim_start_matches('?').to_string()),
                "AccountKey" => account_key = Some(value),
                _ => {}
            }
        }

        let credential = match (sas_token, account_key) {
            (Some(sas), _) => BlobCredential::Sas(sas),
            (None, Some(key)) => {
                let account = account_name.context("AccountKey requires AccountName")?;
                let key = STANDARD.decode(key).context("AccountKey is not valid base64")?;
                BlobCredential::SharedKey { account: account.to_string(), key }
            }
            (None, None) => BlobCredential::Anonymous,
        };

        let endpoint = match (blob_endpoint, account_name) {
            (Some(endpoint), _) => endpoint.to_string(),
            (None, Some(account)) => format!("{}://{}.blob.{}", protocol, account, endpoint_suffix),
            (None, None) => anyhow::bail!("Connection string needs BlobEndpoint or AccountName"),
        };

        Ok(Self {
            endpoint: Url::parse(&endpoint).context("Invalid blob endpoint")?,
            credential,
        })
    }
}

/// Blob store reading from a single container
pub struct AzureBlobStore {
    http_client: reqwest::Client,
    connection: BlobConnection,
    container: String,
}

impl AzureBlobStore {
    pub fn new(connection: BlobConnection, container: impl Into<String>) -> Result<Self> {
        let container = container.into();
        if container.is_empty() {
            anyhow::bail!("Container name is required");
        }

        let http_client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            connection,
            container,
        })
    }

    pub fn from_connection_string(connection_string: &str, container: impl Into<String>) -> Result<Self> {
        Self::new(connection_string.parse()?, container)
    }

    /// Full URL of a blob, SAS included when that is the credential
    pub fn blob_url(&self, blob_name: &str) -> Result<Url> {
        let mut url = self.connection.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Blob endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(&self.container)
            .extend(blob_name.split('/'));

        let sas = match &self.connection.credential {
            BlobCredential::Sas(sas) => Some(sas.as_str()),
            _ => None,
        };
        url.set_query(sas);
        Ok(url)
    }
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn download(&self, blob_name: &str) -> Result<BlobContent> {
        let url = self.blob_url(blob_name)?;

        let mut request = self
            .http_client
            .get(url.clone())
            .header("x-ms-version", STORAGE_API_VERSION);

        if let BlobCredential::SharedKey { account, key } = &self.connection.credential {
            let date = chrono::Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
            let authorization = BlobCredential::shared_key_authorization(account, key, &url, &date)?;
            request = request.header("x-ms-date", date).header(AUTHORIZATION, authorization);
        }

        let response = request.send().await.context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Blob download of '{}' failed ({})", blob_name, status);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.context("Failed to read blob body")?;

        tracing::debug!(blob = blob_name, size = bytes.len(), "Downloaded blob");
        Ok(BlobContent {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

//! Object store client
//!
//! Thin wrapper over the S3 SDK for fetching drop files named by
//! storage-change events. Missing objects surface as
//! `GvwError::ObjectNotFound`; every other failure is a transport error.

use aws_sdk_s3::{
    config::{Credentials, Region},
    Client,
};
use gvw_common::{GvwError, Result};
use tracing::{debug, info, instrument};

pub mod config;

#[derive(Clone)]
pub struct Storage {
    client: Client,
}

impl Storage {
    pub async fn new(config: config::StorageConfig) -> anyhow::Result<Self> {
        debug!("Initializing storage with config: {:?}", config);

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "gvw-storage",
        );

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!("Storage client initialized");

        Ok(Self { client })
    }

    /// Download an object and decode it as UTF-8 text.
    #[instrument(skip(self))]
    pub async fn download_text(&self, bucket: &str, key: &str) -> Result<String> {
        debug!("Downloading from s3://{}/{}", bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    GvwError::ObjectNotFound(format!("s3://{}/{}", bucket, key))
                } else {
                    GvwError::Transport(format!(
                        "failed to download s3://{}/{}: {}",
                        bucket, key, service_err
                    ))
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| GvwError::Transport(format!("failed to read object body: {}", e)))?
            .into_bytes();

        debug!("Downloaded {} bytes from s3://{}/{}", data.len(), bucket, key);

        String::from_utf8(data.to_vec())
            .map_err(|e| GvwError::Transport(format!("object is not valid UTF-8: {}", e)))
    }

    /// Check whether an object exists without fetching it.
    #[instrument(skip(self))]
    pub async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(GvwError::Transport(format!(
                        "failed to check s3://{}/{}: {}",
                        bucket, key, service_err
                    )))
                }
            },
        }
    }
}

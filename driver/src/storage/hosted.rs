use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use kernel::interface::storage::ImageStorage;
use kernel::prelude::entity::{ImageFile, ImagePath, ImageUrl};
use kernel::KernelError;

use crate::error::ConvertError;
use crate::{env, env_or};

static STORAGE_URL: &str = "STORAGE_URL";
static STORAGE_API_KEY: &str = "STORAGE_API_KEY";
static STORAGE_BUCKET: &str = "STORAGE_BUCKET";

const DEFAULT_BUCKET: &str = "listing_images";

/// Client for a Supabase-compatible object storage API.
#[derive(Clone)]
pub struct HostedImageStorage {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

#[derive(Deserialize)]
struct ObjectBody {
    name: String,
}

impl HostedImageStorage {
    pub fn new() -> error_stack::Result<Self, KernelError> {
        let base_url = env(STORAGE_URL)?;
        let api_key = env(STORAGE_API_KEY)?;
        let bucket = env_or(STORAGE_BUCKET, DEFAULT_BUCKET);
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .convert_error()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            bucket,
        })
    }

    fn public_url(&self, path: &ImagePath) -> ImageUrl {
        ImageUrl::new(format!(
            "{}/object/public/{}/{}",
            self.base_url,
            self.bucket,
            path.as_ref()
        ))
    }

    async fn list(&self, prefix: &ImagePath) -> error_stack::Result<Vec<String>, KernelError> {
        let objects = self
            .client
            .post(format!("{}/object/list/{}", self.base_url, self.bucket))
            .bearer_auth(&self.api_key)
            .json(&json!({ "prefix": prefix.as_ref(), "limit": 1000 }))
            .send()
            .await
            .convert_error()?
            .error_for_status()
            .convert_error()?
            .json::<Vec<ObjectBody>>()
            .await
            .convert_error()?;
        Ok(objects
            .into_iter()
            .map(|object| format!("{}/{}", prefix.as_ref(), object.name))
            .collect())
    }
}

#[async_trait::async_trait]
impl ImageStorage for HostedImageStorage {
    #[tracing::instrument(skip_all)]
    async fn upload(
        &self,
        path: &ImagePath,
        file: &ImageFile,
    ) -> error_stack::Result<ImageUrl, KernelError> {
        self.client
            .post(format!(
                "{}/object/{}/{}",
                self.base_url,
                self.bucket,
                path.as_ref()
            ))
            .bearer_auth(&self.api_key)
            .header("content-type", file.content_type())
            .header("x-upsert", "false")
            .body(file.bytes().clone())
            .send()
            .await
            .convert_error()?
            .error_for_status()
            .convert_error()?;
        Ok(self.public_url(path))
    }

    #[tracing::instrument(skip_all)]
    async fn remove_prefix(&self, prefix: &ImagePath) -> error_stack::Result<(), KernelError> {
        let objects = self.list(prefix).await?;
        if objects.is_empty() {
            return Ok(());
        }
        self.client
            .delete(format!("{}/object/{}", self.base_url, self.bucket))
            .bearer_auth(&self.api_key)
            .json(&json!({ "prefixes": objects }))
            .send()
            .await
            .convert_error()?
            .error_for_status()
            .convert_error()?;
        Ok(())
    }
}

use reqwest::Url;
use serde::Deserialize;

use crate::error::GatewayError;
use crate::gateway::{RequestGateway, RequestSpec};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ImagesResponse {
    pub message: Vec<String>,
    pub status: String,
}

/// Random image batches for the infinite-scroll gallery.
#[derive(Clone)]
pub struct ImageService {
    gateway: RequestGateway,
    url: Url,
}

impl ImageService {
    /// Retry count the gallery page configures for each batch.
    pub const GALLERY_RETRY: u32 = 1;

    pub fn new(gateway: RequestGateway, url: Url) -> Self { Self { gateway, url } }

    pub async fn fetch_images(&self, retry: u32) -> Result<Vec<String>, GatewayError> {
        let resp: ImagesResponse = self.gateway.send_with_retry(RequestSpec::get(self.url.as_str()), retry).await?;
        if resp.status != "success" {
            return Err(GatewayError::Decode { message: "Failed to load images".into() });
        }
        Ok(resp.message)
    }
}

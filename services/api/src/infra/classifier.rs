use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tracing::warn;

use crate::domain::repository::Classifier;
use crate::domain::types::{Classification, ModelKind};
use crate::error::ApiError;

/// HTTP client for the inference service. The service owns model loading and
/// preprocessing; this side only uploads the image and reads back the
/// label/confidence payload.
#[derive(Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClassifier {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

impl Classifier for HttpClassifier {
    async fn classify(
        &self,
        model: ModelKind,
        filename: &str,
        image: Vec<u8>,
    ) -> Result<Classification, ApiError> {
        let part = Part::bytes(image)
            .file_name(filename.to_owned())
            .mime_str("application/octet-stream")
            .map_err(|e| ApiError::Internal(e.into()))?;
        let form = Form::new().part("file", part);
        let url = format!("{}/predict/{}", self.base_url, model.as_str());

        let response = match self.client.post(&url).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(model = model.as_str(), error = %e, "classifier request failed");
                return Err(ApiError::ClassifierUnavailable);
            }
        };
        if !response.status().is_success() {
            warn!(
                model = model.as_str(),
                status = %response.status(),
                "classifier returned error status"
            );
            return Err(ApiError::ClassifierUnavailable);
        }
        response
            .json::<Classification>()
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("decode classifier response: {e}")))
    }
}

//! HttpCompositor -- concrete [`Compositor`] for the Codipop try-on endpoint.
//!
//! Sends one multipart POST per request: a `person` file part, one
//! `clothing` file part per garment in selection order, and a
//! `clothing_count` text field. Local paths and `file://` URIs are read from
//! disk; remote image URLs are downloaded first.
//!
//! The optional bearer token is wrapped in [`secrecy::SecretString`] and is
//! only exposed when building the request headers.

use std::time::Duration;

use codipop_core::fitting::compositor::Compositor;
use codipop_types::config::AppConfig;
use codipop_types::error::CompositionError;
use codipop_types::fitting::{CompositionRequest, CompositionResponse, ImageSource};
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};

const IMAGE_MIME: &str = "image/jpeg";

/// Where an image's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceLocation<'a> {
    Remote(&'a str),
    Local(&'a str),
}

pub(crate) fn locate(uri: &str) -> SourceLocation<'_> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        SourceLocation::Remote(uri)
    } else {
        SourceLocation::Local(uri.strip_prefix("file://").unwrap_or(uri))
    }
}

/// Decode a 2xx response body.
pub(crate) fn parse_response(body: &str) -> Result<CompositionResponse, CompositionError> {
    serde_json::from_str(body).map_err(|e| CompositionError::Malformed(e.to_string()))
}

/// HTTP client for the remote compositor.
///
/// Does not derive `Debug`; the token must never reach logs.
pub struct HttpCompositor {
    client: reqwest::Client,
    endpoint: String,
    token: Option<SecretString>,
}

impl HttpCompositor {
    pub fn new(endpoint: String, token: Option<SecretString>) -> Result<Self, CompositionError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| CompositionError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CompositionError> {
        let token = config
            .compositor_token
            .clone()
            .filter(|t| !t.expose_secret().is_empty());
        Self::new(config.compositor_url.clone(), token)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Read an image from disk or download it.
    pub async fn fetch_image(&self, uri: &str) -> Result<Vec<u8>, CompositionError> {
        let read_error = |reason: String| CompositionError::ImageRead {
            uri: uri.to_string(),
            reason,
        };

        match locate(uri) {
            SourceLocation::Local(path) => tokio::fs::read(path)
                .await
                .map_err(|e| read_error(e.to_string())),
            SourceLocation::Remote(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| read_error(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(read_error(format!("HTTP {status}")));
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| read_error(e.to_string()))?;
                Ok(bytes.to_vec())
            }
        }
    }

    async fn image_part(&self, source: &ImageSource, file_name: String) -> Result<Part, CompositionError> {
        let bytes = self.fetch_image(&source.uri).await?;
        Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(IMAGE_MIME)
            .map_err(|e| CompositionError::Transport(e.to_string()))
    }

    async fn build_form(&self, request: &CompositionRequest) -> Result<Form, CompositionError> {
        let mut form = Form::new().part(
            "person",
            self.image_part(&request.person, "person.jpg".to_string()).await?,
        );

        for (index, garment) in request.clothing.iter().enumerate() {
            let part = self
                .image_part(garment, format!("clothing_{index}.jpg"))
                .await?;
            form = form.part("clothing", part);
        }

        Ok(form.text("clothing_count", request.clothing_count().to_string()))
    }
}

impl Compositor for HttpCompositor {
    async fn compose(
        &self,
        request: &CompositionRequest,
    ) -> Result<CompositionResponse, CompositionError> {
        let form = self.build_form(request).await?;

        let mut builder = self.client.post(&self.endpoint).multipart(form);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        tracing::debug!(endpoint = %self.endpoint, garments = request.clothing_count(), "posting to compositor");

        let response = builder
            .send()
            .await
            .map_err(|e| CompositionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompositionError::Transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(CompositionError::Status {
                code: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}

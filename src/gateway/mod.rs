//! Image Edit Gateway
//!
//! Sends one product image plus a natural-language instruction to the
//! remote image generation service and returns the generated image as an
//! inline reference. Every failure collapses into [`EditFailed`]; the
//! detailed [`EditError`] is only logged.
//!
//! Architecture:
//! - `source.rs` - resolves image references to bytes
//! - `wire.rs` - request/response types of the service

pub mod source;
pub mod wire;

use std::fmt;

use base64::Engine;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::GatewayConfig;
use crate::state::data::ImageRef;
use source::{sniff_mime_type, SourceError};
use wire::{GenerateContentRequest, GenerateContentResponse, InlineData};

/// Returned type when the service answers without a MIME type
const FALLBACK_RESULT_MIME_TYPE: &str = "image/png";

/// The one failure signal callers see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("image generation failed")]
pub struct EditFailed;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("no service credential configured")]
    MissingCredential,

    #[error("could not load source image: {0}")]
    Source(#[from] SourceError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {0}")]
    Status(StatusCode),

    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("response contained no image")]
    NoImage,

    #[error("invalid base64 in generated image: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("generated image could not be decoded: {0}")]
    Decode(#[from] image::ImageError),
}

pub struct ImageEditGateway {
    client: Client,
    api_key: Option<SecretString>,
    endpoint: String,
}

impl ImageEditGateway {
    /// Build a gateway with its own HTTP client
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self::with_client(client, config))
    }

    /// Build a gateway around an existing client
    pub fn with_client(client: Client, config: GatewayConfig) -> Self {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Self {
            client,
            api_key: config.api_key,
            endpoint,
        }
    }

    /// HTTP client shared with image loading
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Apply `instruction` to the image behind `current`.
    ///
    /// Sends exactly one request. No retries.
    pub async fn edit(
        &self,
        current: &ImageRef,
        instruction: &str,
    ) -> Result<ImageRef, EditFailed> {
        match self.try_edit(current, instruction).await {
            Ok(image) => {
                info!(source = %current, result = %image, "image edit succeeded");
                Ok(image)
            }
            Err(error) => {
                warn!(source = %current, %error, "image edit failed");
                Err(EditFailed)
            }
        }
    }

    async fn try_edit(&self, current: &ImageRef, instruction: &str) -> Result<ImageRef, EditError> {
        let api_key = self.api_key.as_ref().ok_or(EditError::MissingCredential)?;

        let source = source::resolve(&self.client, current).await?;
        let request = GenerateContentRequest::new(&source, instruction);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EditError::Status(status));
        }

        let body = response.bytes().await?;
        let response: GenerateContentResponse = serde_json::from_slice(&body)?;
        let inline = response.first_inline_image().ok_or(EditError::NoImage)?;

        decode_generated(inline)
    }
}

impl fmt::Debug for ImageEditGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageEditGateway")
            .field("endpoint", &self.endpoint)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

/// Validate a returned payload and turn it into a displayable reference
pub fn decode_generated(inline: &InlineData) -> Result<ImageRef, EditError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(inline.data.trim())?;
    image::load_from_memory(&bytes)?;

    let mime_type = inline
        .mime_type
        .clone()
        .filter(|mime| mime.starts_with("image/"))
        .or_else(|| sniff_mime_type(&bytes))
        .unwrap_or_else(|| FALLBACK_RESULT_MIME_TYPE.to_string());

    Ok(ImageRef::inline(&mime_type, &bytes))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// A 2x2 PNG
    pub(crate) fn test_png() -> Vec<u8> {
        let pixels = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 230, 255]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(pixels)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[derive(Clone)]
    struct Route {
        method: &'static str,
        path: &'static str,
        status: u16,
        content_type: &'static str,
        body: Vec<u8>,
    }

    #[derive(Debug, Clone)]
    struct Recorded {
        head: String,
        body: Vec<u8>,
    }

    /// Minimal HTTP/1.1 responder on an ephemeral port
    async fn serve(routes: Vec<Route>) -> (String, Arc<Mutex<Vec<Recorded>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let recorded = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&recorded);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = routes.clone();
                let log = Arc::clone(&log);
                tokio::spawn(async move { respond(stream, &routes, &log).await });
            }
        });

        (base_url, recorded)
    }

    async fn respond(mut stream: TcpStream, routes: &[Route], log: &Mutex<Vec<Recorded>>) {
        let Some(request) = read_request(&mut stream).await else {
            return;
        };
        let request_line = request.head.lines().next().unwrap_or_default().to_string();
        log.lock().unwrap().push(request);

        let route = routes.iter().find(|route| {
            request_line.starts_with(&format!("{} {}", route.method, route.path))
        });
        let (status, content_type, body) = match route {
            Some(route) => (route.status, route.content_type, route.body.clone()),
            None => (404, "text/plain", b"not found".to_vec()),
        };

        let head = format!(
            "HTTP/1.1 {status} Test\r\ncontent-type: {content_type}\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(head.as_bytes()).await;
        let _ = stream.write_all(&body).await;
        let _ = stream.shutdown().await;
    }

    async fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8192];

        loop {
            let read = stream.read(&mut chunk).await.ok()?;
            if read == 0 {
                return None;
            }
            buffer.extend_from_slice(&chunk[..read]);

            let Some(end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buffer[..end]).to_string();
            let length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);

            let body_start = end + 4;
            if buffer.len() >= body_start + length {
                let body = buffer[body_start..body_start + length].to_vec();
                return Some(Recorded { head, body });
            }
        }
    }

    fn gateway(base_url: &str, api_key: Option<&str>) -> ImageEditGateway {
        let client = Client::builder().no_proxy().build().unwrap();
        let config = GatewayConfig {
            api_key: api_key.map(|key| SecretString::from(key.to_string())),
            model: "test-model".to_string(),
            base_url: base_url.to_string(),
            timeout: None,
        };
        ImageEditGateway::with_client(client, config)
    }

    fn generate_route(status: u16, body: Value) -> Route {
        Route {
            method: "POST",
            path: "/v1beta/models/test-model:generateContent",
            status,
            content_type: "application/json",
            body: serde_json::to_vec(&body).unwrap(),
        }
    }

    fn image_response(data: &str) -> Value {
        json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Done." },
                        { "inlineData": { "mimeType": "image/png", "data": data } }
                    ]
                }
            }]
        })
    }

    fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[tokio::test]
    async fn test_edit_with_inline_source() {
        let generated = test_png();
        let (base_url, recorded) =
            serve(vec![generate_route(200, image_response(&encode(&generated)))]).await;
        let gateway = gateway(&base_url, Some("test-key"));
        let source = ImageRef::inline("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0]);

        let result = gateway.edit(&source, "把背景换成阳光明媚的牧场").await;

        assert_eq!(result, Ok(ImageRef::inline("image/png", &generated)));

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0]
            .head
            .to_ascii_lowercase()
            .contains("x-goog-api-key: test-key"));

        let sent: Value = serde_json::from_slice(&recorded[0].body).unwrap();
        let parts = &sent["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], encode(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert_eq!(
            parts[1]["text"],
            wire::compose_instruction("把背景换成阳光明媚的牧场")
        );
    }

    #[tokio::test]
    async fn test_edit_fetches_remote_source() {
        let photo = test_png();
        let generated = test_png();
        let (base_url, recorded) = serve(vec![
            Route {
                method: "GET",
                path: "/milk1.png",
                status: 200,
                content_type: "image/png",
                body: photo.clone(),
            },
            generate_route(200, image_response(&encode(&generated))),
        ])
        .await;
        let gateway = gateway(&base_url, Some("test-key"));
        let source = ImageRef::new(format!("{base_url}/milk1.png"));

        let result = gateway.edit(&source, "调亮画面并增加饱和度").await;

        assert!(result.is_ok());
        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.len(), 2);
        let sent: Value = serde_json::from_slice(&recorded[1].body).unwrap();
        let inline = &sent["contents"][0]["parts"][0]["inlineData"];
        assert_eq!(inline["mimeType"], "image/png");
        assert_eq!(inline["data"], encode(&photo));
    }

    #[tokio::test]
    async fn test_response_without_image_fails() {
        let (base_url, _) = serve(vec![generate_route(
            200,
            json!({ "candidates": [{ "content": { "parts": [{ "text": "Sorry" }] } }] }),
        )])
        .await;
        let gateway = gateway(&base_url, Some("test-key"));
        let source = ImageRef::inline("image/png", &test_png());

        assert!(matches!(
            gateway.try_edit(&source, "在产品旁边放一朵小花").await,
            Err(EditError::NoImage)
        ));
        assert_eq!(
            gateway.edit(&source, "在产品旁边放一朵小花").await,
            Err(EditFailed)
        );
    }

    #[tokio::test]
    async fn test_service_error_status_fails() {
        let (base_url, _) = serve(vec![generate_route(
            429,
            json!({ "error": { "code": 429, "message": "quota" } }),
        )])
        .await;
        let gateway = gateway(&base_url, Some("test-key"));
        let source = ImageRef::inline("image/png", &test_png());

        assert!(matches!(
            gateway.try_edit(&source, "移除背景中的杂物").await,
            Err(EditError::Status(status)) if status == StatusCode::TOO_MANY_REQUESTS
        ));
    }

    #[tokio::test]
    async fn test_undecodable_image_fails() {
        let (base_url, _) = serve(vec![generate_route(
            200,
            image_response(&encode(b"definitely not a png")),
        )])
        .await;
        let gateway = gateway(&base_url, Some("test-key"));
        let source = ImageRef::inline("image/png", &test_png());

        assert!(matches!(
            gateway.try_edit(&source, "添加怀旧复古滤镜").await,
            Err(EditError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_source_fails() {
        let (base_url, recorded) = serve(Vec::new()).await;
        let gateway = gateway(&base_url, Some("test-key"));
        let source = ImageRef::new(format!("{base_url}/gone.jpg"));

        assert!(matches!(
            gateway.try_edit(&source, "背景变成温馨的婴儿房").await,
            Err(EditError::Source(SourceError::Status(status))) if status == StatusCode::NOT_FOUND
        ));
        // Nothing was sent to the service
        assert_eq!(recorded.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_sends_nothing() {
        let (base_url, recorded) = serve(Vec::new()).await;
        let gateway = gateway(&base_url, None);
        let source = ImageRef::inline("image/png", &test_png());

        assert!(matches!(
            gateway.try_edit(&source, "调成黑白风格").await,
            Err(EditError::MissingCredential)
        ));
        assert!(recorded.lock().unwrap().is_empty());
    }

    #[test]
    fn test_decode_generated_sniffs_missing_type() {
        let png = test_png();
        let inline = InlineData {
            mime_type: None,
            data: encode(&png),
        };

        assert_eq!(
            decode_generated(&inline).unwrap(),
            ImageRef::inline("image/png", &png)
        );
    }

    #[test]
    fn test_debug_hides_credential() {
        let gateway = gateway("http://localhost", Some("super-secret"));

        let printed = format!("{gateway:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("test-model:generateContent"));
    }
}

//! Wire format of the `generateContent` endpoint
//!
//! Only the fields this store sends or reads are modelled; everything
//! else in a response is ignored.

use serde::{Deserialize, Serialize};

use super::source::SourceImage;

/// Wrap the user's instruction so the service keeps the product intact
pub fn compose_instruction(instruction: &str) -> String {
    format!(
        "Based on this product image, {instruction}. Please maintain the main product \
         structure but apply the requested changes. Return the modified image."
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// One content block: the source image followed by the composed instruction
    pub fn new(image: &SourceImage, instruction: &str) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: Some(image.mime_type.clone()),
                            data: image.to_base64(),
                        }),
                    },
                    Part {
                        text: Some(compose_instruction(instruction)),
                        inline_data: None,
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

/// Base64 payload embedded in a request or response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "mime_type")]
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// First inline payload of the first candidate
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.inline_data.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compose_instruction() {
        assert_eq!(
            compose_instruction("添加怀旧复古滤镜"),
            "Based on this product image, 添加怀旧复古滤镜. Please maintain the main \
             product structure but apply the requested changes. Return the modified image."
        );
    }

    #[test]
    fn test_request_shape() {
        let image = SourceImage {
            bytes: vec![1, 2, 3],
            mime_type: "image/jpeg".to_string(),
        };

        let request = GenerateContentRequest::new(&image, "把背景换成阳光明媚的牧场");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [{
                    "parts": [
                        { "inlineData": { "mimeType": "image/jpeg", "data": "AQID" } },
                        { "text": compose_instruction("把背景换成阳光明媚的牧场") }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_first_inline_image_skips_text_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Here is your image" },
                        { "inlineData": { "mimeType": "image/png", "data": "first" } },
                        { "inlineData": { "mimeType": "image/png", "data": "second" } }
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 10 }
        }))
        .unwrap();

        let inline = response.first_inline_image().unwrap();
        assert_eq!(inline.data, "first");
        assert_eq!(inline.mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_snake_case_payload_is_accepted() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [
                { "inline_data": { "mime_type": "image/webp", "data": "abc" } }
            ] } }]
        }))
        .unwrap();

        assert_eq!(
            response.first_inline_image().and_then(|i| i.mime_type.as_deref()),
            Some("image/webp")
        );
    }

    #[test]
    fn test_missing_image() {
        let text_only: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "I can't do that" }] } }]
        }))
        .unwrap();
        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        let no_content: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();

        assert!(text_only.first_inline_image().is_none());
        assert!(empty.first_inline_image().is_none());
        assert!(no_content.first_inline_image().is_none());
    }
}

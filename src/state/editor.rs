//! AI image edit session
//!
//! One session exists per open editor. It tracks the working preview,
//! the typed instruction and the in-flight flag. At most one request is
//! outstanding per session: new submissions are rejected, not queued.

use thiserror::Error;

use super::data::{ImageRef, Product};
use crate::gateway::EditFailed;

/// Quick instructions offered as one-tap buttons
pub const PRESET_INSTRUCTIONS: [&str; 6] = [
    "添加怀旧复古滤镜",
    "把背景换成阳光明媚的牧场",
    "移除背景中的杂物",
    "在产品旁边放一朵小花",
    "调亮画面并增加饱和度",
    "背景变成温馨的婴儿房",
];

/// Shown when an edit request fails for any reason
pub const EDIT_FAILED_MESSAGE: &str = "生成失败，请重试。";

/// Identifies one editor session for the lifetime of the process
pub type SessionId = u64;

/// Why a submission did not start a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("an edit request is already in flight")]
    InFlight,
    #[error("instruction is empty")]
    EmptyInstruction,
    #[error("unknown preset instruction")]
    UnknownPreset,
}

/// State of one open editor
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    id: SessionId,
    /// Product as it looked when the editor opened
    product: Product,
    /// Working preview; starts as the product's current image
    preview: ImageRef,
    /// Text in the instruction box
    instruction: String,
    last_submitted: Option<String>,
    in_flight: bool,
    error: Option<String>,
}

impl EditSession {
    pub fn new(id: SessionId, product: Product) -> Self {
        let preview = product.image.clone();
        Self {
            id,
            product,
            preview,
            instruction: String::new(),
            last_submitted: None,
            in_flight: false,
            error: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn preview(&self) -> &ImageRef {
        &self.preview
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn last_submitted(&self) -> Option<&str> {
        self.last_submitted.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.instruction = instruction.into();
    }

    /// Start a request with the typed instruction.
    ///
    /// On success the session is in flight and the instruction to send is returned.
    pub fn submit_typed(&mut self) -> Result<String, SubmitRejected> {
        let instruction = self.instruction.trim().to_string();
        self.begin(instruction)
    }

    /// Start a request with one of the [`PRESET_INSTRUCTIONS`]
    pub fn submit_preset(&mut self, index: usize) -> Result<String, SubmitRejected> {
        let preset = PRESET_INSTRUCTIONS
            .get(index)
            .ok_or(SubmitRejected::UnknownPreset)?;
        self.begin((*preset).to_string())
    }

    fn begin(&mut self, instruction: String) -> Result<String, SubmitRejected> {
        if self.in_flight {
            return Err(SubmitRejected::InFlight);
        }
        if instruction.is_empty() {
            return Err(SubmitRejected::EmptyInstruction);
        }

        self.in_flight = true;
        self.error = None;
        self.last_submitted = Some(instruction.clone());
        Ok(instruction)
    }

    /// Apply the result of the outstanding request
    pub fn finish(&mut self, result: Result<ImageRef, EditFailed>) {
        self.in_flight = false;
        match result {
            Ok(image) => {
                self.preview = image;
                self.instruction.clear();
                self.error = None;
            }
            Err(EditFailed) => {
                self.error = Some(EDIT_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// True once a new image was generated and nothing is pending
    pub fn can_save(&self) -> bool {
        !self.in_flight && self.preview != self.product.image
    }
}

//! Storefront session
//!
//! The single context object for one shopping session. The UI never
//! touches the parts directly: it dispatches a [`Command`] through
//! [`Session::apply`] and runs whatever [`Effect`]s come back.

use std::time::Duration;

use tracing::{debug, info};

use super::cart::{CartLedger, QuantityChange};
use super::catalog::Catalog;
use super::data::{CategoryFilter, ImageRef, Product};
use super::editor::{EditSession, SessionId};
use super::filter::FilterEngine;
use super::overrides::ImageOverrides;
use super::toast::{ToastSignal, TOAST_DURATION};
use crate::gateway::EditFailed;

/// Shown after an edited image is saved
pub const SAVED_MESSAGE: &str = "图片定制成功！";

/// Everything a user (or a finished background task) can ask of the session
#[derive(Debug, Clone)]
pub enum Command {
    SelectCategory(CategoryFilter),
    Search(String),
    AddToCart(String),
    ChangeQuantity(String, i64),
    OpenCart,
    CloseCart,
    OpenHelp,
    CloseHelp,
    OpenEditor(String),
    CloseEditor,
    SetInstruction(String),
    SubmitInstruction,
    SubmitPreset(usize),
    EditFinished {
        session: SessionId,
        result: Result<ImageRef, EditFailed>,
    },
    SaveEdit,
    ToastExpired(u64),
}

/// Work the session needs done outside itself
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Issue one edit request; answer with [`Command::EditFinished`]
    StartEdit {
        session: SessionId,
        image: ImageRef,
        instruction: String,
    },
    /// The editor was dismissed; the outstanding request can be dropped
    CancelEdit { session: SessionId },
    /// Answer with [`Command::ToastExpired`] after `after`
    ExpireToast { id: u64, after: Duration },
    /// Short vibration where the device supports it
    HapticPulse,
}

#[derive(Debug, Clone)]
pub struct Session {
    catalog: Catalog,
    overrides: ImageOverrides,
    filter: FilterEngine,
    cart: CartLedger,
    editor: Option<EditSession>,
    next_editor_id: SessionId,
    toast: ToastSignal,
    cart_open: bool,
    help_open: bool,
}

impl Session {
    pub fn new(catalog: Catalog) -> Self {
        let mut session = Self {
            catalog,
            overrides: ImageOverrides::new(),
            filter: FilterEngine::new(),
            cart: CartLedger::new(),
            editor: None,
            next_editor_id: 0,
            toast: ToastSignal::new(),
            cart_open: false,
            help_open: false,
        };
        session.filter.refresh(&session.catalog, &session.overrides);
        session
    }

    /// Handle one command and report the follow-up work
    pub fn apply(&mut self, command: Command) -> Vec<Effect> {
        let effects = match command {
            Command::SelectCategory(category) => {
                self.filter.set_category(category);
                Vec::new()
            }
            Command::Search(text) => {
                self.filter.set_search(text);
                Vec::new()
            }
            Command::AddToCart(id) => self.add_to_cart(&id),
            Command::ChangeQuantity(id, delta) => {
                if let QuantityChange::Removed = self.cart.change_quantity(&id, delta) {
                    debug!(product = %id, "removed from cart");
                }
                Vec::new()
            }
            Command::OpenCart => {
                self.cart_open = true;
                Vec::new()
            }
            Command::CloseCart => {
                self.cart_open = false;
                Vec::new()
            }
            Command::OpenHelp => {
                self.help_open = true;
                Vec::new()
            }
            Command::CloseHelp => {
                self.help_open = false;
                Vec::new()
            }
            Command::OpenEditor(id) => self.open_editor(&id),
            Command::CloseEditor => self.close_editor(),
            Command::SetInstruction(text) => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.set_instruction(text);
                }
                Vec::new()
            }
            Command::SubmitInstruction => self.submit(None),
            Command::SubmitPreset(index) => self.submit(Some(index)),
            Command::EditFinished { session, result } => {
                self.finish_edit(session, result);
                Vec::new()
            }
            Command::SaveEdit => self.save_edit(),
            Command::ToastExpired(id) => {
                self.toast.expire(id);
                Vec::new()
            }
        };

        self.filter.refresh(&self.catalog, &self.overrides);
        effects
    }

    fn add_to_cart(&mut self, id: &str) -> Vec<Effect> {
        let Some(product) = self.product(id) else {
            debug!(product = id, "add to cart for unknown product ignored");
            return Vec::new();
        };

        let quantity = self.cart.add(&product);
        debug!(product = %product.id, quantity, "added to cart");

        vec![
            Effect::HapticPulse,
            self.raise_toast(format!("已添加 {} 到购物车", product.name)),
        ]
    }

    fn open_editor(&mut self, id: &str) -> Vec<Effect> {
        let Some(product) = self.product(id) else {
            debug!(product = id, "editor requested for unknown product");
            return Vec::new();
        };

        let effects = self.close_editor();
        self.next_editor_id += 1;
        let editor = EditSession::new(self.next_editor_id, product);
        debug!(session = editor.id(), product = %editor.product().id, "editor opened");
        self.editor = Some(editor);
        effects
    }

    fn close_editor(&mut self) -> Vec<Effect> {
        match self.editor.take() {
            Some(editor) if editor.is_in_flight() => {
                debug!(session = editor.id(), "editor closed with request outstanding");
                vec![Effect::CancelEdit {
                    session: editor.id(),
                }]
            }
            Some(editor) => {
                debug!(session = editor.id(), "editor closed");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn submit(&mut self, preset: Option<usize>) -> Vec<Effect> {
        let Some(editor) = self.editor.as_mut() else {
            return Vec::new();
        };

        let submitted = match preset {
            Some(index) => editor.submit_preset(index),
            None => editor.submit_typed(),
        };

        match submitted {
            Ok(instruction) => {
                info!(session = editor.id(), %instruction, "image edit requested");
                vec![Effect::StartEdit {
                    session: editor.id(),
                    image: editor.preview().clone(),
                    instruction,
                }]
            }
            Err(rejected) => {
                debug!(session = editor.id(), %rejected, "edit submission rejected");
                Vec::new()
            }
        }
    }

    fn finish_edit(&mut self, session: SessionId, result: Result<ImageRef, EditFailed>) {
        match self.editor.as_mut() {
            Some(editor) if editor.id() == session && editor.is_in_flight() => {
                info!(session, ok = result.is_ok(), "image edit finished");
                editor.finish(result);
            }
            _ => debug!(session, "late edit result for a dismissed editor discarded"),
        }
    }

    fn save_edit(&mut self) -> Vec<Effect> {
        let Some(editor) = self.editor.as_ref() else {
            return Vec::new();
        };
        if !editor.can_save() {
            debug!(session = editor.id(), "nothing to save");
            return Vec::new();
        }

        let product_id = editor.product().id.clone();
        let image = editor.preview().clone();
        self.overrides.commit(&product_id, image);
        self.editor = None;

        vec![self.raise_toast(SAVED_MESSAGE)]
    }

    fn raise_toast(&mut self, message: impl Into<String>) -> Effect {
        let id = self.toast.raise(message);
        Effect::ExpireToast {
            id,
            after: TOAST_DURATION,
        }
    }

    /// A product as currently shown: seed data with its image override applied
    pub fn product(&self, id: &str) -> Option<Product> {
        let seed = self.catalog.get(id)?;
        let image = self.overrides.current(&self.catalog, id)?;
        Some(Product {
            image: image.clone(),
            ..seed.clone()
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Products passing the current filters, in catalog order
    pub fn visible(&self) -> &[Product] {
        self.filter.visible()
    }

    pub fn category(&self) -> CategoryFilter {
        self.filter.category()
    }

    pub fn search(&self) -> &str {
        self.filter.search()
    }

    pub fn cart(&self) -> &CartLedger {
        &self.cart
    }

    pub fn editor(&self) -> Option<&EditSession> {
        self.editor.as_ref()
    }

    pub fn toast(&self) -> Option<&str> {
        self.toast.current().map(|toast| toast.message.as_str())
    }

    pub fn is_cart_open(&self) -> bool {
        self.cart_open
    }

    pub fn is_help_open(&self) -> bool {
        self.help_open
    }
}

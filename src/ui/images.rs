//! Product image loading and caching
//!
//! Every image reference shown on screen is resolved once through the
//! gateway's source layer and kept as an iced image handle.

use std::collections::{HashMap, HashSet};

use iced::widget::image::Handle;
use iced::widget::{container, image as picture, text};
use iced::{Element, Length};
use tracing::warn;

use crate::gateway::source;
use crate::state::data::ImageRef;
use crate::Message;

#[derive(Debug, Clone)]
enum Slot {
    Loading,
    Ready(Handle),
    Failed,
}

/// Loaded image handles keyed by reference
#[derive(Debug, Default)]
pub struct ImageCache {
    slots: HashMap<ImageRef, Slot>,
}

impl ImageCache {
    /// Sync the cache with what is on screen.
    ///
    /// Inline images (generated previews) that are no longer shown are
    /// dropped. References not seen before are marked as loading and returned.
    pub fn request<'a>(
        &mut self,
        images: impl IntoIterator<Item = &'a ImageRef>,
    ) -> Vec<ImageRef> {
        let on_screen: Vec<&ImageRef> = images.into_iter().collect();
        let shown: HashSet<&ImageRef> = on_screen.iter().copied().collect();
        self.slots
            .retain(|image, _| !image.is_inline() || shown.contains(image));

        let mut pending = Vec::new();
        for image in on_screen {
            if !self.slots.contains_key(image) {
                self.slots.insert(image.clone(), Slot::Loading);
                pending.push(image.clone());
            }
        }
        pending
    }

    /// Store the outcome of a load; ignored if the image was evicted meanwhile
    pub fn finish(&mut self, image: ImageRef, handle: Option<Handle>) {
        let Some(slot) = self.slots.get_mut(&image) else {
            return;
        };
        *slot = match handle {
            Some(handle) => Slot::Ready(handle),
            None => Slot::Failed,
        };
    }

    pub fn get(&self, image: &ImageRef) -> Option<&Handle> {
        match self.slots.get(image) {
            Some(Slot::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn is_failed(&self, image: &ImageRef) -> bool {
        matches!(self.slots.get(image), Some(Slot::Failed))
    }
}

/// Fetch or decode one image into a handle
pub async fn load(client: reqwest::Client, image: ImageRef) -> Option<Handle> {
    match source::resolve(&client, &image).await {
        Ok(source) => Some(Handle::from_bytes(source.bytes)),
        Err(error) => {
            warn!(image = %image, %error, "failed to load product image");
            None
        }
    }
}

/// A square image, or a placeholder while it loads
pub fn thumbnail<'a>(cache: &ImageCache, image: &ImageRef, size: f32) -> Element<'a, Message> {
    match cache.get(image) {
        Some(handle) => picture(handle.clone())
            .width(Length::Fixed(size))
            .height(Length::Fixed(size))
            .into(),
        None => {
            let label = if cache.is_failed(image) {
                "图片加载失败"
            } else {
                "加载中..."
            };
            container(text(label).size(12))
                .center_x(Length::Fixed(size))
                .center_y(Length::Fixed(size))
                .style(container::rounded_box)
                .into()
        }
    }
}

/// User interface module
///
/// Views are plain functions from session state to elements:
/// - The catalog page (storefront.rs)
/// - The cart drawer (cart.rs)
/// - The AI image editor (editor.rs)
/// - The help sheet (help.rs)
/// - Product image loading (images.rs)
pub mod cart;
pub mod editor;
pub mod help;
pub mod images;
pub mod storefront;

use iced::widget::{container, text};
use iced::Element;

use crate::Message;

/// The short-lived notice shown above every page
pub fn toast(message: &str) -> Element<'_, Message> {
    container(text(message).size(14))
        .padding([10, 18])
        .style(container::rounded_box)
        .into()
}

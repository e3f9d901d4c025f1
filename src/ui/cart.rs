use iced::widget::{button, column, container, horizontal_space, row, scrollable, text, Column};
use iced::{Alignment, Element, Length};

use super::images::{thumbnail, ImageCache};
use crate::state::data::CartItem;
use crate::state::session::{Command, Session};
use crate::Message;

/// The cart drawer: one row per entry plus the amount due
pub fn view<'a>(session: &'a Session, images: &'a ImageCache) -> Element<'a, Message> {
    let cart = session.cart();

    let header = row![
        text(format!("我的购物车 ({})", cart.count())).size(22),
        horizontal_space(),
        button("关闭")
            .style(button::secondary)
            .on_press(Message::Session(Command::CloseCart)),
    ]
    .align_y(Alignment::Center);

    let body: Element<'a, Message> = if cart.is_empty() {
        container(text("购物车空空如也"))
            .center_x(Length::Fill)
            .padding(60)
            .into()
    } else {
        let rows = cart.items().iter().map(|item| cart_row(item, images));
        scrollable(Column::with_children(rows).spacing(12))
            .height(Length::Fill)
            .into()
    };

    let footer = row![
        text("应付金额"),
        horizontal_space(),
        text(format!("¥{}", cart.total())).size(24),
    ]
    .align_y(Alignment::Center);

    column![header, body, footer].spacing(16).padding(20).into()
}

fn cart_row<'a>(item: &'a CartItem, images: &ImageCache) -> Element<'a, Message> {
    let id = &item.product.id;

    let row = row![
        thumbnail(images, &item.product.image, 64.0),
        column![
            text(item.product.name.as_str()).size(14),
            text(format!("¥{}", item.product.price)).size(16),
        ]
        .spacing(4),
        horizontal_space(),
        button("-").on_press(Message::Session(Command::ChangeQuantity(id.clone(), -1))),
        text(item.quantity.to_string()).size(14),
        button("+").on_press(Message::Session(Command::ChangeQuantity(id.clone(), 1))),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    container(row)
        .padding(10)
        .style(container::rounded_box)
        .into()
}

use iced::widget::{
    button, column, container, horizontal_space, row, scrollable, text, text_input, Row,
};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use super::images::{thumbnail, ImageCache};
use crate::state::data::Product;
use crate::state::session::{Command, Session};
use crate::Message;

/// Width of the product photo on a card
const CARD_IMAGE_SIZE: f32 = 220.0;

/// The main catalog page: header, search, category tabs and product grid
pub fn view<'a>(session: &'a Session, images: &'a ImageCache) -> Element<'a, Message> {
    column![
        header(session),
        search_bar(session),
        category_tabs(session),
        product_grid(session, images),
    ]
    .spacing(16)
    .padding(20)
    .into()
}

fn header(session: &Session) -> Element<'_, Message> {
    let count = session.cart().count();
    let cart_label = if count > 0 {
        format!("购物车 ({count})")
    } else {
        "购物车".to_string()
    };

    row![
        text("BabyMilk Pro").size(28),
        horizontal_space(),
        button("帮助")
            .style(button::secondary)
            .on_press(Message::Session(Command::OpenHelp)),
        button(text(cart_label)).on_press(Message::Session(Command::OpenCart)),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}

fn search_bar(session: &Session) -> Element<'_, Message> {
    text_input("搜索奶粉品牌或阶段...", session.search())
        .on_input(|search| Message::Session(Command::Search(search)))
        .padding(12)
        .into()
}

fn category_tabs(session: &Session) -> Element<'_, Message> {
    let active = session.category();
    let tabs = session.catalog().categories().iter().map(|&category| {
        let style = if category == active {
            button::primary
        } else {
            button::secondary
        };
        button(text(category.label()))
            .style(style)
            .padding([8, 20])
            .on_press(Message::Session(Command::SelectCategory(category)))
            .into()
    });

    Row::with_children(tabs).spacing(8).into()
}

fn product_grid<'a>(session: &'a Session, images: &'a ImageCache) -> Element<'a, Message> {
    if session.visible().is_empty() {
        return container(text("没有找到相关产品").size(18))
            .center_x(Length::Fill)
            .padding(60)
            .into();
    }

    let cards = session
        .visible()
        .iter()
        .map(|product| product_card(product, images))
        .collect();

    scrollable(Wrap::with_elements(cards).spacing(16.0).line_spacing(16.0))
        .height(Length::Fill)
        .into()
}

fn product_card<'a>(product: &'a Product, images: &ImageCache) -> Element<'a, Message> {
    let id = product.id.clone();

    let content = column![
        thumbnail(images, &product.image, CARD_IMAGE_SIZE),
        row![
            text(product.brand.as_str()).size(12),
            horizontal_space(),
            button(text("AI").size(12))
                .style(button::secondary)
                .on_press(Message::Session(Command::OpenEditor(id.clone()))),
        ]
        .align_y(Alignment::Center),
        text(product.name.as_str()).size(18),
        text(product.stage.as_str()).size(12),
        text(product.description.as_str()).size(13),
        row![
            text(format!("¥{}", product.price)).size(20),
            horizontal_space(),
            button("加入购物车").on_press(Message::Session(Command::AddToCart(id))),
        ]
        .align_y(Alignment::Center),
    ]
    .spacing(6)
    .width(Length::Fixed(CARD_IMAGE_SIZE));

    container(content)
        .padding(12)
        .style(container::rounded_box)
        .into()
}

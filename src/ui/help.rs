use iced::widget::{button, column, horizontal_space, row, text};
use iced::{Alignment, Element, Length};

use crate::state::session::Command;
use crate::Message;

const SECTIONS: [(&str, &str); 2] = [
    (
        "如何修改图片？",
        "在商品卡片右上角点击 AI 按钮，即可通过输入文字指令（如“草地背景”）实时修改商品展示图。",
    ),
    (
        "如何启用 AI 定制？",
        "启动前设置环境变量 GEMINI_API_KEY。未设置时仍可浏览和购物，但图片生成会失败。",
    ),
];

pub fn view<'a>() -> Element<'a, Message> {
    let header = row![
        text("使用指南").size(22),
        horizontal_space(),
        button("关闭")
            .style(button::secondary)
            .on_press(Message::Session(Command::CloseHelp)),
    ]
    .align_y(Alignment::Center);

    let mut content = column![header].spacing(18).padding(24).max_width(480);
    for (index, (title, body)) in SECTIONS.iter().enumerate() {
        content = content.push(
            column![
                text(format!("{}. {title}", index + 1)).size(16).style(text::primary),
                text(*body).size(14),
            ]
            .spacing(6),
        );
    }

    content
        .push(
            button("我知道了")
                .width(Length::Fill)
                .on_press(Message::Session(Command::CloseHelp)),
        )
        .into()
}

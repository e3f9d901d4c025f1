use iced::widget::{button, column, horizontal_space, row, text, text_input};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use super::images::{thumbnail, ImageCache};
use crate::state::editor::{EditSession, PRESET_INSTRUCTIONS};
use crate::state::session::Command;
use crate::Message;

const PREVIEW_SIZE: f32 = 360.0;

/// The AI image editor overlay.
///
/// While a request is in flight every edit trigger is disabled.
pub fn view<'a>(editor: &'a EditSession, images: &'a ImageCache) -> Element<'a, Message> {
    let busy = editor.is_in_flight();

    let header = row![
        text("AI 定制图片").size(22),
        horizontal_space(),
        button("关闭")
            .style(button::secondary)
            .on_press(Message::Session(Command::CloseEditor)),
    ]
    .align_y(Alignment::Center);

    let status = if busy {
        text("AI 正在绘制...")
    } else {
        match editor.last_submitted() {
            Some(instruction) => text(format!("上次指令：{instruction}")),
            None => text(editor.product().name.as_str()),
        }
    };

    let presets = PRESET_INSTRUCTIONS
        .iter()
        .enumerate()
        .map(|(index, preset)| {
            button(text(*preset).size(12))
                .style(button::secondary)
                .on_press_maybe((!busy).then(|| Message::Session(Command::SubmitPreset(index))))
                .into()
        })
        .collect();

    let mut input = text_input("例如：调成黑白风格", editor.instruction()).padding(10);
    if !busy {
        input = input
            .on_input(|instruction| Message::Session(Command::SetInstruction(instruction)))
            .on_submit(Message::Session(Command::SubmitInstruction));
    }
    let can_generate = !busy && !editor.instruction().trim().is_empty();
    let generate = button("生成")
        .on_press_maybe(can_generate.then(|| Message::Session(Command::SubmitInstruction)));

    let mut content = column![
        header,
        thumbnail(images, editor.preview(), PREVIEW_SIZE),
        status.size(14),
        text("尝试快捷指令:").size(14),
        Wrap::with_elements(presets).spacing(8.0).line_spacing(8.0),
        text("或输入您的要求:").size(14),
        row![input, generate].spacing(8),
    ]
    .spacing(14)
    .padding(20)
    .width(Length::Fixed(PREVIEW_SIZE + 40.0));

    if let Some(error) = editor.error() {
        content = content.push(text(error).style(text::danger));
    }

    let footer = row![
        button("取消")
            .style(button::secondary)
            .on_press(Message::Session(Command::CloseEditor)),
        button("确认使用此图")
            .on_press_maybe(editor.can_save().then(|| Message::Session(Command::SaveEdit))),
    ]
    .spacing(16);

    content.push(footer).into()
}

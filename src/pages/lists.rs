use cosmic::Element;
use cosmic::iced::{Alignment, Length};
use cosmic::widget::{button, column, container, icon, row, scrollable, text, text_input};

use crate::components::deletable_row::deletable_list;
use crate::core::collection::CollectionInfo;
use crate::fl;
use crate::message::Message;

/// The top-level screen: every known list, newest changes last, with a
/// footer input for creating another one.
pub fn lists_view<'a>(collections: &[CollectionInfo], input_value: &str) -> Element<'a, Message> {
    let mut content = column().spacing(12);

    if collections.is_empty() {
        content = content.push(
            container(text::body(fl!("lists-empty")))
                .padding(32)
                .center_x(Length::Fill)
                .width(Length::Fill),
        );
    } else {
        content = content.push(deletable_list(
            collections,
            &|info: &CollectionInfo| info.label().to_string(),
            true,
            Some(&|info: &CollectionInfo| Message::OpenList(info.id.clone())),
            Some(&|info: &CollectionInfo| Message::DeleteList(info.id.clone())),
        ));
    }

    let input = text_input::text_input(fl!("lists-placeholder"), input_value.to_string())
        .on_input(Message::ListInputChanged)
        .on_submit(|_| Message::ListSubmit)
        .width(Length::Fill);

    content = content.push(
        row()
            .spacing(8)
            .align_y(Alignment::Center)
            .push(input)
            .push(
                button::icon(icon::from_name("list-add-symbolic")).on_press(Message::ListSubmit),
            ),
    );

    container(scrollable(content.padding(16)))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

use cosmic::Element;
use cosmic::iced::{Alignment, Length};
use cosmic::widget::{button, column, container, icon, row, scrollable, text, text_input};

use crate::components::deletable_row::deletable_list;
use crate::core::item::Item;
use crate::fl;
use crate::message::Message;
use crate::store::Collection;

/// One list's contents. `open` is `None` while the collection is still being
/// fetched after navigation.
pub fn items_view<'a>(open: Option<&Collection>, input_value: &str) -> Element<'a, Message> {
    let Some(list) = open else {
        return container(text::body(fl!("list-loading")))
            .padding(32)
            .center_x(Length::Fill)
            .width(Length::Fill)
            .into();
    };

    let mut content = column().spacing(12);

    content = content.push(text::title3(list.info.label().to_string()));

    if list.items.is_empty() {
        content = content.push(
            container(text::body(fl!("items-empty")))
                .padding(32)
                .center_x(Length::Fill)
                .width(Length::Fill),
        );
    } else {
        content = content.push(deletable_list(
            &list.items,
            &|item: &Item| item.text.clone(),
            list.info.writable,
            None,
            Some(&|item: &Item| Message::DeleteItem(item.id)),
        ));
    }

    // Writability can change under us when sharing permissions are edited
    // elsewhere; it is re-read from the snapshot on every render.
    if list.info.writable {
        let input = text_input::text_input(fl!("items-placeholder"), input_value.to_string())
            .on_input(Message::ItemInputChanged)
            .on_submit(|_| Message::ItemSubmit)
            .width(Length::Fill);

        content = content.push(
            row()
                .spacing(8)
                .align_y(Alignment::Center)
                .push(input)
                .push(
                    button::icon(icon::from_name("list-add-symbolic"))
                        .on_press(Message::ItemSubmit),
                ),
        );
    } else {
        content = content.push(text::caption(fl!("list-read-only")));
    }

    container(scrollable(content.padding(16)))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

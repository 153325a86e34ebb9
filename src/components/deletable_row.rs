use cosmic::iced::{Alignment, Length};
use cosmic::widget::{button, column, container, icon, row, text};
use cosmic::{Element, theme};

use crate::message::Message;

/// The message produced by one row's delete control, if activating it should
/// do anything at all. Read-only rows and rows with no registered callback
/// get an inert control.
pub fn delete_message<T>(
    editable: bool,
    on_delete: Option<&dyn Fn(&T) -> Message>,
    item: &T,
) -> Option<Message> {
    if !editable {
        return None;
    }
    on_delete.map(|callback| callback(item))
}

/// Render an ordered sequence as rows, each showing derived display text and
/// a trailing delete control. The delete control is always laid out so row
/// geometry doesn't shift with permissions; it only receives a press handler
/// when the rows are editable and a callback was supplied. `on_activate`
/// makes the text itself clickable (used to open a list).
pub fn deletable_list<'a, T>(
    items: &[T],
    render: &dyn Fn(&T) -> String,
    editable: bool,
    on_activate: Option<&dyn Fn(&T) -> Message>,
    on_delete: Option<&dyn Fn(&T) -> Message>,
) -> Element<'a, Message> {
    let mut content = column().spacing(4);

    for item in items {
        let label = render(item);

        let mut title_btn = button::custom(text::body(label))
            .padding([4, 0])
            .class(theme::Button::Text);
        if let Some(activate) = on_activate {
            title_btn = title_btn.on_press(activate(item));
        }

        let mut delete_btn = button::icon(icon::from_name("edit-delete-symbolic"));
        if let Some(message) = delete_message(editable, on_delete, item) {
            delete_btn = delete_btn.on_press(message);
        }

        content = content.push(
            row()
                .spacing(8)
                .align_y(Alignment::Center)
                .push(container(title_btn).width(Length::Fill))
                .push(delete_btn),
        );
    }

    content.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delete_cb(item: &String) -> Message {
        Message::DeleteList(item.clone())
    }

    #[test]
    fn read_only_rows_never_produce_a_delete() {
        let item = "a".to_string();
        assert!(delete_message(false, Some(&delete_cb), &item).is_none());
    }

    #[test]
    fn no_callback_means_activation_is_a_no_op() {
        let item = "a".to_string();
        assert!(delete_message::<String>(true, None, &item).is_none());
    }

    #[test]
    fn editable_rows_produce_the_callback_message_for_their_item() {
        let item = "groceries".to_string();
        match delete_message(true, Some(&delete_cb), &item) {
            Some(Message::DeleteList(id)) => assert_eq!(id, "groceries"),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}

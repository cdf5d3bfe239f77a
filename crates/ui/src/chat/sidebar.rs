use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputState},
    label::Label,
    v_flex,
};

use crate::chat::events::NewChatClicked;

pub const NEW_CHAT_LABEL: &str = "New chat";
pub const SEARCH_PLACEHOLDER: &str = "Search...";
pub const EMPTY_HISTORY_TEXT: &str = "No data.";

/// Conversation sidebar.
///
/// Only "New chat" does anything. The collapse button and search field are
/// placeholders and there is never any history to list.
pub struct ChatSidebar {
    search_input: Entity<InputState>,
}

impl EventEmitter<NewChatClicked> for ChatSidebar {}

impl ChatSidebar {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let search_input = cx.new(|cx| InputState::new(window, cx).placeholder(SEARCH_PLACEHOLDER));

        Self { search_input }
    }

    fn render_toolbar(&mut self, cx: &mut Context<Self>) -> Div {
        h_flex()
            .w_full()
            .min_w_0()
            .gap_2()
            .child(
                Button::new("sidebar-new-chat")
                    .flex_1()
                    .small()
                    .ghost()
                    .icon(IconName::Plus)
                    .child(NEW_CHAT_LABEL)
                    .on_click(cx.listener(|_, _, _window, cx| {
                        cx.emit(NewChatClicked);
                    })),
            )
            .child(
                Button::new("sidebar-collapse")
                    .small()
                    .ghost()
                    .icon(IconName::PanelLeftClose),
            )
    }

    fn render_empty_state(&mut self, cx: &mut Context<Self>) -> Div {
        let theme = cx.theme();

        v_flex()
            .flex_1()
            .items_center()
            .justify_center()
            .child(
                Label::new(EMPTY_HISTORY_TEXT)
                    .text_sm()
                    .text_color(theme.muted_foreground),
            )
    }
}

impl Render for ChatSidebar {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        v_flex()
            .id("chat-sidebar")
            .size_full()
            .min_w_0()
            .gap_3()
            .p_3()
            .child(self.render_toolbar(cx))
            .child(Input::new(&self.search_input).w_full().small())
            .child(self.render_empty_state(cx))
    }
}

use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
};

use crate::chat::events::Submit;

pub const INPUT_PLACEHOLDER: &str = "Type your message...";
pub const SEND_LABEL: &str = "Send";
pub const BUSY_LABEL: &str = "...";

pub struct MessageInput {
    input_state: Entity<InputState>,
    is_busy: bool,
    clear_requested: bool,
}

impl EventEmitter<Submit> for MessageInput {}

impl MessageInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| InputState::new(window, cx).placeholder(INPUT_PLACEHOLDER));

        cx.subscribe_in(
            &input_state,
            window,
            |this, _, event: &InputEvent, _window, cx| {
                if let InputEvent::PressEnter { .. } = event {
                    this.handle_submit(cx);
                }
            },
        )
        .detach();

        Self {
            input_state,
            is_busy: false,
            clear_requested: false,
        }
    }

    pub fn set_busy(&mut self, busy: bool, cx: &mut Context<Self>) {
        if self.is_busy != busy {
            self.is_busy = busy;
            cx.notify();
        }
    }

    /// Empties the field on the next render. Called once a reply arrives, so a
    /// failed send leaves the draft in place.
    pub fn request_clear(&mut self, cx: &mut Context<Self>) {
        self.clear_requested = true;
        cx.notify();
    }

    fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.clear_requested = false;
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
    }

    fn handle_submit(&mut self, cx: &mut Context<Self>) {
        if self.is_busy {
            return;
        }

        let content = self.input_state.read(cx).value().to_string();
        if content.trim().is_empty() {
            return;
        }

        cx.emit(Submit::new(content));
    }
}

impl Render for MessageInput {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if self.clear_requested {
            self.clear(window, cx);
        }

        let theme = cx.theme();
        let is_busy = self.is_busy;
        let send_label = if is_busy { BUSY_LABEL } else { SEND_LABEL };

        h_flex()
            .bg(theme.background)
            .gap_2()
            .p_3()
            .items_center()
            .child(
                div()
                    .flex_1()
                    .min_w_0()
                    .px_3()
                    .py_2()
                    .rounded_lg()
                    .border_1()
                    .border_color(theme.border)
                    .bg(theme.background)
                    .child(Input::new(&self.input_state).w_full().disabled(is_busy)),
            )
            .child(
                Button::new("send")
                    .small()
                    .primary()
                    .icon(IconName::ArrowUp)
                    .child(send_label)
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.handle_submit(cx);
                    })),
            )
    }
}

use chatbot_core::ThemePreference;
use gpui::*;
use gpui_component::{ActiveTheme, Theme, ThemeMode, h_flex};

use crate::chat::{ChatServices, ChatSidebar, ChatView};

pub const WINDOW_TITLE: &str = "Chatbot";
pub const WINDOW_WIDTH: f32 = 1200.0;
pub const WINDOW_HEIGHT: f32 = 800.0;
/// Fixed sidebar width.
pub const SIDEBAR_WIDTH: f32 = 260.0;
/// Narrowest conversation area left beside the sidebar.
pub const MAIN_CONTENT_MIN_WIDTH: f32 = 480.0;
const _: () = {
    assert!(SIDEBAR_WIDTH > 0.0);
    assert!(SIDEBAR_WIDTH + MAIN_CONTENT_MIN_WIDTH <= WINDOW_WIDTH);
};

gpui::actions!(chatbot, [NewChat, Quit]);

pub fn theme_mode(preference: ThemePreference) -> ThemeMode {
    match preference {
        ThemePreference::Dark => ThemeMode::Dark,
        ThemePreference::Light => ThemeMode::Light,
    }
}

pub fn apply_theme(preference: ThemePreference, window: Option<&mut Window>, cx: &mut App) {
    Theme::change(theme_mode(preference), window, cx);
}

/// Root layout: fixed sidebar on the left, conversation on the right.
pub struct ChatAppShell {
    chat_view: Entity<ChatView>,
}

impl ChatAppShell {
    pub fn new(services: ChatServices, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let chat_view = cx.new(|cx| ChatView::new(services, window, cx));

        Self { chat_view }
    }

    fn new_chat(&mut self, cx: &mut Context<Self>) {
        self.chat_view
            .update(cx, |chat_view, cx| chat_view.new_chat(cx));
    }

    fn render_sidebar(&self, sidebar: Entity<ChatSidebar>, cx: &Context<Self>) -> Stateful<Div> {
        let theme = cx.theme();

        div()
            .id("sidebar-container")
            .h_full()
            .min_w_0()
            .flex_shrink_0()
            .w(px(SIDEBAR_WIDTH))
            .overflow_hidden()
            .bg(theme.background)
            .border_r_1()
            .border_color(theme.border)
            .child(sidebar)
    }
}

impl Render for ChatAppShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let sidebar = self.chat_view.read(cx).sidebar().clone();

        h_flex()
            .id("app-shell-body")
            .key_context("ChatAppShell")
            .on_action(cx.listener(|this, _: &NewChat, _window, cx| {
                this.new_chat(cx);
            }))
            .size_full()
            .min_w_0()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .text_color(theme.foreground)
            .child(self.render_sidebar(sidebar, cx))
            .child(
                div()
                    .id("main-content")
                    .flex_1()
                    .h_full()
                    .min_w_0()
                    .min_h_0()
                    .overflow_hidden()
                    .child(self.chat_view.clone()),
            )
    }
}

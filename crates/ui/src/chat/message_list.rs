use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::ops::Range;
use std::rc::Rc;

use chatbot_core::{Message, Speaker};
use gpui::*;
use gpui_component::{ActiveTheme, label::Label, v_flex, v_virtual_list};

use crate::chat::scroll_manager::ScrollManager;

pub const EMPTY_CONVERSATION_TEXT: &str = "Start a conversation...";

const DEFAULT_CONTENT_WIDTH: Pixels = px(680.);
const LIST_HORIZONTAL_PADDING: Pixels = px(16.);
const CONTENT_WIDTH_CHANGE_EPSILON: f32 = 1.0;
const BUBBLE_MAX_WIDTH: Pixels = px(640.);
const BUBBLE_PADDING_X: Pixels = px(14.);
const BUBBLE_PADDING_Y: Pixels = px(10.);
const ESTIMATED_TEXT_LINE_HEIGHT: Pixels = px(18.);
const ESTIMATED_CHAR_WIDTH: f32 = 7.0;

/// One rendered row: a settled message or the reply being revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowContent {
    Message(Message),
    Revealing(String),
}

impl RowContent {
    fn text(&self) -> &str {
        match self {
            Self::Message(message) => &message.text,
            Self::Revealing(text) => text,
        }
    }

    fn is_user(&self) -> bool {
        matches!(self, Self::Message(message) if message.speaker == Speaker::User)
    }
}

struct SizeCacheEntry {
    layout_hash: u64,
    height: Pixels,
    measured: bool,
}

pub struct MessageList {
    rows: Vec<RowContent>,
    item_sizes: Rc<Vec<Size<Pixels>>>,
    scroll_manager: ScrollManager,
    size_cache: HashMap<usize, SizeCacheEntry>,
    content_width: Option<Pixels>,
}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            rows: Vec::new(),
            item_sizes: Rc::new(Vec::new()),
            scroll_manager: ScrollManager::new(),
            size_cache: HashMap::new(),
            content_width: None,
        }
    }

    /// Replaces displayed content and follows the tail if anything changed.
    pub fn set_content(
        &mut self,
        messages: &[Message],
        reveal: Option<&str>,
        cx: &mut Context<Self>,
    ) {
        let rows = build_rows(messages, reveal);
        if rows == self.rows {
            return;
        }

        if rows.is_empty() {
            self.size_cache.clear();
            self.scroll_manager.reset();
        } else {
            self.scroll_manager.request_scroll_to_bottom();
        }

        self.rows = rows;
        self.rebuild_item_sizes();
        cx.notify();
    }

    fn update_content_width(&mut self, cx: &mut Context<Self>) {
        let list_width = self.scroll_manager.handle().bounds().size.width;
        if list_width <= Pixels::ZERO {
            return;
        }

        let next_content_width = max_pixels(px(1.), list_width - LIST_HORIZONTAL_PADDING * 2);
        let width_changed = self.content_width.is_none_or(|current| {
            (f32::from(current) - f32::from(next_content_width)).abs()
                > CONTENT_WIDTH_CHANGE_EPSILON
        });

        if width_changed {
            self.content_width = Some(next_content_width);
            for entry in self.size_cache.values_mut() {
                entry.measured = false;
            }

            self.rebuild_item_sizes();
            cx.notify();
        }
    }

    fn rebuild_item_sizes(&mut self) {
        let content_width = self.content_width.unwrap_or(DEFAULT_CONTENT_WIDTH);
        let mut sizes = Vec::with_capacity(self.rows.len());

        for (index, row) in self.rows.iter().enumerate() {
            let next_hash = layout_hash(row);
            let estimated_height = estimate_row_height(row, content_width);

            let entry = self.size_cache.entry(index).or_insert(SizeCacheEntry {
                layout_hash: next_hash,
                height: estimated_height,
                measured: false,
            });

            if entry.layout_hash != next_hash {
                entry.layout_hash = next_hash;
                entry.height = estimated_height;
                entry.measured = false;
            } else if !entry.measured {
                entry.height = estimated_height;
            }

            sizes.push(size(px(0.), entry.height));
        }

        let row_count = self.rows.len();
        self.size_cache.retain(|index, _| *index < row_count);
        self.item_sizes = Rc::new(sizes);
    }

    fn measure_visible_items(
        &mut self,
        visible_range: Range<usize>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let content_width = self.content_width.unwrap_or(DEFAULT_CONTENT_WIDTH);
        let available_space = size(
            AvailableSpace::Definite(content_width),
            AvailableSpace::MinContent,
        );
        let mut updated = false;

        for index in visible_range {
            let Some(row) = self.rows.get(index).cloned() else {
                continue;
            };

            let next_hash = layout_hash(&row);
            let mut element = self.render_row(&row, cx);
            let measured_height = element.layout_as_root(available_space, window, cx).height;

            let entry = self.size_cache.entry(index).or_insert(SizeCacheEntry {
                layout_hash: next_hash,
                height: measured_height,
                measured: false,
            });
            let height_changed = entry.layout_hash != next_hash
                || !entry.measured
                || pixels_changed(entry.height, measured_height);
            if height_changed {
                entry.height = measured_height;
                updated = true;
            }
            entry.layout_hash = next_hash;
            entry.measured = true;
        }

        if updated {
            self.rebuild_item_sizes();
            cx.notify();
        }
    }

    fn render_row(&self, row: &RowContent, cx: &mut Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let content = if row.text().is_empty() {
            " ".to_string()
        } else {
            row.text().to_string()
        };

        let bubble = div()
            .max_w(BUBBLE_MAX_WIDTH)
            .px(BUBBLE_PADDING_X)
            .py(BUBBLE_PADDING_Y)
            .rounded_lg();

        if row.is_user() {
            v_flex()
                .w_full()
                .items_end()
                .child(
                    bubble
                        .bg(theme.accent)
                        .text_color(theme.accent_foreground)
                        .child(Label::new(content).text_sm()),
                )
                .into_any_element()
        } else {
            v_flex()
                .w_full()
                .items_start()
                .child(
                    bubble
                        .bg(theme.muted)
                        .text_color(theme.foreground)
                        .child(Label::new(content).text_sm()),
                )
                .into_any_element()
        }
    }

    fn render_empty_state(&self, cx: &Context<Self>) -> AnyElement {
        let theme = cx.theme();

        v_flex()
            .size_full()
            .items_center()
            .justify_center()
            .child(
                Label::new(EMPTY_CONVERSATION_TEXT)
                    .text_sm()
                    .text_color(theme.muted_foreground),
            )
            .into_any_element()
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if self.rows.is_empty() {
            return v_flex()
                .size_full()
                .min_h_0()
                .child(self.render_empty_state(cx));
        }

        self.update_content_width(cx);
        self.scroll_manager.update_follow_state();
        self.scroll_manager.apply_pending_scroll();

        v_flex().size_full().min_h_0().child(
            v_virtual_list(
                cx.entity().clone(),
                "message-list",
                self.item_sizes.clone(),
                |this, visible_range, window, cx| {
                    this.measure_visible_items(visible_range.clone(), window, cx);
                    visible_range
                        .filter_map(|index| {
                            this.rows
                                .get(index)
                                .cloned()
                                .map(|row| this.render_row(&row, cx))
                        })
                        .collect::<Vec<_>>()
                },
            )
            .size_full()
            .px_4()
            .py_3()
            .gap_4()
            .track_scroll(self.scroll_manager.handle()),
        )
    }
}

fn build_rows(messages: &[Message], reveal: Option<&str>) -> Vec<RowContent> {
    messages
        .iter()
        .cloned()
        .map(RowContent::Message)
        .chain(reveal.map(|text| RowContent::Revealing(text.to_string())))
        .collect()
}

fn layout_hash(row: &RowContent) -> u64 {
    let mut hasher = DefaultHasher::new();
    let tag = match row {
        RowContent::Message(message) if message.speaker == Speaker::User => 0,
        RowContent::Message(_) => 1,
        RowContent::Revealing(_) => 2,
    };
    hasher.write_u8(tag);
    hasher.write(row.text().as_bytes());
    hasher.finish()
}

fn estimate_row_height(row: &RowContent, content_width: Pixels) -> Pixels {
    let bubble_width = min_pixels(content_width, BUBBLE_MAX_WIDTH);
    let text_width = max_pixels(px(1.), bubble_width - BUBBLE_PADDING_X * 2);
    estimate_text_height(row.text(), text_width) + BUBBLE_PADDING_Y * 2
}

fn estimate_text_height(content: &str, width: Pixels) -> Pixels {
    if content.is_empty() {
        return ESTIMATED_TEXT_LINE_HEIGHT;
    }

    let chars_per_line = (f32::from(width) / ESTIMATED_CHAR_WIDTH).floor().max(1.0) as usize;

    let mut line_count = 0usize;
    for line in content.lines() {
        line_count += line.chars().count().max(1).div_ceil(chars_per_line);
    }
    if content.ends_with('\n') {
        line_count += 1;
    }

    ESTIMATED_TEXT_LINE_HEIGHT * line_count.max(1)
}

fn max_pixels(a: Pixels, b: Pixels) -> Pixels {
    if f32::from(a) >= f32::from(b) { a } else { b }
}

fn min_pixels(a: Pixels, b: Pixels) -> Pixels {
    if f32::from(a) <= f32::from(b) { a } else { b }
}

fn pixels_changed(a: Pixels, b: Pixels) -> bool {
    (f32::from(a) - f32::from(b)).abs() > 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn reveal_row_follows_settled_messages() {
        let messages = vec![Message::user("hi"), Message::bot("hello")];

        let rows = build_rows(&messages, Some("he"));

        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_user());
        assert!(!rows[1].is_user());
        assert_eq!(rows[2], RowContent::Revealing("he".to_string()));
        assert!(build_rows(&[], None).is_empty());
    }

    #[::core::prelude::v1::test]
    fn growing_reveal_changes_only_its_own_hash() {
        let messages = vec![Message::user("hi")];
        let before = build_rows(&messages, Some("hel"));
        let after = build_rows(&messages, Some("hell"));

        assert_eq!(layout_hash(&before[0]), layout_hash(&after[0]));
        assert_ne!(layout_hash(&before[1]), layout_hash(&after[1]));
        // A settled bot row with the same text is still a different row kind.
        assert_ne!(
            layout_hash(&RowContent::Revealing("hell".to_string())),
            layout_hash(&RowContent::Message(Message::bot("hell")))
        );
    }

    #[::core::prelude::v1::test]
    fn long_text_estimates_taller_rows() {
        let short = RowContent::Message(Message::bot("ok"));
        let long = RowContent::Message(Message::bot("word ".repeat(400)));
        let width = px(680.);

        assert!(estimate_row_height(&short, width) > Pixels::ZERO);
        assert!(estimate_row_height(&long, width) > estimate_row_height(&short, width));
        assert_eq!(
            estimate_row_height(&RowContent::Revealing(String::new()), width),
            ESTIMATED_TEXT_LINE_HEIGHT + BUBBLE_PADDING_Y * 2
        );
    }
}

use std::sync::Arc;
use std::time::Duration;

use chatbot_core::{
    ChatSession, ExchangeOutcome, ExchangeResolution, ExchangeTarget, RevealStep,
    SessionTokenStore, SubmitRejection, run_exchange,
};
use chatbot_transport::ChatTransport;
use gpui::*;
use gpui_component::{ActiveTheme, v_flex};
use gpui_tokio_bridge::Tokio;

use crate::chat::events::{NewChatClicked, Submit};
use crate::chat::{ChatSidebar, MessageInput, MessageList};

/// Collaborators the conversation view talks to.
#[derive(Clone)]
pub struct ChatServices {
    pub transport: Arc<dyn ChatTransport>,
    pub tokens: SessionTokenStore,
    pub reveal_interval: Duration,
}

/// Parent coordinator for sidebar, message list, input and the backend exchange.
pub struct ChatView {
    sidebar: Entity<ChatSidebar>,
    message_list: Entity<MessageList>,
    message_input: Entity<MessageInput>,
    services: ChatServices,
    session: ChatSession,
    exchange_task: Option<Task<()>>,
    reveal_task: Option<Task<()>>,
}

impl ChatView {
    pub fn new(services: ChatServices, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let sidebar = cx.new(|cx| ChatSidebar::new(window, cx));
        let message_list = cx.new(MessageList::new);
        let message_input = cx.new(|cx| MessageInput::new(window, cx));

        cx.subscribe(&sidebar, |this, _, _event: &NewChatClicked, cx| {
            this.new_chat(cx);
        })
        .detach();

        cx.subscribe(&message_input, |this, _, event: &Submit, cx| {
            this.handle_submit(event.clone(), cx);
        })
        .detach();

        Self {
            sidebar,
            message_list,
            message_input,
            services,
            session: ChatSession::new(),
            exchange_task: None,
            reveal_task: None,
        }
    }

    pub fn sidebar(&self) -> &Entity<ChatSidebar> {
        &self.sidebar
    }

    /// Clears the conversation and abandons any exchange or reveal in flight.
    pub fn new_chat(&mut self, cx: &mut Context<Self>) {
        self.exchange_task = None;
        self.reveal_task = None;
        let generation = self.session.new_chat();
        tracing::info!(generation = generation.0, "started new chat");

        self.sync_children(cx);
    }

    fn handle_submit(&mut self, event: Submit, cx: &mut Context<Self>) {
        let submission = match self.session.submit(&event.content) {
            Ok(submission) => submission,
            Err(SubmitRejection::Blank) => return,
            Err(SubmitRejection::Busy { active }) => {
                tracing::debug!(
                    generation = active.generation.0,
                    exchange = active.exchange.0,
                    "ignoring submit while an exchange is active"
                );
                return;
            }
        };

        let target = submission.target;
        self.sync_children(cx);

        let exchange = Tokio::spawn(
            cx,
            run_exchange(
                self.services.transport.clone(),
                self.services.tokens.clone(),
                submission,
            ),
        );

        self.exchange_task = Some(cx.spawn(async move |this, cx| {
            let result = exchange.await;
            let _ = this.update(cx, |this, cx| match result {
                Ok(outcome) => this.handle_exchange_outcome(outcome, cx),
                Err(error) => this.handle_exchange_aborted(target, error, cx),
            });
        }));
    }

    fn handle_exchange_outcome(&mut self, outcome: ExchangeOutcome, cx: &mut Context<Self>) {
        self.exchange_task = None;
        let target = outcome.target();

        let resolution = match self.session.apply_outcome(outcome) {
            Ok(resolution) => resolution,
            Err(rejection) => {
                tracing::debug!(
                    generation = target.generation.0,
                    exchange = target.exchange.0,
                    ?rejection,
                    "ignoring stale exchange result"
                );
                return;
            }
        };

        if resolution.clears_draft() {
            self.message_input
                .update(cx, |input, cx| input.request_clear(cx));
        }
        if resolution == ExchangeResolution::Revealing {
            self.spawn_reveal(target, cx);
        }
        self.sync_children(cx);
    }

    fn handle_exchange_aborted(
        &mut self,
        target: ExchangeTarget,
        error: gpui_tokio_bridge::JoinError,
        cx: &mut Context<Self>,
    ) {
        self.exchange_task = None;
        tracing::error!(
            generation = target.generation.0,
            exchange = target.exchange.0,
            "exchange task aborted: {}",
            error
        );

        if self.session.fail_exchange(target).is_ok() {
            self.sync_children(cx);
        }
    }

    fn spawn_reveal(&mut self, target: ExchangeTarget, cx: &mut Context<Self>) {
        let interval = self.services.reveal_interval;

        self.reveal_task = Some(cx.spawn(async move |this, cx| {
            loop {
                cx.background_executor().timer(interval).await;

                let step = this.update(cx, |this, cx| this.handle_reveal_tick(target, cx));
                if !matches!(step, Ok(Some(RevealStep::Advanced))) {
                    break;
                }
            }
        }));
    }

    fn handle_reveal_tick(
        &mut self,
        target: ExchangeTarget,
        cx: &mut Context<Self>,
    ) -> Option<RevealStep> {
        match self.session.advance_reveal(target) {
            Ok(step) => {
                if step == RevealStep::Finished {
                    self.reveal_task = None;
                }
                self.sync_children(cx);
                Some(step)
            }
            Err(rejection) => {
                tracing::debug!(?rejection, "dropping stale reveal tick");
                None
            }
        }
    }

    fn sync_children(&mut self, cx: &mut Context<Self>) {
        let session = &self.session;
        self.message_list.update(cx, |list, cx| {
            list.set_content(session.messages(), session.reveal_text(), cx);
        });

        let busy = self.session.is_busy();
        self.message_input.update(cx, |input, cx| {
            input.set_busy(busy, cx);
        });

        cx.notify();
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-view")
            .relative()
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(
                div()
                    .id("chat-view-message-list")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
            .child(
                div()
                    .id("chat-view-message-input")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.message_input.clone()),
            )
    }
}

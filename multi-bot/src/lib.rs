//! # Multi bot
//!
//! Delivers each message to every registered handler concurrently and merges their responses
//! into one. Help requests are answered directly from the handlers' help texts.

mod aggregate;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use multibot_core::{Handler, Message, Response};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use aggregate::Aggregate;

/// Default number of handler invocations allowed to run at the same time.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Texts that make the dispatcher answer with the combined help instead of dispatching.
const HELP_TRIGGERS: [&str; 3] = ["help", "/help", "help!"];

/// Fan-out dispatcher over an ordered, fixed set of handlers.
///
/// Handlers are registered with [`MultiBot::add_handler`] while building; the set cannot change
/// afterwards.
#[derive(Clone)]
pub struct MultiBot {
    handlers: Vec<Arc<dyn Handler>>,
    max_concurrency: usize,
}

impl Default for MultiBot {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiBot {
    /// Creates a dispatcher without handlers.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Appends a handler. Registration order is the help order.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Sets how many handlers may run at once (at least one).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Delivers the message to all handlers and returns their merged response, or `None` when
    /// nothing has to be sent.
    ///
    /// Texts are joined with newlines in the order handlers finished; flags are set when any
    /// handler set them; the ban interval is the one written last. A panicking handler is
    /// logged and treated as if it returned `None`.
    #[instrument(skip(self, message), fields(chat_id = message.chat_id, message_id = %message.id))]
    pub async fn on_message(&self, message: &Message) -> Option<Response> {
        if is_help_request(&message.text) {
            debug!("help requested, skipping dispatch");
            return Some(Response::text(self.help()));
        }

        if self.handlers.is_empty() {
            return None;
        }

        let message = Arc::new(message.clone());
        let aggregate = Arc::new(Aggregate::default());
        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let (texts_tx, mut texts_rx) = mpsc::unbounded_channel::<String>();

        let mut tasks = JoinSet::new();
        for handler in &self.handlers {
            let handler = Arc::clone(handler);
            let message = Arc::clone(&message);
            let aggregate = Arc::clone(&aggregate);
            let permits = Arc::clone(&permits);
            let texts_tx = texts_tx.clone();

            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };

                let name = handler.name();
                let outcome = AssertUnwindSafe(handler.on_message(&message))
                    .catch_unwind()
                    .await;

                match outcome {
                    Ok(Some(response)) => {
                        debug!(handler = %name, reply_len = response.text.len(), "handler responded");
                        // The receiver lives until every task is joined.
                        let _ = texts_tx.send(response.text.clone());
                        aggregate.record(&response);
                    }
                    Ok(None) => {
                        debug!(handler = %name, "handler has nothing to send");
                    }
                    Err(_) => {
                        error!(handler = %name, "handler panicked, its response is skipped");
                    }
                }
            });
        }
        drop(texts_tx);

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "handler task failed");
            }
        }

        let mut fragments = Vec::new();
        while let Some(text) = texts_rx.recv().await {
            if !text.trim().is_empty() {
                debug!(text = %text, "compose");
            }
            fragments.push(text);
        }

        let response = aggregate.finish(fragments);
        let send = !response.is_empty();
        info!(
            handlers = self.handlers.len(),
            send,
            text_len = response.text.len(),
            "dispatch finished"
        );

        send.then_some(response)
    }

    /// Concatenates the help of every handler in registration order, skipping empty ones.
    pub fn help(&self) -> String {
        self.handlers
            .iter()
            .map(|h| h.help())
            .filter(|help| !help.is_empty())
            .collect()
    }
}

#[async_trait]
impl Handler for MultiBot {
    async fn on_message(&self, message: &Message) -> Option<Response> {
        MultiBot::on_message(self, message).await
    }

    fn help(&self) -> String {
        MultiBot::help(self)
    }
}

/// Returns true if the text, trimmed and compared case-insensitively, is a help trigger.
fn is_help_request(text: &str) -> bool {
    let text = text.trim();
    HELP_TRIGGERS
        .iter()
        .any(|trigger| trigger.eq_ignore_ascii_case(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_help_request() {
        assert!(is_help_request("help"));
        assert!(is_help_request("/help"));
        assert!(is_help_request("help!"));
        assert!(is_help_request("  HeLp  "));
        assert!(is_help_request("/HELP\n"));
        assert!(!is_help_request("help me"));
        assert!(!is_help_request("/help@other"));
        assert!(!is_help_request(""));
    }

    #[test]
    fn test_with_max_concurrency_at_least_one() {
        assert_eq!(MultiBot::new().with_max_concurrency(0).max_concurrency(), 1);
        assert_eq!(
            MultiBot::new().max_concurrency(),
            DEFAULT_MAX_CONCURRENCY
        );
    }
}

/*!
 * Localization workflow.
 *
 * The stages of a localization project, each operating on a [`Conf`]:
 * - `fetch`: resolve paths, fetch source content and protect it
 * - `copy`: replicate source content into language trees
 * - `dispatch`: send languages for translation, honoring waiting languages
 * - `save`: write returned translations into language trees
 *
 * Every stage pushes its per-item work through a [`queue::BoundedQueue`].
 *
 * [`Conf`]: crate::model::Conf
 */

use log::info;
use std::fmt::Debug;
use std::sync::Arc;

use crate::connectors::Connector;
use crate::paths::{DaPathResolver, PathResolver};
use crate::store::{ContentStore, ContentWriter};

pub mod copy;
pub mod dispatch;
pub mod fetch;
pub mod queue;
pub mod save;

pub use self::copy::copy_source_langs;
pub use self::dispatch::{check_waiting_languages, remove_waiting_languages, send_all_for_translation};
pub use self::fetch::{get_urls, FetchRequest};
pub use self::queue::{BoundedQueue, DEFAULT_CONCURRENCY};
pub use self::save::{save_lang_items, LangSaver};

/// A progress message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Receives progress messages
pub trait Notifier: Send + Sync {
    fn notify(&self, message: Message);
}

/// Notifier writing progress to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: Message) {
        info!("{}", message.text);
    }
}

/// The translation service taking part in a stage, if any
///
/// Source fetches for copy-only runs have no connector and leave content
/// unprotected.
#[derive(Clone, Copy, Default)]
pub struct ServiceContext<'a> {
    pub connector: Option<&'a dyn Connector>,
}

impl<'a> ServiceContext<'a> {
    pub fn none() -> Self {
        Self { connector: None }
    }

    pub fn with(connector: &'a dyn Connector) -> Self {
        Self { connector: Some(connector) }
    }
}

/// Collaborators shared by every workflow stage
#[derive(Clone)]
pub struct LocContext {
    pub store: Arc<dyn ContentStore>,
    pub writer: Arc<dyn ContentWriter>,
    pub resolver: Arc<dyn PathResolver>,
    pub notifier: Arc<dyn Notifier>,
    /// Width of every bounded queue
    pub concurrency: usize,
}

impl LocContext {
    /// Context over one backend used for both reads and writes
    pub fn new<S>(backend: Arc<S>) -> Self
    where
        S: ContentStore + ContentWriter + 'static,
    {
        Self {
            store: backend.clone(),
            writer: backend,
            resolver: Arc::new(DaPathResolver),
            notifier: Arc::new(LogNotifier),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn notify(&self, text: impl Into<String>) {
        self.notifier.notify(Message::new(text));
    }
}

impl Debug for LocContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocContext")
            .field("store", &self.store)
            .field("writer", &self.writer)
            .field("resolver", &self.resolver)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

/*!
 * Mock connector for testing.
 *
 * Records every dispatch and answers `save_items` according to a
 * [`SaveBehavior`]:
 * - `SaveBehavior::Succeed` - every item gets a translation
 * - `SaveBehavior::Missing` - the listed base paths have no translation yet
 * - `SaveBehavior::Reject` - the service call itself fails
 */

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{Connector, DispatchResult, SaveItemsArgs};
use crate::dnt::{DntCodec, HtmlDntCodec};
use crate::errors::ConnectorError;
use crate::model::{Conf, ItemStatus, LanguageRecord, UrlRecord};

/// Save behavior of the mock connector
#[derive(Debug, Clone, PartialEq)]
pub enum SaveBehavior {
    /// Every item is translated and saved
    Succeed,
    /// Items with these base paths have no translation
    Missing(Vec<String>),
    /// `save_items` fails as a whole
    Reject,
}

/// Mock connector for testing workflow behavior
#[derive(Debug)]
pub struct MockConnector {
    /// Save behavior
    behavior: SaveBehavior,
    /// Fail every dispatch
    fail_dispatch: bool,
    /// Translation generator (optional)
    translator: Option<fn(&LanguageRecord, &UrlRecord) -> String>,
    /// Every project sent for translation, in order
    dispatched: Arc<Mutex<Vec<Conf>>>,
    /// Number of `save_items` calls
    save_calls: Arc<AtomicUsize>,
    codec: HtmlDntCodec,
}

impl MockConnector {
    /// Create a mock that saves every item
    pub fn new() -> Self {
        Self::with_behavior(SaveBehavior::Succeed)
    }

    pub fn with_behavior(behavior: SaveBehavior) -> Self {
        Self {
            behavior,
            fail_dispatch: false,
            translator: None,
            dispatched: Arc::new(Mutex::new(Vec::new())),
            save_calls: Arc::new(AtomicUsize::new(0)),
            codec: HtmlDntCodec,
        }
    }

    /// Create a mock whose dispatches always fail
    pub fn failing_dispatch() -> Self {
        Self { fail_dispatch: true, ..Self::new() }
    }

    /// Set a translation generator
    ///
    /// Without one the fetched content is returned untouched.
    pub fn with_translator(mut self, translator: fn(&LanguageRecord, &UrlRecord) -> String) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Projects sent so far
    pub fn dispatched(&self) -> Vec<Conf> {
        self.dispatched.lock().clone()
    }

    /// Number of dispatch calls so far
    pub fn dispatch_count(&self) -> usize {
        self.dispatched.lock().len()
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    fn translate(&self, lang: &LanguageRecord, url: &UrlRecord) -> String {
        match self.translator {
            Some(translator) => translator(lang, url),
            None => url.content.clone().unwrap_or_default(),
        }
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn name(&self) -> &str {
        "mock"
    }

    fn dnt(&self) -> &dyn DntCodec {
        &self.codec
    }

    async fn save_items(&self, args: SaveItemsArgs<'_>) -> Result<Vec<UrlRecord>, ConnectorError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        let missing: &[String] = match &self.behavior {
            SaveBehavior::Reject => {
                return Err(ConnectorError::DispatchFailed(format!(
                    "No translations available for {}",
                    args.lang.code
                )));
            }
            SaveBehavior::Missing(paths) => paths.as_slice(),
            SaveBehavior::Succeed => &[],
        };

        let saver = args.saver;
        let saves = args.urls.into_iter().map(|mut url| {
            let available = !missing.contains(&url.base_path);
            if available {
                url.source_content = Some(self.translate(args.lang, &url));
            }
            async move {
                if !available {
                    url.status = Some(ItemStatus::Named("error".to_string()));
                    url.error = Some(format!("No translation for {}", url.base_path));
                    return url;
                }
                let mut saved = saver.save(url).await;
                if saved.is_saved() {
                    saved.status = Some(ItemStatus::success());
                }
                saved
            }
        });

        Ok(join_all(saves).await)
    }

    async fn send_all_languages(&self, conf: &Conf) -> Result<DispatchResult, ConnectorError> {
        if self.fail_dispatch {
            return Err(ConnectorError::DispatchFailed("Mock dispatch failure".to_string()));
        }
        self.dispatched.lock().push(conf.clone());
        Ok(DispatchResult::for_conf(conf))
    }
}

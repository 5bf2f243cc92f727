/*!
 * Saving returned translations into language trees.
 */

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{BoundedQueue, LocContext, Message, Notifier};
use crate::app_config::ConflictBehavior;
use crate::connectors::{Connector, ItemSaver, SaveItemsArgs};
use crate::errors::LocError;
use crate::model::{Conf, ItemStatus, LanguageRecord, TranslationStatus, UrlRecord, WriteStrategy};
use crate::paths::{snapshot_prefix, ConvertRequest};
use crate::store::{ContentWriter, CopyItem};

type SaveWorker<'a> = Box<dyn Fn(UrlRecord) -> BoxFuture<'a, UrlRecord> + Send + Sync + 'a>;

/// Writes the translated items of one language through a bounded queue
///
/// Handed to the connector, which calls [`ItemSaver::save`] once per item
/// with `source_content` set.
pub struct LangSaver<'a> {
    queue: BoundedQueue<SaveWorker<'a>>,
}

impl<'a> LangSaver<'a> {
    pub fn new(
        writer: &'a dyn ContentWriter,
        notifier: &'a dyn Notifier,
        behavior: ConflictBehavior,
        title: &'a str,
        lang: &'a LanguageRecord,
        total: usize,
        concurrency: usize,
    ) -> Self {
        let remaining = Arc::new(AtomicUsize::new(total));
        let worker: SaveWorker<'a> = Box::new(move |item: UrlRecord| {
            let remaining = Arc::clone(&remaining);
            async move {
                let item = write_item(writer, behavior, title, item).await;
                let left = remaining
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
                    .map_or(0, |previous| previous.saturating_sub(1));
                notifier.notify(Message::new(format!("{} items left to save for {}", left, lang.label())));
                item
            }
            .boxed()
        });

        Self { queue: BoundedQueue::new(worker, concurrency) }
    }
}

#[async_trait]
impl ItemSaver for LangSaver<'_> {
    async fn save(&self, item: UrlRecord) -> UrlRecord {
        self.queue.push(item).await
    }
}

async fn write_item(
    writer: &dyn ContentWriter,
    behavior: ConflictBehavior,
    title: &str,
    mut item: UrlRecord,
) -> UrlRecord {
    let (Some(destination), Some(content)) = (item.destination.clone(), item.source_content.clone()) else {
        item.error = Some(format!("No translated content to save for {}", item.base_path));
        return item;
    };

    let strategy = WriteStrategy::for_translation(behavior, &item);
    match writer.copy_with(strategy, CopyItem { destination: &destination, content: &content }, title).await {
        Ok(response) => {
            if !response.is_success() {
                item.error = Some(format!("Error saving {} - {}", destination, response.status));
            }
            item.status = Some(ItemStatus::Code(response.status));
        }
        Err(e) => {
            warn!("Failed to save {}: {}", destination, e);
            item.error = Some(format!("Error saving {} - {}", destination, e));
        }
    }
    item
}

/// Save returned translations for every dispatched language not complete yet
///
/// Languages still waiting for a prerequisite have nothing to save and are
/// skipped. A language is `complete` only when every project URL was saved;
/// anything less leaves it in `error` with the saved count recorded, and is
/// reported in the returned list. There is no retry.
pub async fn save_lang_items(
    ctx: &LocContext,
    behavior: ConflictBehavior,
    conf: &mut Conf,
    connector: &dyn Connector,
) -> Vec<LocError> {
    let total = conf.urls.len();
    let prefix = snapshot_prefix(conf.snapshot.as_deref());
    let mut shortfalls = Vec::new();

    for lang_index in 0..conf.langs.len() {
        let lang = &conf.langs[lang_index];
        if lang.translation.is_complete() || lang.translation.status == TranslationStatus::Waiting {
            continue;
        }
        ctx.notify(format!("Fetching {} items for {}", total, lang.label()));

        let urls: Vec<UrlRecord> = conf
            .urls
            .iter()
            .map(|url| {
                let variants = ctx.resolver.convert(&ConvertRequest {
                    path: &url.base_path,
                    source_prefix: "/",
                    dest_prefix: &lang.location,
                    snapshot_prefix: &prefix,
                });
                let mut record = url.clone();
                record.destination = Some(format!("/{}/{}{}", conf.org, conf.site, variants.da_dest_path));
                record
            })
            .collect();

        let saved = {
            let saver = LangSaver::new(
                ctx.writer.as_ref(),
                ctx.notifier.as_ref(),
                behavior,
                &conf.title,
                lang,
                urls.len(),
                ctx.concurrency,
            );
            let args = SaveItemsArgs {
                org: &conf.org,
                site: &conf.site,
                lang,
                lang_index,
                urls,
                saver: &saver,
            };

            match connector.save_items(args).await {
                Ok(items) => items.iter().filter(|item| item.is_saved()).count(),
                Err(e) => {
                    warn!("Saving {} failed: {}", lang.code, e);
                    0
                }
            }
        };

        let lang = &mut conf.langs[lang_index];
        lang.translation.settle(saved, total);
        info!("Saved {} of {} items for {} ({})", saved, total, lang.label(), lang.translation.status);
        if saved < total {
            shortfalls.push(LocError::Save { lang: lang.label().to_string(), saved, total });
        }
    }

    shortfalls
}

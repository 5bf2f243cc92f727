use log::{debug, info, warn};

use super::{BoundedQueue, LocContext};
use crate::app_config::Options;
use crate::model::{Conf, ItemStatus, UrlRecord, WriteStrategy};
use crate::paths::ConvertRequest;
use crate::store::CopyItem;

/// Replicate source content into every language tree
///
/// Each language copies its own source set (falling back to the project URLs)
/// through its own queue. `copy.saved` counts the writes answered with 200;
/// the copy is marked complete even when some writes failed.
pub async fn copy_source_langs(ctx: &LocContext, options: &Options, conf: &mut Conf) {
    let behavior = options.copy_conflict_behavior;
    let source_location = options.source_location();

    for index in 0..conf.langs.len() {
        let location = conf.langs[index].location.clone();
        let label = conf.langs[index].label().to_string();

        let items: Vec<UrlRecord> = conf
            .urls_for_lang(index)
            .iter()
            .map(|url| {
                let variants = ctx.resolver.convert(&ConvertRequest {
                    path: &url.supplied_path,
                    source_prefix: source_location,
                    dest_prefix: &location,
                    snapshot_prefix: "",
                });
                let mut record = url.clone();
                record.destination = Some(format!("/{}/{}{}", conf.org, conf.site, variants.da_dest_path));
                record.apply_variants(variants);
                record
            })
            .collect();
        ctx.notify(format!("Copying {} items to {}", items.len(), label));

        let copied = {
            let title = conf.title.as_str();
            let queue = BoundedQueue::new(
                |mut url: UrlRecord| async move {
                    let (Some(destination), Some(content)) = (url.destination.clone(), url.content.clone()) else {
                        url.error = Some(format!("No source content for {}", url.supplied_path));
                        return url;
                    };
                    let strategy = WriteStrategy::for_copy(behavior, &url);
                    let item = CopyItem { destination: &destination, content: &content };
                    match ctx.writer.copy_with(strategy, item, title).await {
                        Ok(response) => {
                            debug!("Copied {} ({})", destination, response.status);
                            url.status = Some(ItemStatus::Code(response.status));
                        }
                        Err(e) => {
                            warn!("Failed to copy {}: {}", destination, e);
                            url.error = Some(format!("Error copying to {} - {}", destination, e));
                        }
                    }
                    url
                },
                ctx.concurrency,
            );
            queue.settle_all(items).await
        };

        let saved = copied
            .iter()
            .filter(|url| url.status == Some(ItemStatus::Code(200)))
            .count();
        conf.langs[index].copy.finish(saved);
        info!("Copied {} of {} items to {}", saved, copied.len(), label);
    }
}

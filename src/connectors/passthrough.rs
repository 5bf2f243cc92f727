use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{Connector, DispatchResult, SaveItemsArgs};
use crate::dnt::{DntCodec, DntOptions, HtmlDntCodec};
use crate::errors::ConnectorError;
use crate::model::{Conf, ItemStatus, UrlRecord};

// @struct: Connector returning dispatched content as its own translation
//
// Dispatch keeps the protected payload of every item per language; saving
// restores it and writes it to the language tree. Used for copy-only runs and
// to exercise the full protect/restore loop without a service.
#[derive(Debug, Default)]
pub struct PassthroughConnector {
    // @field: Protected payloads by language code, then base path
    payloads: Mutex<HashMap<String, HashMap<String, String>>>,
    codec: HtmlDntCodec,
}

impl PassthroughConnector {
    pub fn new() -> Self {
        Self::default()
    }

    // @returns: Stored payload for one item, if dispatched
    pub fn payload(&self, lang: &str, base_path: &str) -> Option<String> {
        self.payloads.lock().get(lang).and_then(|items| items.get(base_path).cloned())
    }

    fn restore(&self, org: &str, site: &str, url: &UrlRecord, payload: &str) -> Result<String, ConnectorError> {
        let opts = DntOptions::for_path(&url.da_base_path);
        Ok(self.codec.remove_dnt(payload, org, site, &opts)?)
    }
}

#[async_trait]
impl Connector for PassthroughConnector {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn dnt(&self) -> &dyn DntCodec {
        &self.codec
    }

    async fn save_items(&self, args: SaveItemsArgs<'_>) -> Result<Vec<UrlRecord>, ConnectorError> {
        let saver = args.saver;
        let saves = args.urls.into_iter().map(|mut url| {
            let restored = match self.payload(&args.lang.code, &url.base_path) {
                Some(payload) => self.restore(args.org, args.site, &url, &payload),
                None => Err(ConnectorError::DispatchFailed(format!(
                    "{} was not sent for {}",
                    url.base_path, args.lang.code
                ))),
            };
            async move {
                match restored {
                    Ok(content) => {
                        url.source_content = Some(content);
                        let mut saved = saver.save(url).await;
                        if saved.is_saved() {
                            saved.status = Some(ItemStatus::success());
                        }
                        saved
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", url.base_path, e);
                        url.status = Some(ItemStatus::Named("error".to_string()));
                        url.error = Some(e.to_string());
                        url
                    }
                }
            }
        });

        Ok(join_all(saves).await)
    }

    async fn send_all_languages(&self, conf: &Conf) -> Result<DispatchResult, ConnectorError> {
        let items: HashMap<String, String> = conf
            .urls
            .iter()
            .filter_map(|url| Some((url.base_path.clone(), url.content.clone()?)))
            .collect();

        let mut payloads = self.payloads.lock();
        for lang in &conf.langs {
            debug!("Holding {} items for {}", items.len(), lang.code);
            payloads.insert(lang.code.clone(), items.clone());
        }
        Ok(DispatchResult::for_conf(conf))
    }
}

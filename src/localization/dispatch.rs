/*!
 * Sending languages for translation.
 *
 * A language may wait for another one (its `waiting_for`), e.g. a regional
 * variant translated from a finished translation instead of from the source.
 * Waiting languages are held back from the first dispatch and promoted by
 * [`check_waiting_languages`] once their prerequisite has landed in full.
 */

use log::{error, info, warn};

use super::fetch::{get_urls, FetchRequest};
use super::{LocContext, ServiceContext};
use crate::connectors::{Connector, DispatchResult};
use crate::dnt::TranslateConfig;
use crate::errors::{LocError, UrlError};
use crate::model::{Conf, TranslationStatus, UrlRecord};
use crate::paths::strip_location;

/// Copy of `conf` without the languages that wait for another one
pub fn remove_waiting_languages(conf: &Conf) -> Conf {
    Conf {
        langs: conf.langs.iter().filter(|lang| lang.waiting_for.is_none()).cloned().collect(),
        ..conf.clone()
    }
}

/// Every URL error in the source set of each language
///
/// Languages without their own set read the project URLs, which are then
/// checked once.
fn collect_url_errors(conf: &Conf) -> Vec<UrlError> {
    let mut sets: Vec<&[UrlRecord]> = Vec::new();
    if conf.langs.is_empty() {
        sets.push(&conf.urls);
    }
    for index in 0..conf.langs.len() {
        let set = conf.urls_for_lang(index);
        if !sets.iter().any(|seen| std::ptr::eq(*seen, set)) {
            sets.push(set);
        }
    }

    sets.into_iter()
        .flatten()
        .filter_map(|url| {
            url.error.as_ref().map(|error| UrlError {
                supplied_path: url.supplied_path.clone(),
                error: error.clone(),
            })
        })
        .collect()
}

/// Send every language that is not waiting for translation
///
/// Nothing is dispatched while any URL carries an error. Languages with a
/// prerequisite are marked waiting and left out of the dispatch.
pub async fn send_all_for_translation(conf: &mut Conf, connector: &dyn Connector) -> Result<DispatchResult, LocError> {
    let errors = collect_url_errors(conf);
    if !errors.is_empty() {
        let err = LocError::Validation(errors);
        error!("Not sending for translation: {}", err);
        return Err(err);
    }

    for lang in conf.langs.iter_mut().filter(|lang| lang.waiting_for.is_some()) {
        lang.translation.mark_waiting();
    }

    let ready = remove_waiting_languages(conf);
    info!(
        "Sending {} items in {} language(s) to {}",
        ready.urls.len(),
        ready.langs.len(),
        connector.name()
    );
    Ok(connector.send_all_languages(&ready).await?)
}

/// Promote waiting languages whose prerequisite has saved every URL
///
/// Readiness is decided for all waiting languages before any is promoted, so
/// a chain advances at most one hop per call. Each promoted language is
/// dispatched alone, with content fetched from the current tree of its
/// prerequisite (never from a snapshot). `original_urls` are the project's
/// supplied URLs; `source_location` is stripped from them first when given.
///
/// A language whose dispatch fails stays waiting and is retried on the next
/// call. Returns the promoted codes.
pub async fn check_waiting_languages(
    ctx: &LocContext,
    conf: &mut Conf,
    connector: &dyn Connector,
    original_urls: &[UrlRecord],
    source_location: Option<&str>,
    translate_config: &TranslateConfig,
) -> Vec<String> {
    let total = conf.urls.len();
    let ready: Vec<usize> = conf
        .langs
        .iter()
        .enumerate()
        .filter(|(_, lang)| lang.translation.status == TranslationStatus::Waiting)
        .filter_map(|(index, lang)| {
            let waiting_for = lang.waiting_for.as_ref()?;
            match conf.lang(&waiting_for.code) {
                Some(prerequisite)
                    if prerequisite.translation.saved == total
                        && prerequisite.translation.status != TranslationStatus::Waiting =>
                {
                    Some(index)
                }
                Some(_) => None,
                None => {
                    warn!("{} waits for unknown language {}", lang.code, waiting_for.code);
                    None
                }
            }
        })
        .collect();

    let base_urls: Vec<UrlRecord> = original_urls
        .iter()
        .map(|url| match source_location {
            Some(location) => UrlRecord {
                supplied_path: strip_location(&url.supplied_path, location).to_string(),
                ..url.clone()
            },
            None => url.clone(),
        })
        .collect();

    let mut promoted = Vec::with_capacity(ready.len());
    for index in ready {
        let Some(waiting_for) = conf.langs[index].waiting_for.clone() else {
            continue;
        };

        let urls = get_urls(
            ctx,
            FetchRequest {
                org: &conf.org,
                site: &conf.site,
                service: ServiceContext::with(connector),
                source_location: &waiting_for.location,
                dest_location: &waiting_for.location,
                fetch_content: true,
                snapshot: None,
                translate_config,
            },
            &base_urls,
        )
        .await;

        let mut lang = conf.langs[index].clone();
        lang.waiting_for = None;
        lang.translation.reset();
        let single = Conf { langs: vec![lang.clone()], urls, ..conf.clone() };

        match connector.send_all_languages(&single).await {
            Ok(_) => {
                info!("{} is ready, translating from {}", lang.code, waiting_for.code);
                promoted.push(lang.code.clone());
                conf.langs[index] = lang;
            }
            Err(e) => warn!("Sending {} for translation failed, still waiting: {}", lang.code, e),
        }
    }

    promoted
}

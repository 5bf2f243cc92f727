use log::{debug, info, warn};

use super::{BoundedQueue, LocContext, ServiceContext};
use crate::dnt::{DntOptions, TranslateConfig};
use crate::errors::LocError;
use crate::model::UrlRecord;
use crate::paths::{snapshot_prefix, ConvertRequest};

/// Markers left in a document by unresolved merges and regional edits
pub const UNMERGED_MARKERS: [&str; 4] = ["da-diff-added", "da-diff-deleted", "da-loc-added", "da-loc-deleted"];

/// Parameters of a fetch pass
#[derive(Clone, Copy)]
pub struct FetchRequest<'a> {
    pub org: &'a str,
    pub site: &'a str,
    /// Connector used to protect content; none leaves content as fetched
    pub service: ServiceContext<'a>,
    /// Tree prefix the supplied paths are relative to
    pub source_location: &'a str,
    /// Tree prefix content is fetched from
    pub dest_location: &'a str,
    /// Whether to fetch content at all
    pub fetch_content: bool,
    pub snapshot: Option<&'a str>,
    pub translate_config: &'a TranslateConfig,
}

/// Preview URL of a published path
pub fn aem_href(org: &str, site: &str, aem_base_path: &str) -> String {
    format!("https://main--{}--{}.aem.page{}", site, org, aem_base_path)
}

/// Resolve path variants for `urls` and optionally fetch and protect their content
///
/// Per-item failures are recorded on the returned records; the pass itself
/// never fails. Records come back in input order.
pub async fn get_urls(ctx: &LocContext, request: FetchRequest<'_>, urls: &[UrlRecord]) -> Vec<UrlRecord> {
    let prefix = snapshot_prefix(request.snapshot);

    let formatted: Vec<UrlRecord> = urls
        .iter()
        .map(|url| {
            let variants = ctx.resolver.convert(&ConvertRequest {
                path: &url.supplied_path,
                source_prefix: request.source_location,
                dest_prefix: request.dest_location,
                snapshot_prefix: &prefix,
            });
            let mut record = url.clone();
            record.apply_variants(variants);
            record.aem_href = aem_href(request.org, request.site, &record.aem_base_path);
            record
        })
        .collect();

    if !request.fetch_content {
        return formatted;
    }

    info!(
        "Fetching {} items from {}/{}{}",
        formatted.len(),
        request.org,
        request.site,
        request.dest_location
    );

    let queue = BoundedQueue::new(
        |mut url: UrlRecord| async move {
            if let Err(e) = fetch_one(ctx, &request, &mut url).await {
                warn!("{}", e);
                url.error = Some(e.to_string());
            }
            url
        },
        ctx.concurrency,
    );
    let fetched = queue.settle_all(formatted).await;
    debug!("Fetch pass peaked at {} concurrent requests", queue.peak_in_flight());
    fetched
}

/// Fetch one document and protect it
async fn fetch_one(ctx: &LocContext, request: &FetchRequest<'_>, url: &mut UrlRecord) -> Result<(), LocError> {
    let path = format!("/{}/{}{}", request.org, request.site, url.da_dest_path);
    let response = ctx.store.fetch(&path).await?;
    if !response.ok {
        return Err(LocError::Fetch { path: url.da_dest_path.clone(), status: response.status });
    }

    let content = response.text;
    if UNMERGED_MARKERS.iter().any(|marker| content.contains(marker)) {
        return Err(LocError::UnresolvedEdits(url.da_base_path.clone()));
    }

    let Some(connector) = request.service.connector else {
        url.content = Some(content);
        return Ok(());
    };

    let opts = DntOptions::for_path(&url.da_base_path).with_site(request.org, request.site);
    match connector.dnt().add_dnt(&content, request.translate_config, &opts) {
        Ok(protected) => {
            url.content = Some(protected);
            Ok(())
        }
        Err(source) => {
            url.content = Some(content);
            Err(LocError::Protection { path: url.da_base_path.clone(), source })
        }
    }
}

/*!
 * Translation service connectors.
 *
 * A connector is the capability set the workflow needs from a translation
 * service: a DNT codec, a way to dispatch a project, and a way to collect
 * returned translations and hand them to the workflow for saving.
 *
 * - `mock`: scripted connector for tests
 * - `passthrough`: loops protected content straight back as its own translation
 */

use async_trait::async_trait;
use log::debug;
use std::fmt::Debug;
use std::sync::Arc;

use crate::dnt::DntCodec;
use crate::errors::ConnectorError;
use crate::model::{Conf, LanguageRecord, UrlRecord};

pub mod mock;
pub mod passthrough;

pub use self::mock::{MockConnector, SaveBehavior};
pub use self::passthrough::PassthroughConnector;

/// Writes one translated item to its destination
///
/// Implemented by the workflow and handed to [`Connector::save_items`]. The
/// item must carry `destination` and `source_content`; the returned record
/// carries the write `status` (or an `error`).
#[async_trait]
pub trait ItemSaver: Send + Sync {
    async fn save(&self, item: UrlRecord) -> UrlRecord;
}

/// Arguments of [`Connector::save_items`]
pub struct SaveItemsArgs<'a> {
    pub org: &'a str,
    pub site: &'a str,
    /// Language being saved
    pub lang: &'a LanguageRecord,
    /// Position of the language in the project
    pub lang_index: usize,
    /// Items with their `destination` resolved
    pub urls: Vec<UrlRecord>,
    /// Writer for translated items
    pub saver: &'a dyn ItemSaver,
}

/// Outcome of a dispatch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchResult {
    /// Codes of the languages sent
    pub languages: Vec<String>,
    /// Number of items sent per language
    pub items: usize,
}

impl DispatchResult {
    pub fn for_conf(conf: &Conf) -> Self {
        Self {
            languages: conf.langs.iter().map(|lang| lang.code.clone()).collect(),
            items: conf.urls.len(),
        }
    }
}

/// Capability set of a translation service
#[async_trait]
pub trait Connector: Send + Sync + Debug {
    /// Normalized service name
    fn name(&self) -> &str;

    /// Codec used to protect content before dispatch
    fn dnt(&self) -> &dyn DntCodec;

    /// Collect translations for one language and save them through `args.saver`
    ///
    /// Returns the items with their outcome; successfully saved items have
    /// status `success`.
    async fn save_items(&self, args: SaveItemsArgs<'_>) -> Result<Vec<UrlRecord>, ConnectorError>;

    /// Send every language of `conf` for translation
    async fn send_all_languages(&self, conf: &Conf) -> Result<DispatchResult, ConnectorError>;
}

/// Normalize a service display name into a connector key
///
/// `"Google Translate"` becomes `google-translate`.
pub fn normalize_service_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

/// Creates connectors by service name
pub struct ConnectorFactory;

impl ConnectorFactory {
    /// Service keys with a built-in connector
    pub const SERVICES: [&'static str; 2] = ["mock", "passthrough"];

    /// Create the connector registered for `service`
    pub fn create(service: &str) -> Result<Arc<dyn Connector>, ConnectorError> {
        let key = normalize_service_name(service);
        debug!("Creating connector for service '{}' ({})", service, key);
        match key.as_str() {
            "mock" => Ok(Arc::new(MockConnector::new())),
            "passthrough" => Ok(Arc::new(PassthroughConnector::new())),
            _ => Err(ConnectorError::UnknownService(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_service_name() {
        assert_eq!(normalize_service_name("Google Translate"), "google-translate");
        assert_eq!(normalize_service_name(" Passthrough "), "passthrough");
    }

    #[test]
    fn test_factory_creates_known_services() {
        assert_eq!(ConnectorFactory::create("Passthrough").unwrap().name(), "passthrough");
        assert_eq!(ConnectorFactory::create("mock").unwrap().name(), "mock");
    }

    #[test]
    fn test_factory_rejects_unknown_service() {
        match ConnectorFactory::create("Google Translate") {
            Err(ConnectorError::UnknownService(key)) => assert_eq!(key, "google-translate"),
            other => panic!("Expected unknown service, got {:?}", other.map(|c| c.name().to_string())),
        }
    }
}

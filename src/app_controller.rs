use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::app_config::{Config, StoreConfig};
use crate::connectors::{Connector, ConnectorFactory};
use crate::dnt::{DntCodec, DntOptions, FileType, HtmlDntCodec, TranslateConfig};
use crate::localization::{
    check_waiting_languages, copy_source_langs, get_urls, save_lang_items, send_all_for_translation, FetchRequest,
    LocContext, Notifier, ServiceContext,
};
use crate::model::{Conf, LangUrls, TranslationStatus, UrlRecord};
use crate::store::{FsContentStore, HttpContentStore};

// @module: Application controller for localization projects

/// A workflow stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Replicate source content into language trees
    Copy,
    /// Fetch, protect and dispatch content
    Translate,
    /// Save returned translations and promote waiting languages
    Save,
}

impl Stage {
    /// Every stage, in run order
    pub const ALL: [Stage; 3] = [Stage::Copy, Stage::Translate, Stage::Save];
}

/// What a run did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Languages sent for translation, promoted ones included
    pub dispatched: Vec<String>,
    /// Languages promoted from waiting
    pub promoted: Vec<String>,
    /// Languages whose translation is complete after the run
    pub complete: Vec<String>,
    /// Languages whose save fell short
    pub failed: Vec<String>,
}

/// Main application controller for localization projects
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Store, resolver and notifier shared by all stages
    ctx: LocContext,
    // @field: Connector of the configured service
    connector: Option<Arc<dyn Connector>>,
    // @field: DNT rules
    translate_config: TranslateConfig,
    // @field: Local tree, when the store is a directory
    fs_store: Option<Arc<FsContentStore>>,
}

impl Controller {
    // @method: Create a controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let (ctx, fs_store) = match &config.store {
            StoreConfig::Fs { root } => {
                let store = Arc::new(FsContentStore::new(root));
                (LocContext::new(store.clone()), Some(store))
            }
            StoreConfig::Http { origin, token } => {
                let store = HttpContentStore::new(origin, token.clone())
                    .with_context(|| format!("Failed to create content store for {}", origin))?;
                (LocContext::new(Arc::new(store)), None)
            }
        };

        let connector = match &config.service {
            Some(service) => Some(
                ConnectorFactory::create(service)
                    .with_context(|| format!("Failed to set up connector for '{}'", service))?,
            ),
            None => None,
        };

        let translate_config = match &config.translate_config {
            Some(path) => TranslateConfig::load(path)?,
            None => TranslateConfig::default(),
        };

        let ctx = ctx.with_concurrency(config.options.concurrency);
        Ok(Self { config, ctx, connector, translate_config, fs_store })
    }

    /// Create a controller over explicit collaborators
    pub fn with_context(config: Config, ctx: LocContext, connector: Option<Arc<dyn Connector>>) -> Self {
        let ctx = ctx.with_concurrency(config.options.concurrency);
        Self {
            config,
            ctx,
            connector,
            translate_config: TranslateConfig::default(),
            fs_store: None,
        }
    }

    pub fn with_translate_config(mut self, translate_config: TranslateConfig) -> Self {
        self.translate_config = translate_config;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.ctx = self.ctx.with_notifier(notifier);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // @loads: Project file, filling org/site from the configuration
    pub fn load_project<P: AsRef<Path>>(&self, path: P) -> Result<Conf> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open project file: {}", path.display()))?;
        let mut conf: Conf = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse project file: {}", path.display()))?;

        if conf.org.is_empty() {
            conf.org = self.config.org.clone();
        }
        if conf.site.is_empty() {
            conf.site = self.config.site.clone();
        }
        Ok(conf)
    }

    // @saves: Project file without fetched content
    pub fn save_project<P: AsRef<Path>>(&self, path: P, conf: &Conf) -> Result<()> {
        let path = path.as_ref();
        let mut stored = conf.clone();
        for url in stored
            .urls
            .iter_mut()
            .chain(stored.langs_with_urls.iter_mut().flat_map(|set| set.urls.iter_mut()))
        {
            url.content = None;
            url.source_content = None;
        }
        let json = serde_json::to_string_pretty(&stored).context("Failed to serialize project to JSON")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write project file: {}", path.display()))
    }

    /// List source documents when the project names none
    pub fn discover_urls(&self, conf: &mut Conf) -> usize {
        if !conf.urls.is_empty() {
            return 0;
        }
        let Some(store) = &self.fs_store else {
            return 0;
        };
        conf.urls = store
            .list_documents(&conf.org, &conf.site, self.config.options.source_location())
            .into_iter()
            .map(UrlRecord::new)
            .collect();
        info!("Discovered {} source documents", conf.urls.len());
        conf.urls.len()
    }

    // @method: Run the given stages over a project
    pub async fn run(&self, conf: &mut Conf, stages: &[Stage]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        self.discover_urls(conf);
        if conf.urls.is_empty() {
            return Err(anyhow!("Project '{}' has no URLs", conf.title));
        }

        let original_urls = conf.urls.clone();
        conf.urls = self.fetch(conf, &conf.urls, ServiceContext::none(), false).await;

        if stages.contains(&Stage::Copy) {
            self.copy(conf).await;
        }
        if stages.contains(&Stage::Translate) {
            summary.dispatched = self.translate(conf).await?;
        }
        if stages.contains(&Stage::Save) {
            summary.promoted = self.save(conf, &original_urls).await?;
            summary.dispatched.extend(summary.promoted.iter().cloned());
        }

        for lang in &conf.langs {
            match lang.translation.status {
                TranslationStatus::Complete => summary.complete.push(lang.code.clone()),
                TranslationStatus::Error => summary.failed.push(lang.code.clone()),
                _ => {}
            }
        }
        Ok(summary)
    }

    fn connector(&self) -> Result<&dyn Connector> {
        self.connector
            .as_deref()
            .ok_or_else(|| anyhow!("No translation service configured"))
    }

    async fn fetch(&self, conf: &Conf, urls: &[UrlRecord], service: ServiceContext<'_>, fetch_content: bool) -> Vec<UrlRecord> {
        let source = self.config.options.source_location();
        let request = FetchRequest {
            org: &conf.org,
            site: &conf.site,
            service,
            source_location: source,
            dest_location: source,
            fetch_content,
            snapshot: conf.snapshot.as_deref(),
            translate_config: &self.translate_config,
        };
        get_urls(&self.ctx, request, urls).await
    }

    /// Fetch every language source set with the given service
    async fn fetch_lang_sets(&self, conf: &Conf, service: ServiceContext<'_>) -> Vec<LangUrls> {
        let mut sets = Vec::with_capacity(conf.langs_with_urls.len());
        for set in &conf.langs_with_urls {
            let urls = self.fetch(conf, &set.urls, service, true).await;
            sets.push(LangUrls { code: set.code.clone(), urls });
        }
        sets
    }

    async fn copy(&self, conf: &mut Conf) {
        let mut working = conf.clone();
        working.urls = self.fetch(conf, &conf.urls, ServiceContext::none(), true).await;
        working.langs_with_urls = self.fetch_lang_sets(conf, ServiceContext::none()).await;

        copy_source_langs(&self.ctx, &self.config.options, &mut working).await;
        for (lang, copied) in conf.langs.iter_mut().zip(working.langs) {
            lang.copy = copied.copy;
        }
    }

    async fn translate(&self, conf: &mut Conf) -> Result<Vec<String>> {
        let connector = self.connector()?;
        let service = ServiceContext::with(connector);
        conf.urls = self.fetch(conf, &conf.urls, service, true).await;
        conf.langs_with_urls = self.fetch_lang_sets(conf, service).await;

        let result = send_all_for_translation(conf, connector)
            .await
            .context("Failed to send project for translation")?;
        info!("Sent {} language(s) for translation", result.languages.len());
        Ok(result.languages)
    }

    /// Save translations, then promote and save waiting languages until none is ready
    async fn save(&self, conf: &mut Conf, original_urls: &[UrlRecord]) -> Result<Vec<String>> {
        let connector = self.connector()?;
        let behavior = self.config.options.translate_conflict_behavior;
        let source = self.config.options.source_location();
        let source = (source != "/").then_some(source);

        let mut promoted = Vec::new();
        loop {
            for shortfall in save_lang_items(&self.ctx, behavior, conf, connector).await {
                warn!("{}", shortfall);
            }
            let ready = check_waiting_languages(
                &self.ctx,
                conf,
                connector,
                original_urls,
                source,
                &self.translate_config,
            )
            .await;
            if ready.is_empty() {
                break;
            }
            debug!("Promoted {:?}", ready);
            promoted.extend(ready);
        }

        let waiting = conf
            .langs
            .iter()
            .filter(|lang| lang.translation.status == TranslationStatus::Waiting)
            .count();
        if waiting > 0 {
            warn!("{} language(s) still waiting for a prerequisite", waiting);
        }
        Ok(promoted)
    }

    /// Protect a single document
    pub fn protect_document(&self, content: &str, file_type: FileType) -> Result<String> {
        let opts = DntOptions { file_type, ..DntOptions::default() }.with_site(&self.config.org, &self.config.site);
        HtmlDntCodec
            .add_dnt(content, &self.translate_config, &opts)
            .context("Failed to protect document")
    }

    /// Restore a single protected document
    pub fn restore_document(&self, content: &str, file_type: FileType) -> Result<String> {
        let opts = DntOptions { file_type, ..DntOptions::default() };
        HtmlDntCodec
            .remove_dnt(content, &self.config.org, &self.config.site, &opts)
            .context("Failed to restore document")
    }
}

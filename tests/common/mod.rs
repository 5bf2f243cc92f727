/*!
 * Common test utilities for the locsync test suite
 */

use anyhow::Result;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use locsync::localization::{Message, Notifier};
use locsync::model::{Conf, LanguageRecord, UrlRecord};
use locsync::store::MemoryStore;

/// Route library logs to the test output
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content, creating parent directories
pub fn create_test_file(dir: &Path, relative: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(relative);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Notifier collecting every message
#[derive(Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: Message) {
        self.messages.lock().push(message.text);
    }
}

/// A source page with an icon, a linked image alt and site media
pub const SOURCE_PAGE: &str = r#"<body>
  <main>
    <div>
      <h1>Welcome :wave:</h1>
      <img src="https://main--site--org.aem.live/media_1234.png?width=750" alt="https://example.com | Our team | :play:">
    </div>
  </main>
</body>"#;

/// A placeholders sheet
pub const PLACEHOLDERS: &str = r#"{"total":1,"data":[{"key":"buy-now","value":"Buy now"}],":type":"sheet"}"#;

/// Seed the English source tree of `org/site`
pub fn seed_source(store: &MemoryStore) {
    store.insert("/org/site/en/index.html", SOURCE_PAGE);
    store.insert("/org/site/en/about.html", "<body><main><p>About us</p></main></body>");
    store.insert("/org/site/en/placeholders.json", PLACEHOLDERS);
}

/// A project over the seeded source tree: French, German, and Canadian
/// French waiting for French
pub fn sample_conf() -> Conf {
    let fr = LanguageRecord::new("fr", "/fr");
    let fr_ca = LanguageRecord::new("fr_ca", "/ca/fr").waiting_for(&fr);
    let de = LanguageRecord::new("de", "/de");
    Conf {
        org: "org".to_string(),
        site: "site".to_string(),
        title: "Launch".to_string(),
        urls: vec![
            UrlRecord::new("/en/"),
            UrlRecord::new("/en/about"),
            UrlRecord::new("/en/placeholders.json"),
        ],
        langs: vec![fr, fr_ca, de],
        ..Default::default()
    }
}

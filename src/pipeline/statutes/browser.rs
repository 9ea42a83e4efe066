//! Headless-browser fallback transport.
//!
//! Some statute pages only render their content region client-side; when
//! plain HTTP parsing fails, the same URL is loaded in a real browser. One
//! browser process and one browsing context are pooled across calls (launch
//! costs seconds; a page in an existing context costs milliseconds), with an
//! idle watchdog that closes the process after a minute of disuse. Page
//! operations run under a hard timeout and the page is closed in a
//! guaranteed cleanup step whether or not the fetch succeeded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::ResolveError;

const IDLE_TIMEOUT: Duration = Duration::from_secs(60);
const PAGE_TIMEOUT: Duration = Duration::from_secs(15);
const WATCHDOG_TICK: Duration = Duration::from_secs(5);

struct PooledBrowser {
    browser: Browser,
    handler_task: JoinHandle<()>,
    last_used: Instant,
}

/// Pooled headless-browser page fetcher.
#[derive(Clone)]
pub struct BrowserFetcher {
    pool: Arc<Mutex<Option<PooledBrowser>>>,
}

impl Default for BrowserFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserFetcher {
    pub fn new() -> Self {
        Self {
            pool: Arc::new(Mutex::new(None)),
        }
    }

    /// Load `url` in the pooled browser and return the rendered HTML.
    pub async fn fetch_rendered(&self, url: &str) -> Result<String, ResolveError> {
        let mut pool = self.pool.lock().await;

        if pool
            .as_ref()
            .map(|p| p.handler_task.is_finished())
            .unwrap_or(true)
        {
            *pool = Some(self.launch().await?);
        }
        let pooled = pool.as_mut().expect("pool populated above");

        let result = tokio::time::timeout(PAGE_TIMEOUT, fetch_in(&pooled.browser, url)).await;
        pooled.last_used = Instant::now();

        match result {
            Ok(inner) => inner,
            Err(_) => Err(ResolveError::Network(format!(
                "browser page timed out after {}s loading {url}",
                PAGE_TIMEOUT.as_secs()
            ))),
        }
    }

    async fn launch(&self) -> Result<PooledBrowser, ResolveError> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(ResolveError::Network)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ResolveError::Network(format!("browser launch failed: {e}")))?;

        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::info!("Headless browser launched for statute fallback");
        self.spawn_idle_watchdog();

        Ok(PooledBrowser {
            browser,
            handler_task,
            last_used: Instant::now(),
        })
    }

    /// Close the pooled browser once it has sat unused past the idle timeout.
    fn spawn_idle_watchdog(&self) {
        let pool = Arc::downgrade(&self.pool);
        tokio::task::spawn(async move {
            loop {
                tokio::time::sleep(WATCHDOG_TICK).await;
                let Some(pool) = pool.upgrade() else {
                    return;
                };
                let mut guard = pool.lock().await;
                match guard.as_ref() {
                    Some(p) if p.last_used.elapsed() >= IDLE_TIMEOUT => {
                        if let Some(mut p) = guard.take() {
                            let _ = p.browser.close().await;
                            let _ = p.browser.wait().await;
                            p.handler_task.abort();
                        }
                        tracing::info!("Headless browser closed after idle timeout");
                        return;
                    }
                    Some(_) => {}
                    None => return,
                }
            }
        });
    }
}

/// Open the page, grab its rendered HTML, and always close it; cleanup runs
/// on the error paths too.
async fn fetch_in(browser: &Browser, url: &str) -> Result<String, ResolveError> {
    let page = browser
        .new_page(url)
        .await
        .map_err(|e| ResolveError::Network(format!("browser navigation failed: {e}")))?;

    let html = async {
        page.wait_for_navigation()
            .await
            .map_err(|e| ResolveError::Network(format!("browser load failed: {e}")))?;
        page.content()
            .await
            .map_err(|e| ResolveError::Network(format!("browser content read failed: {e}")))
    }
    .await;

    let closed = page.close().await;
    if let Err(e) = closed {
        tracing::warn!(error = %e, "Failed to close browser page");
    }

    html
}

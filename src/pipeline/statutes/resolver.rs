//! Statute resolution: an ordered strategy chain behind a validating gate.
//!
//! The fallback order is data, not control flow: [`StatuteResolver::strategies`]
//! returns the list, and `resolve` walks it stopping at the first success.
//! Structural failures (`NotFound`, `RateLimited`, `Unsupported`) abort the
//! chain (a browser will not un-404 a page), while transport and parse
//! failures fall through to the next strategy.
//!
//! Per-citation resolution is serialized on a keyed async lock so concurrent
//! requests for the same key cannot race duplicate live fetches; writes are
//! idempotent per citation, so last-writer-wins at the cache is fine.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use super::browser::BrowserFetcher;
use super::debug_dump;
use super::fetch::{
    self, extract_content_region, extract_title, extract_version_token, strip_navigation_chrome,
    strip_tags, FetchedContent,
};
use super::validator::validate_content;
use super::ResolveError;
use crate::config::StatuteConfig;
use crate::db::StatuteStore;
use crate::models::{Citation, StatuteRecord};

const HTTP_TIMEOUT_SECS: u64 = 30;

/// One rung of the fallback ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// Validated cache lookup; invalid entries are deleted, not skipped.
    Cache,
    /// Plain HTTP fetch: shell → versioned content page → content region.
    LiveHttp,
    /// Rendered fetch through the pooled headless browser.
    HeadlessBrowser,
}

/// Serializes work per cache key without blocking unrelated citations.
#[derive(Default)]
struct KeyedLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    async fn for_key(&self, key: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().await;
        map.entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

pub struct StatuteResolver {
    config: StatuteConfig,
    http: reqwest::Client,
    store: Arc<dyn StatuteStore>,
    browser: Option<BrowserFetcher>,
    locks: KeyedLocks,
}

impl StatuteResolver {
    pub fn new(config: StatuteConfig, store: Arc<dyn StatuteStore>) -> Self {
        let browser = config.browser_enabled.then(BrowserFetcher::new);
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .expect("HTTP client construction cannot fail with static options");

        Self {
            config,
            http,
            store,
            browser,
            locks: KeyedLocks::default(),
        }
    }

    /// The fallback order, first match wins. Public so tests can pin it.
    pub fn strategies(&self) -> Vec<ResolveStrategy> {
        let mut order = vec![ResolveStrategy::Cache, ResolveStrategy::LiveHttp];
        if self.browser.is_some() {
            order.push(ResolveStrategy::HeadlessBrowser);
        }
        order
    }

    /// Resolve a citation to validated statute text.
    pub async fn resolve(&self, citation: &Citation) -> Result<StatuteRecord, ResolveError> {
        let key_lock = self.locks.for_key(&citation.cache_key()).await;
        let _serialized = key_lock.lock().await;

        let mut last_err = ResolveError::Parse("no resolution strategy produced content".into());

        for strategy in self.strategies() {
            let attempt = match strategy {
                ResolveStrategy::Cache => self.try_cache(citation),
                ResolveStrategy::LiveHttp => self.try_live_http(citation).await,
                ResolveStrategy::HeadlessBrowser => self.try_browser(citation).await,
            };

            match attempt {
                Ok(Some(record)) => {
                    // Final gate: nothing leaves the resolver unvalidated,
                    // whichever strategy produced it.
                    validate_content(record.jurisdiction, &record.text)
                        .map_err(|f| ResolveError::Parse(f.to_string()))?;
                    return Ok(record);
                }
                Ok(None) => continue,
                Err(
                    err @ (ResolveError::NotFound
                    | ResolveError::RateLimited
                    | ResolveError::Unsupported(_)),
                ) => {
                    tracing::info!(
                        citation = %citation.normalized_key,
                        ?strategy,
                        error = %err,
                        "Statute resolution aborted"
                    );
                    return Err(err);
                }
                Err(err) => {
                    tracing::info!(
                        citation = %citation.normalized_key,
                        ?strategy,
                        error = %err,
                        "Strategy failed, falling through"
                    );
                    last_err = err;
                }
            }
        }

        Err(last_err)
    }

    /// Cache lookup with re-validation. `Ok(None)` is a miss; entries that no
    /// longer validate are deleted so the next strategies refetch. Storage
    /// errors degrade to misses; they are not part of the error taxonomy.
    fn try_cache(&self, citation: &Citation) -> Result<Option<StatuteRecord>, ResolveError> {
        let cached = match self
            .store
            .get(citation.jurisdiction, &citation.normalized_key)
        {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(
                    citation = %citation.normalized_key,
                    error = %e,
                    "Statute cache read failed, treating as miss"
                );
                return Ok(None);
            }
        };

        let Some(record) = cached else {
            return Ok(None);
        };

        match validate_content(record.jurisdiction, &record.text) {
            Ok(()) => {
                tracing::debug!(citation = %citation.normalized_key, "Statute cache hit");
                Ok(Some(record))
            }
            Err(failure) => {
                tracing::warn!(
                    citation = %citation.normalized_key,
                    reason = %failure,
                    "Cached statute no longer validates, evicting"
                );
                if let Err(e) = self
                    .store
                    .delete(citation.jurisdiction, &citation.normalized_key)
                {
                    tracing::warn!(error = %e, "Eviction of invalid cache entry failed");
                }
                Ok(None)
            }
        }
    }

    /// Plain HTTP: primary page, then the versioned content page when the
    /// primary is a dynamic shell. Only content regions are parsed.
    async fn try_live_http(
        &self,
        citation: &Citation,
    ) -> Result<Option<StatuteRecord>, ResolveError> {
        let url = fetch::primary_url(&self.config, citation)?;
        let html = fetch::fetch_page(&self.http, &url).await?;
        debug_dump::dump_html(&self.config, citation, "primary", &html);

        let candidate = if let Some(version) = extract_version_token(&html, citation) {
            // Dynamic shell: only the versioned page's content region counts.
            let content_url = fetch::versioned_url(&self.config, citation, &version)?;
            let content_html = fetch::fetch_page(&self.http, &content_url).await?;
            debug_dump::dump_html(&self.config, citation, "versioned", &content_html);

            extract_content_region(&content_html).map(|text| FetchedContent {
                title: extract_title(&text, citation),
                text,
                url: content_url,
            })
        } else {
            extract_content_region(&html).map(|text| FetchedContent {
                title: extract_title(&text, citation),
                text,
                url,
            })
        };

        let Some(candidate) = candidate else {
            return Err(ResolveError::Parse(
                "no structured content region on statute page".into(),
            ));
        };

        self.validate_and_cache(citation, candidate).map(Some)
    }

    /// Rendered fetch of the primary URL; content region preferred, body text
    /// with navigation chrome stripped as the last resort.
    async fn try_browser(&self, citation: &Citation) -> Result<Option<StatuteRecord>, ResolveError> {
        let Some(browser) = &self.browser else {
            return Ok(None);
        };

        let url = fetch::primary_url(&self.config, citation)?;
        let html = browser.fetch_rendered(&url).await?;
        debug_dump::dump_html(&self.config, citation, "rendered", &html);

        let text = extract_content_region(&html)
            .unwrap_or_else(|| strip_navigation_chrome(&strip_tags(&html)));

        let candidate = FetchedContent {
            title: extract_title(&text, citation),
            text,
            url,
        };

        self.validate_and_cache(citation, candidate).map(Some)
    }

    /// The write-side gate: content must validate before it is cached or
    /// returned; invalid content becomes `Parse`, never a best-effort record.
    fn validate_and_cache(
        &self,
        citation: &Citation,
        candidate: FetchedContent,
    ) -> Result<StatuteRecord, ResolveError> {
        debug_dump::dump_text(&self.config, citation, "extracted", &candidate.text);

        validate_content(citation.jurisdiction, &candidate.text)
            .map_err(|f| ResolveError::Parse(f.to_string()))?;

        let record = StatuteRecord {
            jurisdiction: citation.jurisdiction,
            normalized_key: citation.normalized_key.clone(),
            title: candidate.title,
            text: candidate.text,
            url: candidate.url,
            fetched_at: Utc::now(),
        };

        if let Err(e) = self.store.put(&record) {
            tracing::warn!(
                citation = %citation.normalized_key,
                error = %e,
                "Statute cache write failed, returning uncached record"
            );
        }

        tracing::info!(
            citation = %citation.normalized_key,
            url = %record.url,
            text_length = record.text.len(),
            "Statute resolved"
        );
        Ok(record)
    }
}

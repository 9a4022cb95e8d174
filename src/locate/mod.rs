//! Imprint page discovery.
//!
//! Starting from a fetched homepage, the locator tries in order:
//! 1. **Keyword match**: links whose anchor text or path names the imprint
//! 2. **Model selection**: the language model picks from the link list when no
//!    link names the imprint; a chosen legal hub is followed one level deeper
//! 3. **Legal hubs**: keyword-identified hub pages ("Rechtliches", "Legal")
//! 4. **Path probing**: well-known imprint paths against the site origin
//!
//! A chosen page that fails to fetch never ends the search; the next candidate
//! or strategy is tried instead.

mod scoring;
mod selection;

use std::sync::Arc;

use futures::future::BoxFuture;
use log::{debug, info, warn};

use crate::app::origin_of;
use crate::config::{DEFAULT_MAX_HUB_HOPS, FALLBACK_PATHS, MAX_PROMPT_LINKS};
use crate::error_handling::{InfoType, ProcessingStats, WarningType};
use crate::fetch::{FetchedPage, PageFetcher};
use crate::llm::prompts::link_selection_prompt;
use crate::llm::LanguageModel;
use crate::models::LinkCandidate;
use crate::parse::extract_links;

use scoring::{is_hub, rank_links};
use selection::{match_selection, Selection};

/// An imprint page and the URL it was found at.
#[derive(Debug, Clone)]
pub struct LocatedImprint {
    pub url: String,
    pub page: FetchedPage,
}

/// Finds the imprint page of a site.
#[derive(Clone)]
pub struct ImprintLocator {
    fetcher: Arc<dyn PageFetcher>,
    model: Arc<dyn LanguageModel>,
    stats: Arc<ProcessingStats>,
    max_hub_hops: usize,
}

impl ImprintLocator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        model: Arc<dyn LanguageModel>,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Self {
            fetcher,
            model,
            stats,
            max_hub_hops: DEFAULT_MAX_HUB_HOPS,
        }
    }

    /// Sets how many levels of legal hub pages are searched for a nested imprint link.
    pub fn with_max_hub_hops(mut self, max_hub_hops: usize) -> Self {
        self.max_hub_hops = max_hub_hops;
        self
    }

    /// Locates and fetches the imprint page reachable from `homepage`.
    ///
    /// Returns `None` once every strategy is exhausted.
    pub async fn locate(&self, homepage: &FetchedPage) -> Option<LocatedImprint> {
        let links = extract_links(&homepage.content, &homepage.final_url);
        debug!(
            "Found {} same-site links on {}",
            links.len(),
            homepage.final_url
        );

        if let Some(found) = self.search_links(&links, self.max_hub_hops).await {
            return Some(found);
        }
        self.probe_fallback_paths(&homepage.final_url).await
    }

    /// Runs the keyword, model, and hub strategies over one page's links.
    fn search_links<'a>(
        &'a self,
        links: &'a [LinkCandidate],
        hops_left: usize,
    ) -> BoxFuture<'a, Option<LocatedImprint>> {
        Box::pin(async move {
            let ranked = rank_links(links);

            for candidate in &ranked.direct {
                if let Some(page) = self.fetch_candidate(&candidate.href).await {
                    info!("Found imprint link by keyword: {}", candidate.href);
                    self.stats.increment_info(InfoType::KeywordMatch);
                    return Some(LocatedImprint {
                        url: candidate.href.clone(),
                        page,
                    });
                }
            }

            let mut followed_hub = None;
            if ranked.direct.is_empty() && !links.is_empty() {
                if let Some(choice) = self.select_with_model(links).await {
                    if is_hub(choice) && hops_left > 0 {
                        followed_hub = Some(choice.href.as_str());
                        if let Some(found) = self.follow_hub(choice, hops_left).await {
                            return Some(found);
                        }
                    } else if let Some(page) = self.fetch_candidate(&choice.href).await {
                        self.stats.increment_info(InfoType::AiSelection);
                        return Some(LocatedImprint {
                            url: choice.href.clone(),
                            page,
                        });
                    }
                }
            }

            if hops_left > 0 {
                for hub in ranked
                    .staging
                    .iter()
                    .filter(|hub| followed_hub != Some(hub.href.as_str()))
                {
                    if let Some(found) = self.follow_hub(hub, hops_left).await {
                        return Some(found);
                    }
                }
            }
            None
        })
    }

    /// Fetches a legal hub and searches its links; falls back to the hub page itself.
    async fn follow_hub(&self, hub: &LinkCandidate, hops_left: usize) -> Option<LocatedImprint> {
        let page = self.fetch_candidate(&hub.href).await?;
        debug!("Following legal hub {}", hub.href);

        let nested: Vec<LinkCandidate> = extract_links(&page.content, &page.final_url)
            .into_iter()
            .filter(|link| link.href != hub.href && link.href != page.final_url)
            .collect();
        if let Some(found) = self.search_links(&nested, hops_left - 1).await {
            info!("Found imprint {} through legal hub {}", found.url, hub.href);
            self.stats.increment_info(InfoType::HubHop);
            return Some(found);
        }

        info!(
            "No imprint link on legal hub {}, using the hub page",
            hub.href
        );
        self.stats.increment_info(InfoType::HubAccepted);
        Some(LocatedImprint {
            url: hub.href.clone(),
            page,
        })
    }

    /// Asks the model to pick the imprint link. Failures count as no selection.
    async fn select_with_model<'a>(
        &self,
        links: &'a [LinkCandidate],
    ) -> Option<&'a LinkCandidate> {
        let reply = match self.model.generate(&link_selection_prompt(links)).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Link selection failed, continuing without it: {e}");
                self.stats.increment_warning(WarningType::LinkSelectionFailed);
                return None;
            }
        };

        let shown = &links[..links.len().min(MAX_PROMPT_LINKS)];
        match match_selection(&reply, shown) {
            Selection::Chosen(candidate) => {
                info!("Model selected imprint link {}", candidate.href);
                Some(candidate)
            }
            Selection::Nothing => {
                debug!("Model found no imprint link among {} candidates", shown.len());
                None
            }
            Selection::Unknown(token) => {
                warn!("Model selected a link that is not on the page: {token}");
                self.stats.increment_warning(WarningType::HallucinatedLink);
                None
            }
        }
    }

    async fn fetch_candidate(&self, url: &str) -> Option<FetchedPage> {
        match self.fetcher.fetch(url).await {
            Ok(page) => {
                if page.attempts > 1 {
                    self.stats.increment_info(InfoType::FetchRetried);
                }
                Some(page)
            }
            Err(e) => {
                warn!("Failed to fetch imprint candidate {url}: {e}");
                None
            }
        }
    }

    /// Probes well-known imprint paths; the first 200 with a non-empty body wins.
    async fn probe_fallback_paths(&self, base_url: &str) -> Option<LocatedImprint> {
        let origin = origin_of(base_url)?;
        for path in FALLBACK_PATHS {
            let url = format!("{origin}{path}");
            match self.fetcher.fetch(&url).await {
                Ok(page) if page.status == 200 && !page.content.trim().is_empty() => {
                    info!("Found imprint by path probing: {url}");
                    self.stats.increment_info(InfoType::PathFallback);
                    return Some(LocatedImprint { url, page });
                }
                Ok(page) => debug!(
                    "Fallback path {url} answered {} with {} bytes",
                    page.status,
                    page.content.len()
                ),
                Err(e) => debug!("Fallback path {url} failed: {e}"),
            }
        }
        None
    }
}

//! Cycle orchestration: one news fetch, then one concurrent generation call
//! per selected platform.
//!
//! The state of the latest cycle is a plain [`CycleState`] value. It only
//! changes through its step methods, and every step names the cycle it
//! belongs to, so results that arrive after a newer cycle has started are
//! dropped instead of overwriting fresh entries. The orchestrator publishes
//! each transition on a `watch` channel; the presentation layer subscribes
//! to it.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use common::{ContentStatus, GeneratedContent, NewsArticle, Platform};

use crate::error::CycleError;
use crate::llm::content::ContentGenerator;
use crate::news::NewsProvider;
use crate::platforms::PlatformCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    /// No cycle has run yet.
    Idle,
    FetchingNews,
    Generating,
    /// Every generation call has resolved.
    Settled,
    /// The news fetch failed; no generation was attempted.
    Failed,
}

/// Snapshot of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleState {
    /// Monotonic cycle id; 0 means no cycle yet
    pub cycle: u64,
    pub phase: CyclePhase,
    pub keywords: String,
    pub articles: Vec<NewsArticle>,
    /// One entry per selected platform, in selection order
    pub contents: Vec<GeneratedContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl Default for CycleState {
    fn default() -> Self {
        Self {
            cycle: 0,
            phase: CyclePhase::Idle,
            keywords: String::new(),
            articles: Vec::new(),
            contents: Vec::new(),
            failure: None,
        }
    }
}

impl CycleState {
    /// Fresh state for `cycle` with a `generating` placeholder per platform.
    pub fn begin(cycle: u64, keywords: impl Into<String>, platforms: &[Platform]) -> Self {
        Self {
            cycle,
            phase: CyclePhase::FetchingNews,
            keywords: keywords.into(),
            articles: Vec::new(),
            contents: platforms
                .iter()
                .map(|p| GeneratedContent::generating(p.id.clone()))
                .collect(),
            failure: None,
        }
    }

    pub fn record_articles(&mut self, cycle: u64, articles: Vec<NewsArticle>) -> bool {
        if cycle != self.cycle || self.phase != CyclePhase::FetchingNews {
            return false;
        }
        self.articles = articles;
        self.phase = CyclePhase::Generating;
        true
    }

    pub fn resolve_ready(&mut self, cycle: u64, platform: &str, content: String) -> bool {
        self.resolve(cycle, platform, ContentStatus::Ready, content)
    }

    pub fn resolve_error(&mut self, cycle: u64, platform: &str) -> bool {
        self.resolve(cycle, platform, ContentStatus::Error, String::new())
    }

    // An entry leaves `generating` at most once.
    fn resolve(&mut self, cycle: u64, platform: &str, status: ContentStatus, content: String) -> bool {
        if cycle != self.cycle || self.phase != CyclePhase::Generating {
            return false;
        }
        match self
            .contents
            .iter_mut()
            .find(|c| c.platform == platform && c.status == ContentStatus::Generating)
        {
            Some(entry) => {
                entry.status = status;
                entry.content = content;
                true
            }
            None => false,
        }
    }

    /// Mark the cycle settled once no entry is still generating.
    pub fn settle(&mut self, cycle: u64) -> bool {
        if cycle != self.cycle
            || self.phase != CyclePhase::Generating
            || !self.contents.iter().all(|c| c.status.is_settled())
        {
            return false;
        }
        self.phase = CyclePhase::Settled;
        true
    }

    /// News failure: every placeholder becomes `error` and the cycle ends.
    pub fn fail(&mut self, cycle: u64, message: impl Into<String>) -> bool {
        if cycle != self.cycle || self.phase != CyclePhase::FetchingNews {
            return false;
        }
        for entry in self.contents.iter_mut() {
            entry.status = ContentStatus::Error;
            entry.content.clear();
        }
        self.failure = Some(message.into());
        self.phase = CyclePhase::Failed;
        true
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, CyclePhase::Settled | CyclePhase::Failed)
    }
}

/// A validated cycle whose placeholders are already published.
#[derive(Debug, Clone)]
pub struct PreparedCycle {
    state: CycleState,
    platforms: Vec<Platform>,
}

impl PreparedCycle {
    pub fn id(&self) -> u64 {
        self.state.cycle
    }

    /// The placeholder snapshot published by `begin_cycle`.
    pub fn state(&self) -> &CycleState {
        &self.state
    }
}

pub struct Orchestrator {
    news: Arc<dyn NewsProvider>,
    generator: Arc<ContentGenerator>,
    catalog: PlatformCatalog,
    state: watch::Sender<CycleState>,
}

impl Orchestrator {
    pub fn new(
        news: Arc<dyn NewsProvider>,
        generator: Arc<ContentGenerator>,
        catalog: PlatformCatalog,
    ) -> Self {
        let (state, _) = watch::channel(CycleState::default());
        Self {
            news,
            generator,
            catalog,
            state,
        }
    }

    pub fn catalog(&self) -> &PlatformCatalog {
        &self.catalog
    }

    /// Receiver that sees every published transition.
    pub fn subscribe(&self) -> watch::Receiver<CycleState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> CycleState {
        self.state.borrow().clone()
    }

    /// Validate input and publish the `generating` placeholders.
    ///
    /// Empty keywords (after trimming), an empty selection or an unknown
    /// platform id leave the current state untouched.
    pub fn begin_cycle<S: AsRef<str>>(
        &self,
        keywords: &str,
        platform_ids: &[S],
    ) -> Result<PreparedCycle, CycleError> {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            return Err(CycleError::InvalidInput("keywords are empty".into()));
        }
        if platform_ids.is_empty() {
            return Err(CycleError::InvalidInput("no platform selected".into()));
        }

        let mut platforms: Vec<Platform> = Vec::with_capacity(platform_ids.len());
        for id in platform_ids {
            let id = id.as_ref();
            let platform = self
                .catalog
                .get(id)
                .ok_or_else(|| CycleError::InvalidInput(format!("unknown platform '{}'", id)))?;
            if !platforms.iter().any(|p| p.id == platform.id) {
                platforms.push(platform.clone());
            }
        }

        // The next id is taken under the channel's write lock, so the newest
        // cycle is always the published one.
        let mut state = CycleState::default();
        self.state.send_modify(|current| {
            *current = CycleState::begin(current.cycle + 1, keywords, &platforms);
            state = current.clone();
        });
        let cycle = state.cycle;
        info!(
            cycle,
            keywords,
            platforms = ?platforms.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            "cycle started"
        );

        Ok(PreparedCycle { state, platforms })
    }

    /// Fetch news, fan out generation, and return this cycle's final state.
    ///
    /// The returned state is always this cycle's own, even if a newer cycle
    /// has replaced it in the published state meanwhile.
    pub async fn drive_cycle(&self, prepared: PreparedCycle) -> Result<CycleState, CycleError> {
        let PreparedCycle { state: mut local, platforms } = prepared;
        let cycle = local.cycle;
        let keywords = local.keywords.clone();

        let articles = match self.news.fetch_news(&keywords).await {
            Ok(articles) => articles,
            Err(e) => {
                error!(cycle, error = %format!("{:#}", e.cause()), "news fetch failed; skipping generation");
                let message = e.to_string();
                self.step(&mut local, |s| s.fail(cycle, message.clone()));
                return Err(e.into());
            }
        };
        info!(cycle, count = articles.len(), "news fetched; generating content");
        self.step(&mut local, |s| s.record_articles(cycle, articles.clone()));

        let generator = &self.generator;
        let keywords = keywords.as_str();
        let articles = articles.as_slice();
        let mut pending: FuturesUnordered<_> = platforms
            .iter()
            .map(|platform| async move {
                let outcome = generator.generate(keywords, platform, articles).await;
                (platform, outcome)
            })
            .collect();

        while let Some((platform, outcome)) = pending.next().await {
            match outcome {
                Ok(content) => {
                    debug!(cycle, platform = %platform.id, chars = content.chars().count(), "content ready");
                    self.step(&mut local, |s| s.resolve_ready(cycle, &platform.id, content.clone()));
                }
                Err(e) => {
                    error!(cycle, platform = %platform.id, error = %format!("{:#}", e.cause()), "content generation failed");
                    self.step(&mut local, |s| s.resolve_error(cycle, &platform.id));
                }
            }
        }

        self.step(&mut local, |s| s.settle(cycle));
        let ready = local
            .contents
            .iter()
            .filter(|c| c.status == ContentStatus::Ready)
            .count();
        info!(cycle, ready, failed = local.contents.len() - ready, "cycle settled");
        Ok(local)
    }

    /// `begin_cycle` followed by `drive_cycle`.
    pub async fn run_cycle<S: AsRef<str>>(
        &self,
        keywords: &str,
        platform_ids: &[S],
    ) -> Result<CycleState, CycleError> {
        let prepared = self.begin_cycle(keywords, platform_ids)?;
        self.drive_cycle(prepared).await
    }

    // Apply one transition to this cycle's own state and to the published
    // state. The published one ignores it when a newer cycle owns it.
    fn step(&self, local: &mut CycleState, transition: impl Fn(&mut CycleState) -> bool) {
        transition(local);
        let published = self.state.send_if_modified(|s| transition(s));
        if !published {
            let current = self.state.borrow().cycle;
            if current != local.cycle {
                warn!(cycle = local.cycle, current, "discarding result of superseded cycle");
            }
        }
    }
}

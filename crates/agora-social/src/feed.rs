//! Feed assembly
//!
//! Candidates are filtered after the registry returns them, and filtering is
//! lossy, so each round reads a window of `page_size * overfetch_factor`
//! candidates and keeps at most `page_size` visible ones. A page may come
//! back short; it never contains an item the viewer may not see.
//!
//! Per call, graph facts are derived exactly once (concurrently with the
//! first candidate read) and each distinct author's close-friends list is
//! read at most once, however many rounds run.

use crate::graph::{load_close_friend_lists, load_graph_facts, SocialGraphFacts};
use crate::story::is_live_for;
use crate::visibility::VisibilityResolver;
use agora_core::effects::{
    dependency, CandidateQuery, ContentRegistryEffects, FeedCursor, PhysicalTimeEffects,
    RandomEffects, SocialGraphEffects,
};
use agora_core::{
    AgoraError, ContentDocument, ContentItem, ContentKind, FeedConfig, PhysicalTime, Result,
    UserId,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ordering of a feed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedOrder {
    /// Newest first
    #[default]
    Recency,
    /// Visible candidates of the window in random order
    Random,
}

/// Where a feed page starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedPosition {
    /// Zero-based page number; one candidate window per page
    Page(u32),
    /// Strictly after a cursor returned by a previous page
    After(FeedCursor),
}

impl Default for FeedPosition {
    fn default() -> Self {
        Self::Page(0)
    }
}

/// A feed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    /// Requesting identity
    pub viewer: UserId,
    /// Page number or cursor
    pub position: FeedPosition,
    /// Requested page size; `None` uses the configured default
    pub page_size: Option<usize>,
    /// Recency or random order
    pub order: FeedOrder,
    /// Restrict to these kinds; `None` means all kinds
    pub kinds: Option<BTreeSet<ContentKind>>,
}

impl FeedRequest {
    /// First page of everything, newest first.
    pub fn new(viewer: UserId) -> Self {
        Self {
            viewer,
            position: FeedPosition::default(),
            page_size: None,
            order: FeedOrder::default(),
            kinds: None,
        }
    }

    /// Request page `page`.
    pub fn page(mut self, page: u32) -> Self {
        self.position = FeedPosition::Page(page);
        self
    }

    /// Continue after `cursor`.
    pub fn after(mut self, cursor: FeedCursor) -> Self {
        self.position = FeedPosition::After(cursor);
        self
    }

    /// Set the page size.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the ordering.
    pub fn order(mut self, order: FeedOrder) -> Self {
        self.order = order;
        self
    }

    /// Restrict to the given kinds.
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = ContentKind>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }
}

/// One assembled page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage {
    /// Visible items, at most the requested page size
    pub items: Vec<ContentItem>,
    /// Resume point for `FeedPosition::After`; `None` once the registry is
    /// exhausted
    pub next_cursor: Option<FeedCursor>,
    /// Candidates read from the registry
    pub examined: usize,
    /// Candidates skipped because they could not be decoded
    pub skipped_malformed: usize,
}

/// Running state of a single `assemble` call.
struct Round {
    survivors: Vec<ContentItem>,
    last_examined: Option<FeedCursor>,
    examined: usize,
    skipped_malformed: usize,
    exhausted: bool,
}

/// Feed assembler.
///
/// Stateless apart from configuration; effects are passed per call.
#[derive(Debug, Clone, Default)]
pub struct FeedAssembler {
    config: FeedConfig,
}

impl FeedAssembler {
    /// Create an assembler with the given configuration.
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Assemble one page of `request.viewer`'s feed.
    ///
    /// # Errors
    /// * `AgoraError::Validation` if the page size is zero or above the
    ///   configured maximum
    /// * `AgoraError::Dependency` if the graph store, registry or clock fails;
    ///   the call never degrades to "no relationships"
    pub async fn assemble<E>(&self, effects: &E, request: &FeedRequest) -> Result<FeedPage>
    where
        E: SocialGraphEffects
            + ContentRegistryEffects
            + PhysicalTimeEffects
            + RandomEffects
            + ?Sized,
    {
        let page_size = self.validate_page_size(request.page_size)?;
        let window = self.config.window_for(page_size);
        let viewer = request.viewer;

        let (first_query, max_rounds) = match request.position {
            FeedPosition::Page(page) => (
                CandidateQuery {
                    kinds: request.kinds.clone(),
                    after: None,
                    offset: (page as usize).saturating_mul(window),
                    limit: window,
                },
                1,
            ),
            FeedPosition::After(cursor) => (
                CandidateQuery {
                    kinds: request.kinds.clone(),
                    after: Some(cursor),
                    offset: 0,
                    limit: window,
                },
                if self.config.retry_short_pages {
                    self.config.max_fetch_rounds
                } else {
                    1
                },
            ),
        };

        // Stage one: facts, first window and clock in parallel.
        let (mut facts, first_batch, now) = tokio::try_join!(
            load_graph_facts(effects, &viewer),
            Self::read_window(effects, &first_query),
            Self::read_clock(effects),
        )?;

        let mut round = Round {
            survivors: Vec::new(),
            last_examined: None,
            examined: 0,
            skipped_malformed: 0,
            exhausted: false,
        };

        let mut batch = first_batch;
        let mut rounds_run = 1;
        loop {
            self.absorb(effects, &mut facts, &mut round, batch, window, now)
                .await?;

            let filled = round.survivors.len() >= page_size;
            if filled || round.exhausted || rounds_run >= max_rounds {
                break;
            }

            let next_query = CandidateQuery {
                kinds: request.kinds.clone(),
                after: round.last_examined,
                offset: 0,
                limit: window,
            };
            tracing::debug!(
                viewer = %viewer,
                round = rounds_run + 1,
                "short page, reading next window"
            );
            batch = Self::read_window(effects, &next_query).await?;
            rounds_run += 1;
        }

        let Round {
            mut survivors,
            last_examined,
            examined,
            skipped_malformed,
            exhausted,
        } = round;

        let truncated = survivors.len() > page_size;
        let next_cursor = match request.order {
            FeedOrder::Recency => {
                survivors.truncate(page_size);
                if truncated {
                    survivors.last().map(FeedCursor::of_item)
                } else if exhausted {
                    None
                } else {
                    last_examined
                }
            }
            FeedOrder::Random => {
                let seed = effects.random_u64().await;
                survivors.shuffle(&mut StdRng::seed_from_u64(seed));
                survivors.truncate(page_size);
                if exhausted {
                    None
                } else {
                    last_examined
                }
            }
        };

        tracing::debug!(
            viewer = %viewer,
            returned = survivors.len(),
            examined,
            skipped_malformed,
            rounds = rounds_run,
            "assembled feed page"
        );

        Ok(FeedPage {
            items: survivors,
            next_cursor,
            examined,
            skipped_malformed,
        })
    }

    fn validate_page_size(&self, requested: Option<usize>) -> Result<usize> {
        let page_size = requested.unwrap_or(self.config.default_page_size);
        if page_size == 0 {
            return Err(AgoraError::validation("page size must be positive"));
        }
        if page_size > self.config.max_page_size {
            return Err(AgoraError::validation(format!(
                "page size {page_size} exceeds maximum {}",
                self.config.max_page_size
            )));
        }
        Ok(page_size)
    }

    /// Decode, resolve and keep the visible candidates of one window.
    async fn absorb<E>(
        &self,
        effects: &E,
        facts: &mut SocialGraphFacts,
        round: &mut Round,
        batch: Vec<ContentDocument>,
        window: usize,
        now: PhysicalTime,
    ) -> Result<()>
    where
        E: SocialGraphEffects + ?Sized,
    {
        let viewer = facts.viewer();
        round.examined += batch.len();
        round.exhausted = batch.len() < window;
        if let Some(last) = batch.last() {
            round.last_examined = Some(FeedCursor::of_document(last));
        }

        let mut decoded = Vec::with_capacity(batch.len());
        for doc in &batch {
            match doc.decode(self.config.unknown_visibility) {
                Ok(item) => decoded.push(item),
                Err(err) => {
                    round.skipped_malformed += 1;
                    tracing::warn!(item_id = %doc.id, error = %err, "skipping malformed candidate");
                }
            }
        }

        decoded.retain(|item| is_live_for(item, &viewer, now));

        let authors = VisibilityResolver::close_friend_authors(&viewer, &decoded);
        load_close_friend_lists(effects, facts, authors).await?;

        let facts: &SocialGraphFacts = facts;
        round.survivors.extend(
            decoded
                .into_iter()
                .filter(|item| VisibilityResolver::can_view(&viewer, item, facts)),
        );
        Ok(())
    }

    async fn read_window<E>(effects: &E, query: &CandidateQuery) -> Result<Vec<ContentDocument>>
    where
        E: ContentRegistryEffects + ?Sized,
    {
        effects.recent_items(query).await.map_err(|e| {
            tracing::warn!(error = %e, "content registry read failed");
            AgoraError::from_store(dependency::CONTENT_REGISTRY, e)
        })
    }

    async fn read_clock<E>(effects: &E) -> Result<PhysicalTime>
    where
        E: PhysicalTimeEffects + ?Sized,
    {
        effects
            .physical_time()
            .await
            .map_err(|e| AgoraError::from_store(dependency::CLOCK, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler(max_page_size: usize) -> FeedAssembler {
        FeedAssembler::new(FeedConfig {
            max_page_size,
            ..FeedConfig::default()
        })
    }

    #[test]
    fn test_page_size_defaults_and_bounds() {
        let assembler = assembler(50);
        assert_eq!(assembler.validate_page_size(None).unwrap(), 20);
        assert_eq!(assembler.validate_page_size(Some(50)).unwrap(), 50);
        assert!(matches!(
            assembler.validate_page_size(Some(0)),
            Err(AgoraError::Validation { .. })
        ));
        assert!(matches!(
            assembler.validate_page_size(Some(51)),
            Err(AgoraError::Validation { .. })
        ));
    }

    #[test]
    fn test_request_builder() {
        let viewer = UserId::new_from_entropy([1u8; 32]);
        let request = FeedRequest::new(viewer)
            .page(2)
            .page_size(10)
            .order(FeedOrder::Random)
            .kinds([ContentKind::Reel]);

        assert_eq!(request.position, FeedPosition::Page(2));
        assert_eq!(request.page_size, Some(10));
        assert_eq!(request.order, FeedOrder::Random);
        assert_eq!(
            request.kinds,
            Some([ContentKind::Reel].into_iter().collect())
        );
    }
}

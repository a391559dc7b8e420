//! In-memory effect system with fault injection and read counters

use crate::time::ControllableClock;
use agora_core::effects::{
    CandidateQuery, ContentRegistryEffects, PhysicalTimeEffects, RandomEffects,
    SocialGraphEffects, StoreError, StoryStoreEffects, ViewerInsert,
};
use agora_core::{ContentDocument, ContentId, ContentItem, PhysicalTime, StoryReaction, UserId};
use agora_effects::{MemoryContentStore, MemorySocialGraph};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Per-interface read and write counters.
#[derive(Debug, Default)]
pub struct EffectCounters {
    following_reads: AtomicUsize,
    follower_reads: AtomicUsize,
    close_friend_reads: AtomicUsize,
    registry_reads: AtomicUsize,
    item_reads: AtomicUsize,
    story_writes: AtomicUsize,
}

impl EffectCounters {
    /// `following_of` calls
    pub fn following_reads(&self) -> usize {
        self.following_reads.load(Ordering::SeqCst)
    }

    /// `followers_of` calls
    pub fn follower_reads(&self) -> usize {
        self.follower_reads.load(Ordering::SeqCst)
    }

    /// `close_friends_of` calls
    pub fn close_friend_reads(&self) -> usize {
        self.close_friend_reads.load(Ordering::SeqCst)
    }

    /// Total social graph calls
    pub fn graph_reads(&self) -> usize {
        self.following_reads() + self.follower_reads() + self.close_friend_reads()
    }

    /// `recent_items` calls
    pub fn registry_reads(&self) -> usize {
        self.registry_reads.load(Ordering::SeqCst)
    }

    /// `item_by_id` calls
    pub fn item_reads(&self) -> usize {
        self.item_reads.load(Ordering::SeqCst)
    }

    /// Story store mutations attempted
    pub fn story_writes(&self) -> usize {
        self.story_writes.load(Ordering::SeqCst)
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct Faults {
    graph: AtomicBool,
    registry: AtomicBool,
    story_store: AtomicBool,
    clock: AtomicBool,
}

fn injected(interface: &str) -> StoreError {
    StoreError::Unavailable(format!("injected {interface} failure"))
}

/// Deterministic seed source
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: Arc<Mutex<StdRng>>,
}

impl SeededRandom {
    /// Create a source seeded with `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

#[async_trait]
impl RandomEffects for SeededRandom {
    async fn random_u64(&self) -> u64 {
        self.rng.lock().unwrap().next_u64()
    }
}

/// Effect system for tests.
///
/// Backed by the in-memory handlers from `agora-effects`, with a
/// controllable clock, seeded randomness, per-interface failure switches and
/// call counters. Clones share all state.
#[derive(Debug, Clone)]
pub struct TestEffects {
    graph: MemorySocialGraph,
    content: MemoryContentStore,
    clock: ControllableClock,
    random: SeededRandom,
    faults: Arc<Faults>,
    counters: Arc<EffectCounters>,
}

impl Default for TestEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEffects {
    /// Empty stores, clock at `test_time()`, random seed 42.
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    /// Like `new` with a specific random seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            graph: MemorySocialGraph::new(),
            content: MemoryContentStore::new(),
            clock: ControllableClock::default(),
            random: SeededRandom::new(seed),
            faults: Arc::new(Faults::default()),
            counters: Arc::new(EffectCounters::default()),
        }
    }

    /// Social graph store
    pub fn graph(&self) -> &MemorySocialGraph {
        &self.graph
    }

    /// Content store
    pub fn content(&self) -> &MemoryContentStore {
        &self.content
    }

    /// Clock
    pub fn clock(&self) -> &ControllableClock {
        &self.clock
    }

    /// Call counters
    pub fn counters(&self) -> &EffectCounters {
        &self.counters
    }

    /// Store a decoded item.
    pub async fn seed(&self, item: &ContentItem) {
        self.content.upsert(ContentDocument::from_item(item)).await;
    }

    /// Store many decoded items.
    pub async fn seed_all<'a>(&self, items: impl IntoIterator<Item = &'a ContentItem>) {
        self.content
            .upsert_all(items.into_iter().map(ContentDocument::from_item))
            .await;
    }

    /// Store a raw document, e.g. one that does not decode.
    pub async fn seed_document(&self, document: ContentDocument) {
        self.content.upsert(document).await;
    }

    /// Current stored state of an item.
    pub async fn stored(&self, id: &ContentId) -> Option<ContentDocument> {
        self.content.item_by_id(id).await.unwrap()
    }

    /// Make every social graph call fail.
    pub fn fail_graph(&self, fail: bool) {
        self.faults.graph.store(fail, Ordering::SeqCst);
    }

    /// Make every content registry call fail.
    pub fn fail_registry(&self, fail: bool) {
        self.faults.registry.store(fail, Ordering::SeqCst);
    }

    /// Make every story store mutation fail.
    pub fn fail_story_store(&self, fail: bool) {
        self.faults.story_store.store(fail, Ordering::SeqCst);
    }

    /// Make the clock fail.
    pub fn fail_clock(&self, fail: bool) {
        self.faults.clock.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, interface: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(injected(interface))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SocialGraphEffects for TestEffects {
    async fn following_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        EffectCounters::bump(&self.counters.following_reads);
        Self::check(&self.faults.graph, "social graph")?;
        self.graph.following_of(user).await
    }

    async fn followers_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        EffectCounters::bump(&self.counters.follower_reads);
        Self::check(&self.faults.graph, "social graph")?;
        self.graph.followers_of(user).await
    }

    async fn close_friends_of(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        EffectCounters::bump(&self.counters.close_friend_reads);
        Self::check(&self.faults.graph, "social graph")?;
        self.graph.close_friends_of(user).await
    }
}

#[async_trait]
impl ContentRegistryEffects for TestEffects {
    async fn recent_items(
        &self,
        query: &CandidateQuery,
    ) -> Result<Vec<ContentDocument>, StoreError> {
        EffectCounters::bump(&self.counters.registry_reads);
        Self::check(&self.faults.registry, "content registry")?;
        self.content.recent_items(query).await
    }

    async fn item_by_id(&self, id: &ContentId) -> Result<Option<ContentDocument>, StoreError> {
        EffectCounters::bump(&self.counters.item_reads);
        Self::check(&self.faults.registry, "content registry")?;
        self.content.item_by_id(id).await
    }
}

#[async_trait]
impl StoryStoreEffects for TestEffects {
    async fn add_viewer(
        &self,
        story_id: &ContentId,
        viewer: &UserId,
    ) -> Result<ViewerInsert, StoreError> {
        EffectCounters::bump(&self.counters.story_writes);
        Self::check(&self.faults.story_store, "story store")?;
        self.content.add_viewer(story_id, viewer).await
    }

    async fn append_reaction(
        &self,
        story_id: &ContentId,
        reaction: StoryReaction,
    ) -> Result<bool, StoreError> {
        EffectCounters::bump(&self.counters.story_writes);
        Self::check(&self.faults.story_store, "story store")?;
        self.content.append_reaction(story_id, reaction).await
    }

    async fn set_archived(&self, story_id: &ContentId, archived: bool) -> Result<bool, StoreError> {
        EffectCounters::bump(&self.counters.story_writes);
        Self::check(&self.faults.story_store, "story store")?;
        self.content.set_archived(story_id, archived).await
    }

    async fn set_highlighted(
        &self,
        story_id: &ContentId,
        highlighted: bool,
    ) -> Result<bool, StoreError> {
        EffectCounters::bump(&self.counters.story_writes);
        Self::check(&self.faults.story_store, "story store")?;
        self.content.set_highlighted(story_id, highlighted).await
    }
}

#[async_trait]
impl PhysicalTimeEffects for TestEffects {
    async fn physical_time(&self) -> Result<PhysicalTime, StoreError> {
        Self::check(&self.faults.clock, "clock")?;
        self.clock.physical_time().await
    }
}

#[async_trait]
impl RandomEffects for TestEffects {
    async fn random_u64(&self) -> u64 {
        self.random.random_u64().await
    }
}

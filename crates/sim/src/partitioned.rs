//! Simulated spatially-partitioned host.

use crate::pool::BackgroundPool;
use crate::task::SimTask;
use crate::worker::TickWorker;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::ThreadId;
use std::time::Duration;
use tickbridge_core::{Action, Coordinate, EntityId, Ticks, WorldId};
use tickbridge_host::{
    AuthorityScheduler, Host, HostError, PartitionedScheduler, Rejection, RetiredCallback,
    SubmitResult,
};
use tracing::trace;

/// Region granularity in blocks (power of two).
const REGION_SHIFT: u32 = 9;

type RegionKey = (u64, i64, i64);

fn region_key(at: Coordinate) -> RegionKey {
    (at.world.get(), at.x >> REGION_SHIFT, at.z >> REGION_SHIFT)
}

/// Per-submission entity task state: holds the retired callback until it is
/// either fired (entity removed first) or discarded (one-shot ran).
struct EntityTaskState {
    retired: Mutex<Option<RetiredCallback>>,
}

impl EntityTaskState {
    fn new(retired: Option<RetiredCallback>) -> Arc<Self> {
        Arc::new(Self {
            retired: Mutex::new(retired),
        })
    }

    fn take(&self) -> Option<RetiredCallback> {
        self.retired
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn fire(&self) {
        if let Some(callback) = self.take() {
            callback();
        }
    }
}

struct EntityRecord {
    region: usize,
    watchers: Vec<Weak<EntityTaskState>>,
}

struct Topology {
    worlds: HashSet<WorldId>,
    overrides: HashMap<RegionKey, usize>,
}

struct Inner {
    global: TickWorker,
    regions: Vec<TickWorker>,
    topology: Mutex<Topology>,
    entities: Mutex<HashMap<EntityId, EntityRecord>>,
    pool: BackgroundPool,
}

impl Inner {
    fn topology(&self) -> MutexGuard<'_, Topology> {
        self.topology.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn entities(&self) -> MutexGuard<'_, HashMap<EntityId, EntityRecord>> {
        self.entities.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn world_loaded(&self, world: WorldId) -> bool {
        self.topology().worlds.contains(&world)
    }

    /// Current owning region index for a coordinate. Ownership can be
    /// remapped at runtime; callers must re-resolve per dispatch.
    fn owner_index(&self, at: Coordinate) -> usize {
        let key = region_key(at);
        if let Some(&index) = self.topology().overrides.get(&key) {
            return index;
        }
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.regions.len() as u64) as usize
    }
}

fn lock_action(action: &Arc<Mutex<Action>>) -> MutexGuard<'_, Action> {
    action.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Arm the next invocation of a region-affine task on the coordinate's
/// current owner. Re-resolves ownership and world state every hop, so
/// migrations are honored and unloaded worlds drop the dispatch silently.
fn schedule_region_hop(
    weak: Weak<Inner>,
    at: Coordinate,
    action: Arc<Mutex<Action>>,
    delay: u64,
    period: Option<u64>,
    cancelled: Arc<AtomicBool>,
) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let owner = inner.owner_index(at);
    let hop = {
        let weak = weak.clone();
        let action = Arc::clone(&action);
        let cancelled = Arc::clone(&cancelled);
        Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.world_loaded(at.world) {
                trace!(%at, "world unloaded before dispatch, dropping");
                return;
            }
            {
                let mut run = lock_action(&action);
                (*run)();
            }
            if let Some(period) = period {
                if !cancelled.load(Ordering::Acquire) {
                    schedule_region_hop(
                        weak.clone(),
                        at,
                        Arc::clone(&action),
                        period,
                        Some(period),
                        Arc::clone(&cancelled),
                    );
                }
            }
        })
    };
    inner.regions[owner].submit(hop, delay, None, cancelled);
}

/// Arm the next invocation of an entity-affine task on the thread owning
/// the entity's current region. A removed entity skips the dispatch; its
/// retired callback was already fired by the remover.
fn schedule_entity_hop(
    weak: Weak<Inner>,
    entity: EntityId,
    action: Arc<Mutex<Action>>,
    state: Arc<EntityTaskState>,
    delay: u64,
    period: Option<u64>,
    cancelled: Arc<AtomicBool>,
) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let Some(owner) = inner.entities().get(&entity).map(|r| r.region) else {
        return;
    };
    let hop = {
        let weak = weak.clone();
        let action = Arc::clone(&action);
        let state = Arc::clone(&state);
        let cancelled = Arc::clone(&cancelled);
        Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.entities().contains_key(&entity) {
                trace!(%entity, "entity removed before dispatch, dropping");
                return;
            }
            {
                let mut run = lock_action(&action);
                (*run)();
            }
            match period {
                Some(period) => {
                    if !cancelled.load(Ordering::Acquire) {
                        schedule_entity_hop(
                            weak.clone(),
                            entity,
                            Arc::clone(&action),
                            Arc::clone(&state),
                            period,
                            Some(period),
                            Arc::clone(&cancelled),
                        );
                    }
                }
                // One-shot ran: a later removal must not fire the callback.
                None => drop(state.take()),
            }
        })
    };
    inner.regions[owner].submit(hop, delay, None, cancelled);
}

/// Partitioned host: a global queue, N region tick loops with migratable
/// coordinate ownership, an entity registry and a real-time background
/// pool. Its classic surface is administratively disabled, as partitioned
/// hosts do.
#[derive(Clone)]
pub struct SimPartitionedHost {
    inner: Arc<Inner>,
}

impl SimPartitionedHost {
    /// Host with `regions` region threads ticking at the standard rate.
    pub fn new(regions: usize) -> Self {
        Self::with_tick(regions, tickbridge_core::TICK)
    }

    /// Host with a custom tick length (tests run millisecond ticks).
    pub fn with_tick(regions: usize, tick: Duration) -> Self {
        assert!(regions > 0, "at least one region thread is required");
        let region_workers = (0..regions)
            .map(|i| TickWorker::spawn(format!("sim-region-{i}"), tick))
            .collect();
        Self {
            inner: Arc::new(Inner {
                global: TickWorker::spawn("sim-global".into(), tick),
                regions: region_workers,
                topology: Mutex::new(Topology {
                    worlds: HashSet::new(),
                    overrides: HashMap::new(),
                }),
                entities: Mutex::new(HashMap::new()),
                pool: BackgroundPool::new(),
            }),
        }
    }

    /// Mark a world loaded.
    pub fn load_world(&self, world: WorldId) {
        self.inner.topology().worlds.insert(world);
    }

    /// Unload a world. Pending dispatches against it are dropped silently.
    pub fn unload_world(&self, world: WorldId) {
        self.inner.topology().worlds.remove(&world);
    }

    /// Pin the region containing `at` to a specific region thread,
    /// simulating an ownership migration.
    pub fn migrate_region(&self, at: Coordinate, region: usize) {
        assert!(region < self.inner.regions.len());
        self.inner.topology().overrides.insert(region_key(at), region);
    }

    /// Register a live entity owned by the given region thread.
    pub fn spawn_entity(&self, entity: EntityId, region: usize) {
        assert!(region < self.inner.regions.len());
        self.inner.entities().insert(
            entity,
            EntityRecord {
                region,
                watchers: Vec::new(),
            },
        );
    }

    /// Move a live entity to another region thread. Returns false if the
    /// entity is gone.
    pub fn migrate_entity(&self, entity: EntityId, region: usize) -> bool {
        assert!(region < self.inner.regions.len());
        match self.inner.entities().get_mut(&entity) {
            Some(record) => {
                record.region = region;
                true
            }
            None => false,
        }
    }

    /// Remove an entity, firing the retired callbacks of its pending work.
    pub fn remove_entity(&self, entity: EntityId) {
        let record = self.inner.entities().remove(&entity);
        if let Some(record) = record {
            for watcher in record.watchers {
                if let Some(state) = watcher.upgrade() {
                    state.fire();
                }
            }
        }
    }

    /// Id of the global queue thread.
    pub fn global_thread_id(&self) -> ThreadId {
        self.inner.global.thread_id()
    }

    /// Id of the thread currently owning the region containing `at`.
    pub fn region_thread_id(&self, at: Coordinate) -> ThreadId {
        self.inner.regions[self.inner.owner_index(at)].thread_id()
    }

    /// Id of a region thread by index.
    pub fn region_worker_thread_id(&self, region: usize) -> ThreadId {
        self.inner.regions[region].thread_id()
    }

    /// Number of region threads.
    pub fn region_count(&self) -> usize {
        self.inner.regions.len()
    }

    /// Stop all workers and the background pool.
    pub fn shutdown(&self) {
        self.inner.global.shutdown();
        for region in &self.inner.regions {
            region.shutdown();
        }
        self.inner.pool.shutdown();
    }

    fn queue_global(&self, action: Action, delay: Ticks, period: Option<Ticks>) -> SubmitResult {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.inner.global.submit(
            action,
            delay.get(),
            period.map(Ticks::get),
            Arc::clone(&cancelled),
        );
        Ok(Box::new(SimTask::new(cancelled)))
    }

    fn queue_region(
        &self,
        at: Coordinate,
        action: Action,
        delay: Ticks,
        period: Option<Ticks>,
    ) -> SubmitResult {
        if !self.inner.world_loaded(at.world) {
            return Err(Rejection::new(HostError::NotReady, action));
        }
        let cancelled = Arc::new(AtomicBool::new(false));
        schedule_region_hop(
            Arc::downgrade(&self.inner),
            at,
            Arc::new(Mutex::new(action)),
            delay.get(),
            period.map(Ticks::get),
            Arc::clone(&cancelled),
        );
        Ok(Box::new(SimTask::new(cancelled)))
    }

    fn queue_entity(
        &self,
        entity: EntityId,
        action: Action,
        retired: Option<RetiredCallback>,
        delay: Ticks,
        period: Option<Ticks>,
    ) -> SubmitResult {
        let state = {
            let mut entities = self.inner.entities();
            let Some(record) = entities.get_mut(&entity) else {
                return Err(Rejection::new(HostError::Retired, action));
            };
            let state = EntityTaskState::new(retired);
            // Watchers of already-completed submissions are dead weaks.
            record.watchers.retain(|w| w.strong_count() > 0);
            record.watchers.push(Arc::downgrade(&state));
            state
        };
        let cancelled = Arc::new(AtomicBool::new(false));
        schedule_entity_hop(
            Arc::downgrade(&self.inner),
            entity,
            Arc::new(Mutex::new(action)),
            state,
            delay.get(),
            period.map(Ticks::get),
            Arc::clone(&cancelled),
        );
        Ok(Box::new(SimTask::new(cancelled)))
    }

    fn queue_background(
        &self,
        action: Action,
        delay: Duration,
        period: Option<Duration>,
    ) -> SubmitResult {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.inner
            .pool
            .submit(action, delay, period, Arc::clone(&cancelled));
        Ok(Box::new(SimTask::new(cancelled)))
    }
}

impl PartitionedScheduler for SimPartitionedHost {
    fn run_global(&self, action: Action) -> SubmitResult {
        self.queue_global(action, Ticks::ZERO, None)
    }

    fn run_global_delayed(&self, action: Action, delay: Ticks) -> SubmitResult {
        self.queue_global(action, delay, None)
    }

    fn run_global_repeating(&self, action: Action, delay: Ticks, period: Ticks) -> SubmitResult {
        self.queue_global(action, delay, Some(period))
    }

    fn run_at(&self, at: Coordinate, action: Action) -> SubmitResult {
        self.queue_region(at, action, Ticks::ZERO, None)
    }

    fn run_at_delayed(&self, at: Coordinate, action: Action, delay: Ticks) -> SubmitResult {
        self.queue_region(at, action, delay, None)
    }

    fn run_at_repeating(
        &self,
        at: Coordinate,
        action: Action,
        delay: Ticks,
        period: Ticks,
    ) -> SubmitResult {
        self.queue_region(at, action, delay, Some(period))
    }

    fn run_for(
        &self,
        entity: EntityId,
        action: Action,
        retired: Option<RetiredCallback>,
    ) -> SubmitResult {
        self.queue_entity(entity, action, retired, Ticks::ZERO, None)
    }

    fn run_for_delayed(
        &self,
        entity: EntityId,
        action: Action,
        retired: Option<RetiredCallback>,
        delay: Ticks,
    ) -> SubmitResult {
        self.queue_entity(entity, action, retired, delay, None)
    }

    fn run_for_repeating(
        &self,
        entity: EntityId,
        action: Action,
        retired: Option<RetiredCallback>,
        delay: Ticks,
        period: Ticks,
    ) -> SubmitResult {
        self.queue_entity(entity, action, retired, delay, Some(period))
    }

    fn run_background(&self, action: Action) -> SubmitResult {
        self.queue_background(action, Duration::ZERO, None)
    }

    fn run_background_delayed(&self, action: Action, delay: Duration) -> SubmitResult {
        self.queue_background(action, delay, None)
    }

    fn run_background_repeating(
        &self,
        action: Action,
        delay: Duration,
        period: Duration,
    ) -> SubmitResult {
        self.queue_background(action, delay, Some(period))
    }
}

/// The classic surface of a partitioned host: administratively disabled.
struct DisabledClassic;

static DISABLED_CLASSIC: DisabledClassic = DisabledClassic;

impl AuthorityScheduler for DisabledClassic {
    fn run(&self, action: Action) -> SubmitResult {
        Err(Rejection::new(
            HostError::Unsupported("classic queue disabled on partitioned host"),
            action,
        ))
    }

    fn run_delayed(&self, action: Action, _delay: Ticks) -> SubmitResult {
        self.run(action)
    }

    fn run_repeating(&self, action: Action, _delay: Ticks, _period: Ticks) -> SubmitResult {
        self.run(action)
    }

    fn run_background(&self, action: Action) -> SubmitResult {
        self.run(action)
    }

    fn run_background_delayed(&self, action: Action, _delay: Ticks) -> SubmitResult {
        self.run(action)
    }

    fn run_background_repeating(
        &self,
        action: Action,
        _delay: Ticks,
        _period: Ticks,
    ) -> SubmitResult {
        self.run(action)
    }
}

impl Host for SimPartitionedHost {
    fn authority(&self) -> &dyn AuthorityScheduler {
        &DISABLED_CLASSIC
    }

    fn partitioned(&self) -> Option<&dyn PartitionedScheduler> {
        Some(self)
    }
}

//! Scheduler behavior over the simulated spatially-partitioned host.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tickbridge_core::{Affinity, Coordinate, EntityId, RuntimeVariant, Ticks, WorldId};
use tickbridge_host::detect;
use tickbridge_sched::Scheduler;
use tickbridge_sim::SimPartitionedHost;

const FAST_TICK: Duration = Duration::from_millis(2);

fn partitioned(regions: usize) -> (SimPartitionedHost, Scheduler) {
    let host = SimPartitionedHost::with_tick(regions, FAST_TICK);
    let scheduler = Scheduler::new(Arc::new(host.clone()));
    (host, scheduler)
}

fn wait_for(what: &str, predicate: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !predicate() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

const WORLD: WorldId = WorldId::new(1);

fn coordinate() -> Coordinate {
    Coordinate::new(WORLD, 128, 70, -512)
}

#[test]
fn partitioned_host_is_detected() {
    let (host, scheduler) = partitioned(2);
    assert_eq!(detect(&host), RuntimeVariant::SpatiallyPartitioned);
    assert!(scheduler.is_partitioned());
    host.shutdown();
}

#[test]
fn spatial_work_runs_on_owning_region_thread() {
    let (host, _scheduler) = partitioned(3);
    host.load_world(WORLD);
    let at = coordinate();
    let owner = host.region_thread_id(at);

    let observed = Arc::new(Mutex::new(Vec::new()));
    let in_progress = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicU32::new(0));

    // Submit from two different non-authority threads.
    let submitters: Vec<_> = (0..2)
        .map(|_| {
            let scheduler = Scheduler::new(Arc::new(host.clone()));
            let observed = Arc::clone(&observed);
            let in_progress = Arc::clone(&in_progress);
            let overlaps = Arc::clone(&overlaps);
            thread::spawn(move || {
                scheduler.schedule_now(Affinity::At(at), move || {
                    if in_progress.swap(true, Ordering::SeqCst) {
                        overlaps.fetch_add(1, Ordering::SeqCst);
                    }
                    thread::sleep(Duration::from_millis(5));
                    observed.lock().unwrap().push(thread::current().id());
                    in_progress.store(false, Ordering::SeqCst);
                });
            })
        })
        .collect();
    for submitter in submitters {
        submitter.join().expect("submitter thread panicked");
    }

    wait_for("both spatial items", || observed.lock().unwrap().len() == 2);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0, "items ran concurrently");
    for id in observed.lock().unwrap().iter() {
        assert_eq!(*id, owner, "item ran off the owning region thread");
    }
    host.shutdown();
}

#[test]
fn unloaded_world_submission_is_dropped_silently() {
    let (host, scheduler) = partitioned(2);
    // World never loaded.
    let ran = Arc::new(AtomicBool::new(false));
    let ran_in = Arc::clone(&ran);
    let handle = scheduler.schedule_now(Affinity::At(coordinate()), move || {
        ran_in.store(true, Ordering::SeqCst);
    });
    assert!(handle.is_cancelled());
    thread::sleep(Duration::from_millis(50));
    assert!(!ran.load(Ordering::SeqCst));
    host.shutdown();
}

#[test]
fn world_unload_between_submission_and_dispatch_drops_work() {
    let (host, scheduler) = partitioned(2);
    host.load_world(WORLD);
    let ran = Arc::new(AtomicBool::new(false));
    let ran_in = Arc::clone(&ran);
    scheduler.schedule_delayed(
        Affinity::At(coordinate()),
        move || ran_in.store(true, Ordering::SeqCst),
        Ticks(25),
    );
    host.unload_world(WORLD);
    thread::sleep(Duration::from_millis(150));
    assert!(!ran.load(Ordering::SeqCst));
    host.shutdown();
}

#[test]
fn region_migration_moves_periodic_dispatch() {
    let (host, scheduler) = partitioned(2);
    host.load_world(WORLD);
    let at = coordinate();

    let threads = Arc::new(Mutex::new(Vec::new()));
    let threads_in = Arc::clone(&threads);
    let handle = scheduler
        .schedule_repeating(
            Affinity::At(at),
            move || threads_in.lock().unwrap().push(thread::current().id()),
            Ticks::ZERO,
            Ticks(2),
        )
        .expect("period is non-zero");

    wait_for("first invocations", || threads.lock().unwrap().len() >= 3);
    let before = host.region_thread_id(at);

    // Pin the region to the other worker and wait for the hop.
    let target = usize::from(host.region_worker_thread_id(0) == before);
    host.migrate_region(at, target);
    let after = host.region_worker_thread_id(target);
    assert_ne!(before, after);

    wait_for("post-migration invocations", || {
        threads.lock().unwrap().last() == Some(&after)
    });
    handle.cancel();
    host.shutdown();
}

#[test]
fn entity_gone_at_submission_returns_cancelled_handle() {
    let (host, scheduler) = partitioned(2);
    host.load_world(WORLD);
    let ran = Arc::new(AtomicBool::new(false));
    let ran_in = Arc::clone(&ran);
    let handle = scheduler.schedule_now(Affinity::For(EntityId::new(404)), move || {
        ran_in.store(true, Ordering::SeqCst);
    });
    assert!(handle.is_cancelled());
    thread::sleep(Duration::from_millis(50));
    assert!(!ran.load(Ordering::SeqCst));
    host.shutdown();
}

#[test]
fn entity_removed_before_dispatch_marks_handle_cancelled() {
    let (host, scheduler) = partitioned(2);
    host.load_world(WORLD);
    let entity = EntityId::new(7);
    host.spawn_entity(entity, 0);

    let ran = Arc::new(AtomicBool::new(false));
    let ran_in = Arc::clone(&ran);
    let handle = scheduler.schedule_delayed(
        Affinity::For(entity),
        move || ran_in.store(true, Ordering::SeqCst),
        Ticks(25),
    );
    assert!(!handle.is_cancelled());

    host.remove_entity(entity);
    wait_for("retired callback", || handle.is_cancelled());
    thread::sleep(Duration::from_millis(150));
    assert!(!ran.load(Ordering::SeqCst));
    host.shutdown();
}

#[test]
fn entity_work_follows_migration() {
    let (host, scheduler) = partitioned(2);
    host.load_world(WORLD);
    let entity = EntityId::new(9);
    host.spawn_entity(entity, 0);

    let threads = Arc::new(Mutex::new(Vec::new()));
    let threads_in = Arc::clone(&threads);
    let handle = scheduler
        .schedule_repeating(
            Affinity::For(entity),
            move || threads_in.lock().unwrap().push(thread::current().id()),
            Ticks::ZERO,
            Ticks(2),
        )
        .expect("period is non-zero");

    let region0 = host.region_worker_thread_id(0);
    let region1 = host.region_worker_thread_id(1);
    wait_for("invocations on the first owner", || {
        threads.lock().unwrap().last() == Some(&region0)
    });

    assert!(host.migrate_entity(entity, 1));
    wait_for("invocations on the new owner", || {
        threads.lock().unwrap().last() == Some(&region1)
    });
    handle.cancel();
    host.shutdown();
}

#[test]
fn global_queue_preserves_submission_order() {
    let (host, scheduler) = partitioned(2);
    let order = Arc::new(Mutex::new(Vec::new()));
    let global = host.global_thread_id();
    let threads = Arc::new(Mutex::new(HashSet::new()));

    for i in 0..10u32 {
        let order = Arc::clone(&order);
        let threads = Arc::clone(&threads);
        scheduler.schedule_now(Affinity::None, move || {
            order.lock().unwrap().push(i);
            threads.lock().unwrap().insert(thread::current().id());
        });
    }

    wait_for("global queue drain", || order.lock().unwrap().len() == 10);
    assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
    assert_eq!(*threads.lock().unwrap(), HashSet::from([global]));
    host.shutdown();
}

#[test]
fn background_delay_converts_ticks_to_real_time() {
    let (host, scheduler) = partitioned(2);
    let ran = Arc::new(AtomicBool::new(false));
    let ran_in = Arc::clone(&ran);
    // Two ticks at the canonical 50 ms rate: 100 ms of real time,
    // regardless of the host's simulated tick length.
    scheduler.schedule_background_delayed(
        move || ran_in.store(true, Ordering::SeqCst),
        Ticks(2),
    );
    thread::sleep(Duration::from_millis(30));
    assert!(
        !ran.load(Ordering::SeqCst),
        "background delay was not converted to real time"
    );
    wait_for("delayed background action", || ran.load(Ordering::SeqCst));
    host.shutdown();
}

#[test]
fn cancelling_repeating_global_work_stops_invocations() {
    let (host, scheduler) = partitioned(2);
    let runs = Arc::new(AtomicU32::new(0));
    let runs_in = Arc::clone(&runs);
    let handle = scheduler
        .schedule_repeating(
            Affinity::None,
            move || {
                runs_in.fetch_add(1, Ordering::SeqCst);
            },
            Ticks::ZERO,
            Ticks(2),
        )
        .expect("period is non-zero");

    wait_for("a few invocations", || runs.load(Ordering::SeqCst) >= 3);
    handle.cancel();
    let observed = runs.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(100));
    assert!(runs.load(Ordering::SeqCst) <= observed + 1);
    host.shutdown();
}

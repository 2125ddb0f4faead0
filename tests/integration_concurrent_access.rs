//! Concurrent access integration tests
//!
//! These tests verify that carbon-di behaves correctly under concurrent access:
//! shared scopes construct once, failures are never cached, and slow
//! constructions do not block unrelated definitions.

use carbon_di::{Class, Key, Registry, Resolver};
use crossbeam_utils::thread;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::time::Duration;

const THREADS: usize = 16;

#[derive(Debug)]
struct Counted {
    serial: usize,
}

fn slow_counted_factory(built: Arc<AtomicUsize>) -> impl Fn(&carbon_di::ObjectContext<'_>) -> Counted + Send + Sync {
    move |_| {
        std::thread::sleep(Duration::from_millis(20));
        Counted {
            serial: built.fetch_add(1, Ordering::SeqCst),
        }
    }
}

#[test]
fn test_singleton_constructed_exactly_once() {
    let built = Arc::new(AtomicUsize::new(0));
    let registry = Registry::new();
    registry
        .define_named("counted", |b| b.factory(slow_counted_factory(built.clone())).singleton())
        .unwrap();

    let barrier = Barrier::new(THREADS);
    let results: Vec<Arc<Counted>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|_| {
                    barrier.wait();
                    registry.get::<Counted>(&Key::named("counted")).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    assert_eq!(built.load(Ordering::SeqCst), 1);
    for instance in &results {
        assert!(Arc::ptr_eq(instance, &results[0]));
        assert_eq!(instance.serial, 0);
    }
}

#[test]
fn test_weak_singleton_constructed_once_while_held() {
    let built = Arc::new(AtomicUsize::new(0));
    let registry = Registry::new();
    registry
        .define_named("counted", |b| b.factory(slow_counted_factory(built.clone())).singleton_weak())
        .unwrap();

    let barrier = Barrier::new(THREADS);
    let results: Vec<Arc<Counted>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|_| {
                    barrier.wait();
                    registry.get::<Counted>(&Key::named("counted")).unwrap()
                })
            })
            .collect();
        // Every thread returns its handle, so the instance stays alive until all joined.
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    let first = &results[0];
    let distinct = results.iter().filter(|r| !Arc::ptr_eq(r, first)).count();
    // Threads may only diverge if every holder dropped in between, which they never do here.
    assert_eq!(distinct, 0);
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_prototype_constructs_per_request() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let registry = Registry::new();
    registry
        .define_named("counted", |b| {
            b.factory(move |_| Counted {
                serial: counter.fetch_add(1, Ordering::SeqCst),
            })
        })
        .unwrap();

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|_| {
                for _ in 0..10 {
                    registry.get::<Counted>(&Key::named("counted")).unwrap();
                }
            });
        }
    })
    .unwrap();

    assert_eq!(built.load(Ordering::SeqCst), THREADS * 10);
}

#[test]
fn test_concurrent_failures_are_not_cached() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    let registry = Registry::new();
    registry
        .define_named("fragile", |b| {
            b.try_factory(move |_| {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                if attempt < 3 {
                    Err(std::io::Error::new(std::io::ErrorKind::Other, "warming up"))
                } else {
                    Ok(attempt)
                }
            })
            .singleton()
        })
        .unwrap();

    let barrier = Barrier::new(THREADS);
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|_| {
                barrier.wait();
                let _ = registry.get::<usize>(&Key::named("fragile"));
            });
        }
    })
    .unwrap();

    // Whatever succeeded first is what every later caller sees.
    let value = registry.get::<usize>(&Key::named("fragile")).unwrap();
    assert_eq!(*value, 3);
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
}

#[test]
fn test_slow_construction_does_not_block_other_definitions() {
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let started_tx = parking_lot::Mutex::new(started_tx);
    let release_rx = parking_lot::Mutex::new(release_rx);

    #[derive(Default)]
    struct Quick;

    let registry = Registry::new();
    registry
        .define_named("slow", |b| {
            b.factory(move |_| {
                let _ = started_tx.lock().send(());
                let _ = release_rx.lock().recv_timeout(Duration::from_secs(5));
                String::from("slow")
            })
            .singleton()
        })
        .unwrap();
    registry.define(|b| b.class(Class::of::<Quick>()).singleton()).unwrap();

    thread::scope(|s| {
        let slow = s.spawn(|_| registry.get::<String>(&Key::named("slow")).unwrap());

        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        // The slow singleton is mid-construction; an unrelated one must still resolve.
        registry.get::<Quick>(&Key::class::<Quick>()).unwrap();
        release_tx.send(()).unwrap();

        assert_eq!(*slow.join().unwrap(), "slow");
    })
    .unwrap();
}

#[test]
fn test_registration_during_resolution() {
    #[derive(Default)]
    struct Stable;

    let registry = Registry::new();
    registry.define(|b| b.class(Class::of::<Stable>()).singleton()).unwrap();
    let stable = registry.get::<Stable>(&Key::class::<Stable>()).unwrap();

    thread::scope(|s| {
        s.spawn(|_| {
            for i in 0..200 {
                registry.define_named(format!("extra-{i}"), |b| b.factory(move |_| i)).unwrap();
            }
        });
        for _ in 0..4 {
            s.spawn(|_| {
                for _ in 0..200 {
                    let again = registry.get::<Stable>(&Key::class::<Stable>()).unwrap();
                    assert!(Arc::ptr_eq(&again, &stable));
                }
            });
        }
    })
    .unwrap();

    assert_eq!(registry.len(), 201);
    assert_eq!(*registry.get::<i32>(&Key::named("extra-199")).unwrap(), 199);
}

trait Port: Send + Sync {}
trait AuditSink: Send + Sync {}
trait MetricsSink: Send + Sync {}

fn define_port(registry: &Registry, generation: usize) {
    registry
        .define(|b| {
            b.protocol(Key::protocol::<dyn Port>())
                .alias_protocol(Key::protocol::<dyn AuditSink>())
                .alias_protocol(Key::protocol::<dyn MetricsSink>())
                .factory(move |_| generation)
                .singleton()
        })
        .unwrap();
}

#[test]
fn test_re_registration_is_atomic_across_keys() {
    const ROUNDS: usize = 500;
    let keys = [
        Key::protocol::<dyn Port>(),
        Key::protocol::<dyn AuditSink>(),
        Key::protocol::<dyn MetricsSink>(),
    ];

    let registry = Registry::new();
    define_port(&registry, 0);

    thread::scope(|s| {
        s.spawn(|_| {
            for generation in 1..=ROUNDS {
                define_port(&registry, generation);
            }
        });
        for _ in 0..4 {
            s.spawn(|_| {
                let mut last_id = 0;
                for _ in 0..ROUNDS {
                    // Every key of one snapshot names the same definition.
                    let snapshot = registry.lookup_all(&keys).unwrap();
                    assert!(Arc::ptr_eq(&snapshot[0], &snapshot[1]));
                    assert!(Arc::ptr_eq(&snapshot[0], &snapshot[2]));

                    // Readers only ever move forward to newer definitions.
                    assert!(snapshot[0].id() >= last_id);
                    last_id = snapshot[0].id();

                    let primary = registry.lookup(&keys[0]).unwrap();
                    assert!(primary.id() >= last_id);
                    assert!(registry.get::<usize>(&keys[1]).is_ok());
                }
            });
        }
    })
    .unwrap();

    let finals = registry.lookup_all(&keys).unwrap();
    assert!(Arc::ptr_eq(&finals[0], &finals[2]));
    assert_eq!(*registry.get::<usize>(&keys[0]).unwrap(), ROUNDS);
    assert_eq!(registry.definitions().len(), 1);
}

use carbon_di::{Class, Key, Registry, Resolver, ScopeKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Session: Send + Sync {
    fn id(&self) -> usize;
}

struct UserSession {
    id: usize,
}

impl Session for UserSession {
    fn id(&self) -> usize {
        self.id
    }
}

fn counting_registry(scope: ScopeKind) -> (Registry, Arc<AtomicUsize>) {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let registry = Registry::new();
    registry
        .define(|b| {
            b.protocol(Key::protocol::<dyn Session>())
                .factory(move |_| {
                    let id = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Arc::new(UserSession { id }) as Arc<dyn Session>
                })
                .scope(scope)
        })
        .unwrap();
    (registry, built)
}

#[test]
fn test_prototype_never_caches() {
    let (registry, built) = counting_registry(ScopeKind::Prototype);
    let key = Key::protocol::<dyn Session>();

    let a = registry.get_protocol::<dyn Session>(&key).unwrap();
    let b = registry.get_protocol::<dyn Session>(&key).unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(built.load(Ordering::SeqCst), 2);
    assert!(registry.lookup(&key).unwrap().scope_slot().cached().is_none());
}

#[test]
fn test_singleton_survives_every_holder() {
    let (registry, built) = counting_registry(ScopeKind::Singleton);
    let key = Key::protocol::<dyn Session>();

    let first_id = registry.get_protocol::<dyn Session>(&key).unwrap().id();
    let second_id = registry.get_protocol::<dyn Session>(&key).unwrap().id();
    assert_eq!(first_id, second_id);
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_weak_singleton_shared_while_held() {
    let (registry, built) = counting_registry(ScopeKind::WeakSingleton);
    let key = Key::protocol::<dyn Session>();

    let held = registry.get_protocol::<dyn Session>(&key).unwrap();
    let again = registry.get_protocol::<dyn Session>(&key).unwrap();
    assert!(carbon_di::Shared::ptr_eq(&held, &again));
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_weak_singleton_rebuilt_after_release() {
    let (registry, built) = counting_registry(ScopeKind::WeakSingleton);
    let key = Key::protocol::<dyn Session>();

    let first = registry.get_protocol::<dyn Session>(&key).unwrap();
    let first_id = first.id();
    drop(first);
    assert!(registry.lookup(&key).unwrap().scope_slot().cached().is_none());

    let second = registry.get_protocol::<dyn Session>(&key).unwrap();
    assert_ne!(first_id, second.id());
    assert_eq!(built.load(Ordering::SeqCst), 2);
}

#[test]
fn test_weak_singleton_kept_alive_by_plain_get() {
    #[derive(Default)]
    struct Buffer;

    let registry = Registry::new();
    registry.define(|b| b.class(Class::of::<Buffer>()).singleton_weak()).unwrap();
    let key = Key::class::<Buffer>();

    let held = registry.get::<Buffer>(&key).unwrap();
    let again = registry.get::<Buffer>(&key).unwrap();
    assert!(Arc::ptr_eq(&held, &again));

    drop(held);
    // `again` still holds the instance.
    let third = registry.get::<Buffer>(&key).unwrap();
    assert!(Arc::ptr_eq(&again, &third));

    drop(again);
    drop(third);
    assert!(registry.lookup(&key).unwrap().scope_slot().cached().is_none());
}

#[test]
fn test_shadowed_definitions_keep_their_own_cache() {
    #[derive(Default)]
    struct Old;
    #[derive(Default)]
    struct New;

    let registry = Registry::new();
    registry.define_named("service", |b| b.class(Class::of::<Old>()).singleton()).unwrap();
    let old = registry.get::<Old>(&Key::named("service")).unwrap();

    registry.define_named("service", |b| b.class(Class::of::<New>()).singleton()).unwrap();
    assert!(registry.get::<Old>(&Key::named("service")).is_err());
    assert!(registry.get::<New>(&Key::named("service")).is_ok());
    assert_eq!(Arc::strong_count(&old), 1);
}

#[test]
fn test_descriptor_reports_cache_state() {
    let (registry, _) = counting_registry(ScopeKind::Singleton);
    let key = Key::protocol::<dyn Session>();

    let before = registry.descriptors();
    assert_eq!(before.len(), 1);
    assert!(before[0].factory);
    assert!(!before[0].instantiated);

    registry.resolve(&key).unwrap();
    assert!(registry.descriptors()[0].instantiated);
}

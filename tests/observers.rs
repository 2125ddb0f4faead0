use carbon_di::{
    Class, DefinitionObserver, DiError, Key, LoggingObserver, ObjectDefinition, Registry, RegistryOptions, Resolver,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Recording {
    events: Mutex<Vec<String>>,
}

impl DefinitionObserver for Recording {
    fn registered(&self, definition: &ObjectDefinition) {
        self.events.lock().push(format!("registered {}", definition.primary_key()));
    }

    fn shadowed(&self, key: &Key, _previous: &ObjectDefinition) {
        self.events.lock().push(format!("shadowed {}", key));
    }

    fn resolving(&self, key: &Key) {
        self.events.lock().push(format!("resolving {}", key));
    }

    fn resolved(&self, key: &Key, _duration: Duration) {
        self.events.lock().push(format!("resolved {}", key));
    }

    fn resolution_failed(&self, key: &Key, _error: &DiError) {
        self.events.lock().push(format!("failed {}", key));
    }
}

#[derive(Default)]
struct Engine;

#[test]
fn test_observer_sees_lifecycle() {
    let recording = Arc::new(Recording::default());
    let registry = Registry::with_options(RegistryOptions::new().observer(recording.clone()));

    registry.define_named("engine", |b| b.class(Class::of::<Engine>())).unwrap();
    registry.define_named("engine", |b| b.class(Class::of::<Engine>()).singleton()).unwrap();
    registry.get::<Engine>(&Key::named("engine")).unwrap();
    let _ = registry.resolve(&Key::named("missing"));

    let events = recording.events.lock().clone();
    assert_eq!(
        events,
        vec![
            "registered named \"engine\"",
            "shadowed named \"engine\"",
            "registered named \"engine\"",
            "resolving named \"engine\"",
            "resolved named \"engine\"",
            "resolving named \"missing\"",
            "failed named \"missing\"",
        ]
    );
}

#[test]
fn test_nested_resolutions_are_reported() {
    let recording = Arc::new(Recording::default());
    let registry = Registry::with_options(RegistryOptions::new().observer(recording.clone()));

    registry.define_named("inner", |b| b.factory(|_| 1u8)).unwrap();
    registry
        .define_named("outer", |b| b.try_factory(|ctx| ctx.get::<u8>(&Key::named("inner")).map(|v| *v as u16)))
        .unwrap();
    recording.events.lock().clear();

    registry.get::<u16>(&Key::named("outer")).unwrap();
    let events = recording.events.lock().clone();
    assert_eq!(
        events,
        vec![
            "resolving named \"outer\"",
            "resolving named \"inner\"",
            "resolved named \"inner\"",
            "resolved named \"outer\"",
        ]
    );
}

#[test]
fn test_logging_observer_with_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();

    let registry = Registry::with_options(
        RegistryOptions::new().observer(Arc::new(LoggingObserver::with_prefix("test"))).max_depth(16),
    );
    assert_eq!(format!("{:?}", registry), "Registry { keys: 0, max_depth: 16 }");

    registry.define(|b| b.class(Class::of::<Engine>()).singleton()).unwrap();
    registry.get::<Engine>(&Key::class::<Engine>()).unwrap();
    assert!(registry.resolve(&Key::named("nope")).is_err());
}

#![no_main]

use carbon_di::{Key, Registry, Resolver, ScopeKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Each byte defines node i depending on node (byte % count); cycles are expected.
    let registry = Registry::new();
    let count = data.len().min(16);
    for (i, byte) in data.iter().take(count).enumerate() {
        let target = usize::from(*byte) % count;
        let scope = match byte >> 6 {
            0 => ScopeKind::Prototype,
            1 => ScopeKind::WeakSingleton,
            _ => ScopeKind::Singleton,
        };
        let leaf = byte & 0x20 != 0;
        registry
            .define_named(format!("node-{i}"), move |b| {
                b.try_factory(move |ctx| {
                    if leaf {
                        Ok(i)
                    } else {
                        ctx.get::<usize>(&Key::named(format!("node-{target}"))).map(|v| *v)
                    }
                })
                .scope(scope)
            })
            .expect("valid definition");
    }

    for i in 0..count {
        match registry.get::<usize>(&Key::named(format!("node-{i}"))) {
            Ok(value) => assert!(*value < count),
            Err(err) => assert!(err.is_circular()),
        }
    }
});

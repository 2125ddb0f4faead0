#![no_main]

use carbon_di::{define, define_named, Autowire, Class, DiError, DiResult, Key, ObjectContext};
use libfuzzer_sys::fuzz_target;

trait Primary: Send + Sync {}

#[derive(Default)]
struct Target;

impl Autowire for Target {
    fn autowire(&mut self, _property: &str, _ctx: &ObjectContext<'_>) -> DiResult<()> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let mode = data[0];
    let ops = &data[1..];
    let name = (mode & 0x01 != 0).then(|| format!("n{}", mode >> 4));

    let build = |b: carbon_di::KeyBuilder| {
        let mut stage = b.protocol(Key::protocol::<dyn Primary>());
        for op in ops.iter().take(32) {
            stage = match op % 3 {
                0 => stage.alias_protocol(Key::named(format!("a{}", op >> 2))),
                1 => stage.aliases((0..(op >> 5)).map(|i| Key::named(format!("a{i}")))),
                _ => stage.alias_protocol(Key::protocol::<dyn Primary>()),
            };
        }
        let mut wired = stage.class(if mode & 0x02 != 0 { Class::autowired::<Target>() } else { Class::of::<Target>() });
        for op in ops.iter().take(8) {
            wired = wired.property_name(if op % 5 == 0 { String::new() } else { format!("p{op}") });
        }
        wired.singleton()
    };

    let mut builder = match &name {
        Some(name) => define_named(name.clone(), build),
        None => define(build),
    };

    match builder.finalize() {
        Ok(definition) => {
            assert!(!definition.alias_keys().contains(definition.primary_key()));
            let mut seen = Vec::new();
            for alias in definition.alias_keys() {
                assert!(!seen.contains(alias));
                seen.push(alias.clone());
            }
        }
        Err(DiError::InvalidDefinition(issues)) => assert!(!issues.is_empty()),
        Err(other) => panic!("unexpected error: {other}"),
    }

    assert!(matches!(builder.finalize(), Err(DiError::BuilderReused)));
});

use carbon_di::{define, define_named, Autowire, Class, DiResult, Key, ObjectContext};
use proptest::prelude::*;

trait Root: Send + Sync {}

#[derive(Default)]
struct Wired;

impl Autowire for Wired {
    fn autowire(&mut self, _property: &str, _ctx: &ObjectContext<'_>) -> DiResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Step {
    Append(u8),
    Replace(Vec<u8>),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u8..12).prop_map(Step::Append),
        prop::collection::vec(0u8..12, 0..5).prop_map(Step::Replace),
    ]
}

/// Appends skip duplicates; a bulk replace drops everything declared before it.
fn expected<T: Clone + PartialEq>(steps: &[Step], make: impl Fn(u8) -> T) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    let push = |out: &mut Vec<T>, value: T| {
        if !out.contains(&value) {
            out.push(value);
        }
    };
    for step in steps {
        match step {
            Step::Append(n) => push(&mut out, make(*n)),
            Step::Replace(ns) => {
                out.clear();
                for n in ns {
                    push(&mut out, make(*n));
                }
            }
        }
    }
    out
}

fn alias(n: u8) -> Key {
    Key::named(format!("alias-{n}"))
}

fn property(n: u8) -> String {
    format!("prop{n}")
}

proptest! {
    #[test]
    fn prop_aliases_follow_last_write(steps in prop::collection::vec(step(), 0..10)) {
        let mut builder = define(|b| {
            let mut stage = b.protocol(Key::protocol::<dyn Root>());
            for step in &steps {
                stage = match step {
                    Step::Append(n) => stage.alias_protocol(alias(*n)),
                    Step::Replace(ns) => stage.aliases(ns.iter().map(|n| alias(*n))),
                };
            }
            stage.class(Class::of::<Wired>())
        });
        let definition = builder.finalize().unwrap();

        prop_assert_eq!(definition.primary_key(), &Key::protocol::<dyn Root>());
        prop_assert_eq!(definition.alias_keys().to_vec(), expected(&steps, alias));
    }

    #[test]
    fn prop_properties_follow_last_write(steps in prop::collection::vec(step(), 0..10)) {
        let mut builder = define(|b| {
            let mut stage = b.class(Class::autowired::<Wired>());
            for step in &steps {
                stage = match step {
                    Step::Append(n) => stage.property_name(property(*n)),
                    Step::Replace(ns) => stage.properties_name(ns.iter().map(|n| property(*n))),
                };
            }
            stage
        });
        let definition = builder.finalize().unwrap();

        prop_assert_eq!(definition.autowired_properties().to_vec(), expected(&steps, property));
    }

    #[test]
    fn prop_named_primary_never_appears_as_alias(
        name in "[a-z]{1,6}",
        steps in prop::collection::vec(step(), 0..6),
    ) {
        let mut builder = define_named(name.clone(), |b| {
            let mut stage = b.protocol(Key::protocol::<dyn Root>()).alias_protocol(Key::named(name.clone()));
            for step in &steps {
                if let Step::Append(n) = step {
                    stage = stage.alias_protocol(alias(*n));
                }
            }
            stage.class(Class::of::<Wired>()).singleton()
        });
        let definition = builder.finalize().unwrap();

        prop_assert_eq!(definition.primary_key(), &Key::named(name.as_str()));
        prop_assert!(!definition.alias_keys().contains(definition.primary_key()));
        prop_assert_eq!(&definition.alias_keys()[0], &Key::protocol::<dyn Root>());
    }
}

//! Merge behaviour checked across a family of generated layer stacks.

use buildcfg_resolver::{resolve, ConfigLayer, ConfigResolver, ConfigValue, ResolveError};
use std::collections::{BTreeMap, BTreeSet};

const KEYS: &[&str] = &["a", "b", "c", "d", "e"];

// Layer `i` of a stack of `n` defines key `k` when (i + k) % (n - i + 1) == 0.
// Values encode the layer index so the winner is easy to predict.
fn stack(n: usize) -> Vec<ConfigLayer> {
    (0..n)
        .map(|i| {
            let mut layer = ConfigLayer::new(format!("layer{}", i));
            for (k, key) in KEYS.iter().enumerate() {
                if (i + k) % (n - i + 1) == 0 {
                    let value: ConfigValue = match k % 3 {
                        0 => ConfigValue::Integer(i as i64),
                        1 => ConfigValue::String(format!("v{}", i)),
                        _ => ConfigValue::Boolean(i % 2 == 0),
                    };
                    layer.set(*key, value);
                }
            }
            layer
        })
        .collect()
}

fn last_definition(layers: &[ConfigLayer], key: &str) -> Option<(usize, ConfigValue)> {
    layers
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, l)| l.get(key).map(|v| (i, v.clone())))
}

#[test]
fn test_every_key_resolves_to_last_definition() {
    for n in 1..=8 {
        let layers = stack(n);
        let resolved = resolve(&layers, &BTreeSet::new()).unwrap();

        for key in KEYS {
            match last_definition(&layers, key) {
                Some((idx, value)) => {
                    assert_eq!(resolved.get(key), Some(&value), "n={} key={}", n, key);
                    let expected_origin = format!("layer{}", idx);
                    assert_eq!(resolved.origin_of(key), Some(expected_origin.as_str()));
                }
                None => assert!(!resolved.contains_key(key), "n={} key={}", n, key),
            }
        }
    }
}

#[test]
fn test_no_extra_keys() {
    for n in 1..=8 {
        let layers = stack(n);
        let resolved = resolve(&layers, &BTreeSet::new()).unwrap();

        let defined: BTreeSet<&String> = layers.iter().flat_map(|l| l.entries.keys()).collect();
        let got: BTreeSet<&String> = resolved.iter().map(|(k, _)| k).collect();
        assert_eq!(defined, got, "n={}", n);
    }
}

#[test]
fn test_repeated_resolution_is_identical() {
    let resolver = ConfigResolver::new().require("a");
    for n in 1..=8 {
        let layers = stack(n);
        let first = resolver.resolve(&layers);
        let second = resolver.resolve(&layers);
        assert_eq!(first, second, "n={}", n);
    }
}

#[test]
fn test_reversing_order_flips_winner() {
    let layers = vec![
        ConfigLayer::new("low").with("signing_config", "debug"),
        ConfigLayer::new("high").with("signing_config", "release"),
    ];
    let forward = resolve(&layers, &BTreeSet::new()).unwrap();
    assert_eq!(forward.get_str("signing_config"), Some("release"));

    let reversed: Vec<ConfigLayer> = layers.into_iter().rev().collect();
    let backward = resolve(&reversed, &BTreeSet::new()).unwrap();
    assert_eq!(backward.get_str("signing_config"), Some("debug"));
}

#[test]
fn test_documented_examples() {
    assert_eq!(
        resolve(&[], &BTreeSet::new()).unwrap_err(),
        ResolveError::EmptyLayerSet
    );

    let required: BTreeSet<String> = ["B".to_string()].into_iter().collect();
    assert_eq!(
        resolve(&[ConfigLayer::new("l").with("A", "1")], &required).unwrap_err(),
        ResolveError::MissingRequiredKey("B".to_string())
    );

    let resolved = resolve(
        &[
            ConfigLayer::new("l1").with("A", "1"),
            ConfigLayer::new("l2").with("A", "2").with("B", true),
        ],
        &BTreeSet::new(),
    )
    .unwrap();
    let mut expected = BTreeMap::new();
    expected.insert("A".to_string(), ConfigValue::from("2"));
    expected.insert("B".to_string(), ConfigValue::from(true));
    assert_eq!(resolved.values(), &expected);
}

#[test]
fn test_resolver_is_shareable_across_threads() {
    let resolver = std::sync::Arc::new(ConfigResolver::new().require("a").require("missing"));
    let lenient = std::sync::Arc::new(ConfigResolver::new().require("a"));

    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let resolver = resolver.clone();
            let lenient = lenient.clone();
            let handle = std::thread::spawn(move || {
                (resolver.resolve(&stack(n)), lenient.resolve(&stack(n)))
            });
            (n, handle)
        })
        .collect();

    for (n, handle) in handles {
        let (strict, relaxed) = handle.join().unwrap();

        assert_eq!(
            strict,
            Err(ResolveError::MissingRequiredKey("missing".to_string()))
        );

        // Layer 0 always defines "a", so every stack resolves.
        let expected = ConfigResolver::new().require("a").resolve(&stack(n));
        assert!(expected.is_ok(), "stack({}) should resolve", n);
        assert_eq!(relaxed, expected, "stack({})", n);
    }
}

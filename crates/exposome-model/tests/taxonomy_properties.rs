//! Property tests for taxonomy normalization and key addressing

use exposome_model::{SubdomainKey, Taxonomy};
use proptest::prelude::*;

fn entries() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::vec(
        ("[a-d]{1,3}", prop::collection::vec("[A-Ca-c]{1,4}", 0..5)),
        0..8,
    )
}

fn build(entries: &[(String, Vec<String>)]) -> Taxonomy {
    let mut taxonomy = Taxonomy::new();
    for (domain, tails) in entries {
        let (node, _) = taxonomy.ensure_domain(domain);
        for tail in tails {
            node.push_subdomain(tail.clone());
        }
    }
    taxonomy
}

proptest! {
    #[test]
    fn normalize_is_idempotent(entries in entries()) {
        let mut once = build(&entries);
        once.normalize();
        let mut twice = once.clone();
        twice.normalize();
        prop_assert_eq!(&once, &twice);

        let names: Vec<&str> = once.domains().iter().map(|d| d.name()).collect();
        prop_assert!(names.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn registry_admits_every_pushed_tail(entries in entries()) {
        let taxonomy = build(&entries);
        let registry = taxonomy.registry();
        for (domain, tails) in &entries {
            prop_assert!(registry.allows_domain(domain));
            for tail in tails {
                let key = SubdomainKey::full(domain, tail);
                prop_assert!(registry.allows_subdomain(key.as_str()));
                prop_assert!(key.belongs_to(domain));
                prop_assert_eq!(key.split(), Some((domain.as_str(), tail.as_str())));
            }
        }
    }
}

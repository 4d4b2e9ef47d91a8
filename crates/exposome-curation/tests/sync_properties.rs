//! Property tests for taxonomy merging

use std::collections::BTreeSet;

use exposome_curation::{merge_usage, UsageScan};
use exposome_model::{SubdomainKey, Taxonomy};
use proptest::prelude::*;

fn usage_strategy() -> impl Strategy<Value = UsageScan> {
    let domain = "[a-d]{1,3}";
    let key = ("[a-d]{1,3}", "[A-D][a-dA-D]{0,2}(\\.[a-d]{1,2})?")
        .prop_map(|(d, t)| SubdomainKey::full(&d, &t));
    (
        prop::collection::btree_set(domain, 0..5),
        prop::collection::btree_set(key, 0..12),
    )
        .prop_map(|(domains, dotted)| UsageScan {
            domains,
            dotted,
            skipped: Vec::new(),
        })
}

proptest! {
    #[test]
    fn merge_is_idempotent(usage in usage_strategy(), full_keys in any::<bool>()) {
        let mut tax = Taxonomy::new();
        merge_usage(&mut tax, &usage, full_keys);
        let snapshot = tax.clone();

        let second = merge_usage(&mut tax, &usage, full_keys);
        prop_assert!(second.added_domains.is_empty());
        prop_assert!(second.added_subdomains.is_empty());
        prop_assert_eq!(tax, snapshot);
    }

    #[test]
    fn merged_taxonomy_registers_every_key(usage in usage_strategy()) {
        let mut tax = Taxonomy::new();
        merge_usage(&mut tax, &usage, false);
        let registry = tax.registry();

        for domain in &usage.domains {
            prop_assert!(registry.allows_domain(domain));
        }
        for key in &usage.dotted {
            prop_assert!(registry.allows_subdomain(key.as_str()));
        }
    }

    #[test]
    fn domains_sorted_and_unique(usage in usage_strategy()) {
        let mut tax = Taxonomy::new();
        merge_usage(&mut tax, &usage, false);
        let names: Vec<&str> = tax.domains().iter().map(|d| d.name()).collect();
        let unique: BTreeSet<&str> = names.iter().copied().collect();
        prop_assert_eq!(names.len(), unique.len());
        prop_assert!(names.windows(2).all(|w| w[0] < w[1]));
    }
}

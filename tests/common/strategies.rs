use proptest::prelude::*;

/// Strategy for generating platform identifiers
pub fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// Strategy for generating an organization → projects hierarchy with
/// distinct organization identifiers
pub fn hierarchy_strategy() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    prop::collection::btree_map(
        identifier_strategy(),
        prop::collection::btree_set(identifier_strategy(), 0..4),
        0..5,
    )
    .prop_map(|orgs| {
        orgs.into_iter()
            .map(|(org, projects)| (org, projects.into_iter().collect()))
            .collect()
    })
}

/// Strategy for generating (item count, page size) pairs
pub fn listing_strategy() -> impl Strategy<Value = (usize, usize)> {
    (0usize..250, 1usize..40)
}

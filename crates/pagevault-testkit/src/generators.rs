//! Proptest generators for property-based testing.

use proptest::prelude::*;

use pagevault_core::{ResourceId, RoleName};

/// Generate a resource id.
pub fn resource_id() -> impl Strategy<Value = ResourceId> {
    "[a-f0-9]{8}".prop_map(ResourceId::new)
}

/// Generate a role name.
pub fn role_name() -> impl Strategy<Value = RoleName> {
    "[a-z][a-z0-9-]{0,15}".prop_map(RoleName::new)
}

/// Generate a denied-action code, known or not.
pub fn denied_action_code() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("R".to_string()),
        Just("W".to_string()),
        Just("H".to_string()),
        "[A-Z]{1,2}".prop_map(String::from),
    ]
}

/// A randomly shaped role-inheritance graph over a small fixed alphabet
/// of role names. Cycles are allowed; resolvers must terminate anyway.
#[derive(Debug, Clone)]
pub struct RoleGraph {
    /// `(role, inherits)` pairs.
    pub edges: Vec<(RoleName, Vec<RoleName>)>,
    /// Roles directly assigned to the test user.
    pub assigned: Vec<RoleName>,
}

impl Arbitrary for RoleGraph {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        let role_count = 2usize..=6;
        role_count
            .prop_flat_map(|n| {
                let names: Vec<RoleName> = (0..n)
                    .map(|i| RoleName::new(format!("role-{i}")))
                    .collect();
                let edges = prop::collection::vec(
                    prop::collection::vec(0..n, 0..n),
                    n..=n,
                );
                let assigned = prop::collection::vec(0..n, 1..=n);
                (Just(names), edges, assigned)
            })
            .prop_map(|(names, edges, assigned)| RoleGraph {
                edges: names
                    .iter()
                    .zip(&edges)
                    .map(|(name, parents)| {
                        (
                            name.clone(),
                            parents.iter().map(|&i| names[i].clone()).collect(),
                        )
                    })
                    .collect(),
                assigned: assigned.iter().map(|&i| names[i].clone()).collect(),
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pagevault_authz::RoleResolver;
    use pagevault_core::{HexBytes, OnDeniedAction, RoleRecord};
    use pagevault_store::MemoryRecords;

    use super::*;

    fn records_from_graph(graph: &RoleGraph) -> MemoryRecords {
        let records = MemoryRecords::new();
        for (role, inherits) in &graph.edges {
            records.insert_role(
                role.clone(),
                RoleRecord {
                    inherits: inherits.clone(),
                    secret: HexBytes::new(vec![0]),
                },
            );
        }
        records
    }

    fn block_on<Fut: std::future::Future>(fut: Fut) -> Fut::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(fut)
    }

    proptest! {
        #[test]
        fn test_expansion_terminates_and_covers_assigned(graph: RoleGraph) {
            let resolver = RoleResolver::new(Arc::new(records_from_graph(&graph)));
            let expanded = block_on(resolver.expand_roles(&graph.assigned)).unwrap();

            for role in &graph.assigned {
                prop_assert!(expanded.contains(role));
            }
        }

        #[test]
        fn test_expansion_is_monotone_in_assignments(graph: RoleGraph) {
            let resolver = RoleResolver::new(Arc::new(records_from_graph(&graph)));
            let full = block_on(resolver.expand_roles(&graph.assigned)).unwrap();
            let first_only = block_on(resolver.expand_roles(&graph.assigned[..1])).unwrap();

            prop_assert!(first_only.is_subset(&full));
        }

        #[test]
        fn test_unknown_codes_never_panic(code in denied_action_code()) {
            let action = OnDeniedAction::from_code(&code);
            match code.as_str() {
                "R" => prop_assert_eq!(action, OnDeniedAction::Redirect),
                "W" => prop_assert_eq!(action, OnDeniedAction::Warn),
                "H" => prop_assert_eq!(action, OnDeniedAction::Hide),
                _ => prop_assert_eq!(action, OnDeniedAction::Unknown),
            }
        }
    }
}

// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{CodeRange, ContainerNode, DataNode, IsGroup, NodeAttributes};
use blockmatch_metadata::RunnerAssertion;

/// The tree of assertions reported by the runner for a source file.
pub type AssertionTree = ContainerNode<RunnerAssertion>;

/// Builds an [`AssertionTree`] from the runner's flat assertion list.
///
/// Containers are created along each assertion's ancestor titles. After insertion, siblings are
/// sorted and assertions reported at the same line are grouped: this is how parameterized
/// invocations (`it.each`) show up.
pub fn build_assertion_tree(assertions: &[RunnerAssertion]) -> AssertionTree {
    let mut root = AssertionTree::root();
    for assertion in assertions {
        let attrs = NodeAttributes {
            full_name: assertion.full_name.clone(),
            is_group: IsGroup::No,
            non_literal_name: None,
            range: assertion.location.map(CodeRange::point),
        };
        // Runner locations are 1-based; a missing location or line 0 is unknown.
        let zero_based_line = assertion
            .location
            .and_then(|location| location.line.checked_sub(1));

        root.find_or_create_container(&assertion.ancestor_titles)
            .add_data_node(DataNode::new(
                assertion.title.clone(),
                zero_based_line,
                assertion.clone(),
                attrs,
            ));
    }
    root.sort(true);
    root
}

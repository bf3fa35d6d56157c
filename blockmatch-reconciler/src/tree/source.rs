// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{CodeRange, ContainerNode, DataNode, IsGroup, NodeAttributes};
use blockmatch_metadata::{ItBlock, Location, ParsedFile, ParsedNode};

/// The tree of test blocks found in a source file.
pub type SourceTree = ContainerNode<ItBlock>;

/// Builds a [`SourceTree`] from a parsed source file.
///
/// Every `describe` becomes a container and every `it`/`test` a data node. Siblings are sorted
/// by line but never grouped: two real test blocks can't share a start line.
pub fn build_source_tree(file: &ParsedFile) -> SourceTree {
    build_source_tree_from_nodes(&file.root)
}

/// Builds a [`SourceTree`] from a list of top-level blocks.
pub fn build_source_tree_from_nodes(nodes: &[ParsedNode]) -> SourceTree {
    let mut root = SourceTree::root();
    add_nodes(&mut root, nodes);
    root.sort(false);
    root
}

fn add_nodes(parent: &mut SourceTree, nodes: &[ParsedNode]) {
    for node in nodes {
        match node {
            ParsedNode::Describe(block) => {
                let attrs = NodeAttributes {
                    full_name: None,
                    is_group: IsGroup::No,
                    non_literal_name: Some(block.non_literal_name),
                    range: Some(CodeRange {
                        start: block.start,
                        end: block.end,
                    }),
                };
                let container = parent.add_container_node(ContainerNode::new(
                    block.name.clone(),
                    zero_based_line(block.start),
                    attrs,
                ));
                add_nodes(container, &block.children);
            }
            ParsedNode::It(block) => {
                let attrs = NodeAttributes {
                    full_name: None,
                    is_group: if block.is_each() {
                        IsGroup::Maybe
                    } else {
                        IsGroup::No
                    },
                    non_literal_name: Some(block.non_literal_name),
                    range: Some(CodeRange {
                        start: block.start,
                        end: block.end,
                    }),
                };
                parent.add_data_node(DataNode::new(
                    block.name.clone(),
                    zero_based_line(block.start),
                    block.clone(),
                    attrs,
                ));
            }
        }
    }
}

fn zero_based_line(location: Location) -> Option<u32> {
    location.line.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;
    use blockmatch_metadata::DescribeBlock;
    use pretty_assertions::assert_eq;

    fn it(name: &str, start: u32, end: u32) -> ParsedNode {
        ParsedNode::It(ItBlock {
            name: name.to_owned(),
            start: Location::new(start, 0),
            end: Location::new(end, 0),
            non_literal_name: false,
            last_property: None,
        })
    }

    #[test]
    fn builds_nested_tree() {
        let nodes = vec![
            it("top", 20, 22),
            ParsedNode::Describe(DescribeBlock {
                name: "outer".to_owned(),
                start: Location::new(1, 0),
                end: Location::new(18, 0),
                non_literal_name: false,
                children: vec![it("second", 10, 12), it("first", 2, 4)],
            }),
        ];

        let tree = build_source_tree_from_nodes(&nodes);
        assert_eq!(tree.child_data().len(), 1);
        assert_eq!(tree.child_data()[0].zero_based_line(), Some(19));

        let outer = &tree.child_containers()[0];
        assert_eq!(outer.zero_based_line(), Some(0));
        let children: Vec<_> = outer
            .child_data()
            .iter()
            .map(|node| (node.full_name(), node.zero_based_line()))
            .collect();
        assert_eq!(
            children,
            vec![("outer first", Some(1)), ("outer second", Some(9))]
        );
    }

    #[test]
    fn each_blocks_may_be_groups() {
        let nodes = vec![ParsedNode::It(ItBlock {
            name: "p-$i".to_owned(),
            start: Location::new(8, 2),
            end: Location::new(10, 4),
            non_literal_name: true,
            last_property: Some("each".to_owned()),
        })];

        let tree = build_source_tree_from_nodes(&nodes);
        let node = &tree.child_data()[0];
        assert_eq!(node.is_group_node(), IsGroup::Maybe);
        assert!(node.is_dynamic());
        assert_eq!(node.base().attrs().non_literal_name, Some(true));
    }

    #[test]
    fn shared_start_lines_are_not_merged() {
        let nodes = vec![it("a", 3, 3), it("b", 3, 3)];
        let tree = build_source_tree_from_nodes(&nodes);
        assert_eq!(tree.child_data().len(), 2);
        assert!(tree.child_data().iter().all(|node| node.group().is_empty()));
    }
}

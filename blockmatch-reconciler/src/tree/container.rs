// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::node::{NodeAttributes, NodeBase, TreeNode};
use itertools::Itertools;

/// A terminal node carrying a payload: a test block or a runner assertion.
#[derive(Clone, Debug)]
pub struct DataNode<T> {
    base: NodeBase,
    data: T,
    group: Vec<DataNode<T>>,
}

impl<T> DataNode<T> {
    /// Creates a new data node.
    pub fn new(
        name: impl Into<String>,
        zero_based_line: Option<u32>,
        data: T,
        attrs: NodeAttributes,
    ) -> Self {
        Self {
            base: NodeBase::new(name, zero_based_line, attrs),
            data,
            group: Vec::new(),
        }
    }

    /// The payload.
    pub fn data(&self) -> &T {
        &self.data
    }
}

impl<T> TreeNode for DataNode<T> {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn group(&self) -> &[Self] {
        &self.group
    }

    fn group_mut(&mut self) -> &mut Vec<Self> {
        &mut self.group
    }
}

/// Whether a container is the synthetic root of a tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContainerKind {
    /// The root of a tree. It has no name of its own and contributes no ancestor title.
    Root,

    /// A `describe` block, or a runner scope named by an ancestor title.
    Block,
}

/// A node holding child containers and child data nodes.
#[derive(Clone, Debug)]
pub struct ContainerNode<T> {
    base: NodeBase,
    kind: ContainerKind,
    child_containers: Vec<ContainerNode<T>>,
    child_data: Vec<DataNode<T>>,
    group: Vec<ContainerNode<T>>,
}

impl<T> ContainerNode<T> {
    /// Creates the root of a tree.
    pub fn root() -> Self {
        Self::with_kind(ContainerKind::Root, "", None, NodeAttributes::default())
    }

    /// Creates a block container.
    pub fn new(name: impl Into<String>, zero_based_line: Option<u32>, attrs: NodeAttributes) -> Self {
        Self::with_kind(ContainerKind::Block, name, zero_based_line, attrs)
    }

    fn with_kind(
        kind: ContainerKind,
        name: impl Into<String>,
        zero_based_line: Option<u32>,
        attrs: NodeAttributes,
    ) -> Self {
        Self {
            base: NodeBase::new(name, zero_based_line, attrs),
            kind,
            child_containers: Vec::new(),
            child_data: Vec::new(),
            group: Vec::new(),
        }
    }

    /// Returns the kind of this container.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Returns true if this is the root of a tree.
    pub fn is_root(&self) -> bool {
        self.kind == ContainerKind::Root
    }

    /// The child containers, in order.
    pub fn child_containers(&self) -> &[ContainerNode<T>] {
        &self.child_containers
    }

    /// The child data nodes, in order.
    pub fn child_data(&self) -> &[DataNode<T>] {
        &self.child_data
    }

    pub(crate) fn child_containers_mut(&mut self) -> &mut Vec<ContainerNode<T>> {
        &mut self.child_containers
    }

    pub(crate) fn child_data_mut(&mut self) -> &mut Vec<DataNode<T>> {
        &mut self.child_data
    }

    /// The ancestor titles this container hands to its children.
    pub fn child_ancestor_titles(&self) -> Vec<String> {
        match self.kind {
            ContainerKind::Root => Vec::new(),
            ContainerKind::Block => {
                let mut titles = self.base.ancestor_titles().to_vec();
                titles.push(self.base.name().to_owned());
                titles
            }
        }
    }

    /// Adds a data node, assigning its ancestor titles. Returns a reference to the added node.
    pub fn add_data_node(&mut self, mut node: DataNode<T>) -> &mut DataNode<T> {
        node.base_mut()
            .set_ancestor_titles(self.child_ancestor_titles());
        let index = self.child_data.len();
        self.child_data.push(node);
        &mut self.child_data[index]
    }

    /// Adds a container, assigning ancestor titles to it and all its descendants. Returns a
    /// reference to the added container.
    pub fn add_container_node(&mut self, mut node: ContainerNode<T>) -> &mut ContainerNode<T> {
        node.assign_ancestor_titles(self.child_ancestor_titles());
        let index = self.child_containers.len();
        self.child_containers.push(node);
        &mut self.child_containers[index]
    }

    fn assign_ancestor_titles(&mut self, ancestor_titles: Vec<String>) {
        self.base.set_ancestor_titles(ancestor_titles);
        let child_titles = self.child_ancestor_titles();
        for data in &mut self.child_data {
            data.base_mut().set_ancestor_titles(child_titles.clone());
        }
        for container in &mut self.child_containers {
            container.assign_ancestor_titles(child_titles.clone());
        }
    }

    /// Finds the container at `path` below this one, following the first child container with
    /// each name. An empty path returns this container.
    pub fn find_container(&mut self, path: &[String]) -> Option<&mut ContainerNode<T>> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };
        self.child_containers
            .iter_mut()
            .find(|container| container.base.name() == first.as_str())?
            .find_container(rest)
    }

    /// Like [`find_container`](Self::find_container), but missing containers are created with
    /// an unknown location.
    pub fn find_or_create_container(&mut self, path: &[String]) -> &mut ContainerNode<T> {
        let Some((first, rest)) = path.split_first() else {
            return self;
        };

        let position = self
            .child_containers
            .iter()
            .position(|container| container.base.name() == first.as_str());
        let child = match position {
            Some(index) => &mut self.child_containers[index],
            None => self.add_container_node(ContainerNode::new(
                first.clone(),
                None,
                NodeAttributes::default(),
            )),
        };
        child.find_or_create_container(rest)
    }

    /// Sorts both child lists by line, recursively.
    ///
    /// With `grouping`, adjacent nodes sharing a known line are then merged into groups.
    pub fn sort(&mut self, grouping: bool) {
        self.child_data = sort_nodes(std::mem::take(&mut self.child_data), grouping);
        self.child_containers = sort_nodes(std::mem::take(&mut self.child_containers), grouping);

        for container in &mut self.child_containers {
            container.sort(grouping);
            for member in &mut container.group {
                member.sort(grouping);
            }
        }
    }

    /// Visits every data node in this subtree, depth-first: this container's data nodes first,
    /// then each child container's subtree. Group members are visited after their primary.
    pub fn for_each_data_mut(&mut self, f: &mut impl FnMut(&mut DataNode<T>)) {
        for data in &mut self.child_data {
            f(data);
            for member in &mut data.group {
                f(member);
            }
        }
        for container in &mut self.child_containers {
            container.for_each_data_mut(f);
            for member in &mut container.group {
                member.for_each_data_mut(f);
            }
        }
    }

    /// Visits every container in this subtree, including this one.
    pub fn for_each_container_mut(&mut self, f: &mut impl FnMut(&mut ContainerNode<T>)) {
        f(self);
        for container in &mut self.child_containers {
            container.for_each_container_mut(f);
        }
    }

    /// Returns the number of data nodes in this subtree, counting group members.
    pub fn data_count(&self) -> usize {
        let own: usize = self
            .child_data
            .iter()
            .map(|data| data.all().count())
            .sum();
        own + self
            .child_containers
            .iter()
            .flat_map(|container| container.all())
            .map(|container| container.data_count())
            .sum::<usize>()
    }
}

impl<T> TreeNode for ContainerNode<T> {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn group(&self) -> &[Self] {
        &self.group
    }

    fn group_mut(&mut self) -> &mut Vec<Self> {
        &mut self.group
    }
}

/// Stable-sorts nodes by line (unknown lines first), then folds adjacent runs sharing a known
/// line into groups if requested.
fn sort_nodes<N: TreeNode>(mut nodes: Vec<N>, grouping: bool) -> Vec<N> {
    nodes.sort_by_key(|node| node.zero_based_line());
    if !grouping {
        return nodes;
    }

    nodes
        .into_iter()
        .coalesce(|mut prev, next| match prev.merge(next) {
            Ok(()) => Ok(prev),
            Err(next) => Err((prev, next)),
        })
        .collect()
}

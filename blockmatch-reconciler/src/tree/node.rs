// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use blockmatch_metadata::{Location, MatchEvent};
use std::cell::OnceCell;

/// Whether a node stands for more than one same-position occurrence.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum IsGroup {
    /// The node has group members.
    Yes,

    /// The node is a single occurrence.
    #[default]
    No,

    /// The node may turn out to be a group, for example an `it.each` block. This can only be
    /// confirmed after matching.
    Maybe,
}

/// A 1-based source range.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct CodeRange {
    /// The start of the range.
    pub start: Location,

    /// The end of the range.
    pub end: Location,
}

impl CodeRange {
    /// Creates a range covering a single position.
    pub fn point(location: Location) -> Self {
        Self {
            start: location,
            end: location,
        }
    }

    /// Returns true if `other` lies within this range.
    ///
    /// Only lines are compared: parsers and runners disagree on column bases.
    pub fn encloses(&self, other: &CodeRange) -> bool {
        self.start.line <= other.start.line && other.end.line <= self.end.line
    }
}

/// Optional attributes attached to a node at construction time.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NodeAttributes {
    /// A full name supplied by the producer. If `None`, the full name is computed from the
    /// ancestor titles.
    pub full_name: Option<String>,

    /// The group classification known before matching.
    pub is_group: IsGroup,

    /// Whether the name is known to be a non-literal (template or parameterized) name.
    ///
    /// `None` means the producer can't tell, which is always the case for names reported at
    /// runtime.
    pub non_literal_name: Option<bool>,

    /// The source range of the node.
    pub range: Option<CodeRange>,
}

/// Options for [`TreeNode::matches`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MatchOptions {
    /// Require the other node's range to enclose this node's range.
    pub check_is_within: bool,

    /// Skip the group-shape check.
    pub ignore_group_diff: bool,

    /// Accept differing names when both sides are plausibly non-literal.
    pub ignore_non_literal_name_diff: bool,

    /// Accept equal local names even if the full names differ.
    pub accept_local_name_match: bool,
}

/// An append-only, insertion-ordered log of match events.
///
/// Recording an event that's already present is a no-op.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatchHistory {
    events: Vec<MatchEvent>,
}

impl MatchHistory {
    /// Records an event.
    pub fn record(&mut self, event: MatchEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }

    /// Returns true if the event has been recorded.
    pub fn contains(&self, event: MatchEvent) -> bool {
        self.events.contains(&event)
    }

    /// Returns the recorded events in order.
    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    /// Returns true if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns an owned copy of the events.
    pub fn snapshot(&self) -> Vec<MatchEvent> {
        self.events.clone()
    }
}

/// The data every tree node carries, regardless of its shape or payload.
#[derive(Clone, Debug)]
pub struct NodeBase {
    name: String,
    zero_based_line: Option<u32>,
    attrs: NodeAttributes,
    ancestor_titles: Vec<String>,
    full_name: OnceCell<String>,
    history: MatchHistory,
}

impl NodeBase {
    /// Creates a new node base. `zero_based_line` is `None` if the location is unknown.
    pub fn new(name: impl Into<String>, zero_based_line: Option<u32>, attrs: NodeAttributes) -> Self {
        Self {
            name: name.into(),
            zero_based_line,
            attrs,
            ancestor_titles: Vec::new(),
            full_name: OnceCell::new(),
            history: MatchHistory::default(),
        }
    }

    /// The node's own (local) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The 0-based line, or `None` if unknown.
    pub fn zero_based_line(&self) -> Option<u32> {
        self.zero_based_line
    }

    /// The attributes the node was created with.
    pub fn attrs(&self) -> &NodeAttributes {
        &self.attrs
    }

    /// The titles of the enclosing containers, outermost first.
    pub fn ancestor_titles(&self) -> &[String] {
        &self.ancestor_titles
    }

    /// The full name: the producer-supplied one if any, otherwise the ancestor titles and the
    /// local name joined by spaces.
    ///
    /// Computed on first use.
    pub fn full_name(&self) -> &str {
        self.full_name.get_or_init(|| match &self.attrs.full_name {
            Some(full_name) => full_name.clone(),
            None => self
                .ancestor_titles
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(self.name.as_str()))
                .collect::<Vec<_>>()
                .join(" "),
        })
    }

    /// The match history recorded on this node.
    pub fn history(&self) -> &MatchHistory {
        &self.history
    }

    pub(crate) fn set_ancestor_titles(&mut self, ancestor_titles: Vec<String>) {
        self.ancestor_titles = ancestor_titles;
        self.full_name = OnceCell::new();
    }

    fn is_plausibly_non_literal(&self) -> bool {
        self.attrs.non_literal_name != Some(false)
    }
}

/// Operations shared by container and data nodes.
///
/// Group members are always flattened: a member never has group members of its own.
pub trait TreeNode: Sized {
    /// Returns the shared node data.
    fn base(&self) -> &NodeBase;

    /// Returns the shared node data mutably.
    fn base_mut(&mut self) -> &mut NodeBase;

    /// Returns the nodes merged into this one.
    fn group(&self) -> &[Self];

    /// Returns the nodes merged into this one, mutably.
    fn group_mut(&mut self) -> &mut Vec<Self>;

    /// The node's own name.
    fn name(&self) -> &str {
        self.base().name()
    }

    /// The node's full name.
    fn full_name(&self) -> &str {
        self.base().full_name()
    }

    /// The 0-based line, or `None` if unknown.
    fn zero_based_line(&self) -> Option<u32> {
        self.base().zero_based_line()
    }

    /// The match history recorded on this node.
    fn history(&self) -> &MatchHistory {
        self.base().history()
    }

    /// This node followed by its group members.
    fn all(&self) -> impl Iterator<Item = &Self> {
        std::iter::once(self).chain(self.group())
    }

    /// Returns whether this node is a group.
    fn is_group_node(&self) -> IsGroup {
        if self.group().is_empty() {
            self.base().attrs().is_group
        } else {
            IsGroup::Yes
        }
    }

    /// Records an event on this node and every group member.
    fn add_event(&mut self, event: MatchEvent) {
        self.base_mut().history.record(event);
        for member in self.group_mut() {
            member.base_mut().history.record(event);
        }
    }

    /// Merges `other` and its group members into this node's group.
    ///
    /// Fails, handing `other` back, if either location is unknown or the lines differ.
    fn merge(&mut self, other: Self) -> Result<(), Self> {
        match (self.zero_based_line(), other.zero_based_line()) {
            (Some(line), Some(other_line)) if line == other_line => {
                absorb(self, other);
                Ok(())
            }
            _ => Err(other),
        }
    }

    /// Merges `other` and its group members into this node's group regardless of location.
    ///
    /// Only used to regroup nodes that have already failed to match on their own.
    fn force_merge(&mut self, other: Self) {
        absorb(self, other);
    }

    /// Checks whether this node corresponds to `other`.
    ///
    /// The checks run in order, and the first failing check fails the match:
    ///
    /// 1. If `check_is_within` is set, `other`'s range must enclose this node's range.
    /// 2. The full names must be equal, unless non-literal or local name matches are accepted.
    /// 3. The group shapes must agree, unless either is [`IsGroup::Maybe`] or
    ///    `ignore_group_diff` is set.
    fn matches<O: TreeNode>(&self, other: &O, options: MatchOptions) -> bool {
        if options.check_is_within {
            let within = match (self.base().attrs().range, other.base().attrs().range) {
                (Some(range), Some(other_range)) => other_range.encloses(&range),
                _ => false,
            };
            if !within {
                return false;
            }
        }

        let names_match = self.full_name() == other.full_name()
            || (options.ignore_non_literal_name_diff && both_non_literal(self, other))
            || (options.accept_local_name_match && self.name() == other.name());
        if !names_match {
            return false;
        }

        options.ignore_group_diff
            || group_shapes_agree(self.is_group_node(), other.is_group_node())
    }

    /// Checks the node for missing information, recording `missing-ancestor-info` and
    /// `invalid-location` as appropriate.
    ///
    /// Returns false if any problem was found. Problems don't by themselves fail a match.
    fn check_integrity(&mut self) -> bool {
        let mut valid = true;
        let base = self.base();
        if base.ancestor_titles().is_empty() && base.name() != base.full_name() {
            self.add_event(MatchEvent::MissingAncestorInfo);
            valid = false;
        }
        if self.zero_based_line().is_none() {
            self.add_event(MatchEvent::InvalidLocation);
            valid = false;
        }
        valid
    }

    /// Returns true if this node is known to carry a dynamic name: a non-literal name or a
    /// (possible) group.
    fn is_dynamic(&self) -> bool {
        self.base().attrs().non_literal_name == Some(true) || self.is_group_node() != IsGroup::No
    }
}

fn absorb<N: TreeNode>(node: &mut N, mut other: N) {
    let members = std::mem::take(other.group_mut());
    let group = node.group_mut();
    group.push(other);
    group.extend(members);
}

fn both_non_literal<A: TreeNode, B: TreeNode>(a: &A, b: &B) -> bool {
    a.base().is_plausibly_non_literal()
        && b.base().is_plausibly_non_literal()
        && (a.is_dynamic() || b.is_dynamic())
}

fn group_shapes_agree(a: IsGroup, b: IsGroup) -> bool {
    a == IsGroup::Maybe || b == IsGroup::Maybe || a == b
}

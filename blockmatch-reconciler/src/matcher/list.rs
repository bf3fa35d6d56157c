// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Matching one list of source siblings against one list of runner siblings.

use crate::tree::{MatchOptions, TreeNode};
use blockmatch_metadata::MatchEvent;
use itertools::Itertools;
use std::{collections::HashMap, fmt, mem, ops::Range};

/// Which phases to run for a sibling list.
#[derive(Clone, Copy, Debug)]
pub(super) struct ListPhases {
    /// Pair by index when the lists have the same length.
    pub(super) sequence: bool,

    /// Match the remaining nodes by reported location.
    pub(super) location: bool,

    /// Accept local names when either side lacks ancestor info.
    pub(super) local_name: bool,

    /// Whether nodes carry locations. If so, integrity is checked and sequence pairs with an
    /// unknown location are deferred to the later phases.
    pub(super) located: bool,

    /// Skip the group-shape check when matching by name.
    pub(super) ignore_group_diff: bool,
}

/// The outcome for one source node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) enum ListOutcome {
    /// Matched to the runner node in the given slot.
    Matched { slot: usize, event: MatchEvent },

    /// Not matched.
    Unmatched {
        candidates: usize,
        event: MatchEvent,
        reason: UnmatchedReason,
    },
}

/// Why a source node could not be matched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) enum UnmatchedReason {
    /// No runner node corresponds to this one.
    NoCandidates,

    /// More than one runner node corresponds to this one.
    TooManyCandidates(usize),

    /// The name is shared by this many static siblings.
    DuplicateName(usize),
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoCandidates => write!(f, "no assertion found"),
            Self::TooManyCandidates(count) => write!(f, "found {count} matched assertions"),
            Self::DuplicateName(count) => write!(
                f,
                "name is shared by {count} blocks in the same scope, can't tell which one ran"
            ),
        }
    }
}

/// The result of matching a sibling list.
#[derive(Debug)]
pub(super) struct ListMatches {
    /// One outcome per source node, in source order.
    pub(super) outcomes: Vec<ListOutcome>,

    /// Slots of runner nodes no source node claimed.
    pub(super) unclaimed: Vec<usize>,
}

/// Matches `sources` against the runner nodes in `slots`.
///
/// Runner nodes are held in slots so that nodes absorbed into a group by the location phase can
/// be taken out without shifting the others. Every slot referenced by a
/// [`ListOutcome::Matched`] is occupied.
///
/// Phases run in order, each only looking at what the previous ones left unmatched:
///
/// 1. Sequence: if both lists have the same length, pair them by index. Runner nodes with an
///    unknown location are resolved by name first, and the located remainder is paired if the
///    counts still agree.
/// 2. Name: pair static source nodes with the runner nodes that have the same full name. Names
///    shared by several static siblings can't be matched this way. Runner groups whose members
///    have different names are split up for this phase, and the members nobody claimed are
///    regrouped afterwards.
/// 3. Location: pair the remaining source nodes with the runner nodes reported inside them.
///    Dynamic source nodes (`it.each`) absorb every such runner node as one group. Static source
///    nodes never take a group.
///
/// Split group members are appended to `slots`.
pub(super) fn match_list<S: TreeNode, A: TreeNode>(
    sources: &mut [S],
    slots: &mut Vec<Option<A>>,
    phases: ListPhases,
) -> ListMatches {
    if phases.located {
        for source in sources.iter_mut() {
            source.check_integrity();
        }
        for assertion in slots.iter_mut().flatten() {
            assertion.check_integrity();
        }
    }

    let mut outcomes: Vec<Option<ListOutcome>> = vec![None; sources.len()];
    let mut claimed = vec![false; slots.len()];

    // Phase 1: sequence.
    if phases.sequence && sources.len() == slots.len() {
        if phases.located {
            // Runner nodes without a location sort first, which would shift every pair after
            // them. Resolve those by name before pairing the rest.
            for slot in 0..slots.len() {
                let Some(assertion) = slots[slot].as_ref() else {
                    continue;
                };
                if assertion.zero_based_line().is_some() {
                    continue;
                }
                let candidates: Vec<usize> = (0..sources.len())
                    .filter(|&index| {
                        outcomes[index].is_none()
                            && sources[index].matches(
                                assertion,
                                name_options(phases, &sources[index], assertion),
                            )
                    })
                    .collect();
                if let &[index] = candidates.as_slice() {
                    if let Some(assertion) = slots[slot].as_mut() {
                        claim(
                            &mut sources[index],
                            assertion,
                            MatchEvent::MatchByName,
                            &mut outcomes[index],
                            &mut claimed[slot],
                            slot,
                        );
                    }
                }
            }
        }

        let paired_sources: Vec<usize> = (0..sources.len())
            .filter(|&index| {
                outcomes[index].is_none()
                    && (!phases.located || sources[index].zero_based_line().is_some())
            })
            .collect();
        let paired_slots: Vec<usize> = unclaimed_slots(slots, &claimed)
            .filter(|(_, assertion)| !phases.located || assertion.zero_based_line().is_some())
            .map(|(slot, _)| slot)
            .collect();
        if paired_sources.len() == paired_slots.len() {
            for (&index, &slot) in paired_sources.iter().zip(&paired_slots) {
                if let Some(assertion) = slots[slot].as_mut() {
                    claim(
                        &mut sources[index],
                        assertion,
                        MatchEvent::MatchByContext,
                        &mut outcomes[index],
                        &mut claimed[slot],
                        slot,
                    );
                }
            }
        }
    }

    // Phase 2: name.
    let split = split_mixed_groups(slots, &mut claimed);
    let static_name_counts: HashMap<String, usize> = sources
        .iter()
        .filter(|source| !source.is_dynamic())
        .map(|source| source.full_name().to_owned())
        .counts();

    for (index, source) in sources.iter_mut().enumerate() {
        if outcomes[index].is_some() || source.is_dynamic() {
            continue;
        }

        let count = static_name_counts
            .get(source.full_name())
            .copied()
            .unwrap_or_default();
        if count > 1 {
            source.add_event(MatchEvent::DuplicateName);
            outcomes[index] = Some(ListOutcome::Unmatched {
                candidates: 0,
                event: MatchEvent::MatchFailed,
                reason: UnmatchedReason::DuplicateName(count),
            });
            continue;
        }

        let candidates: Vec<usize> = unclaimed_slots(slots, &claimed)
            .filter(|&(_, assertion)| {
                source.matches(assertion, name_options(phases, &*source, assertion))
            })
            .map(|(slot, _)| slot)
            .collect();

        match candidates.as_slice() {
            [] => {}
            &[slot] => {
                if let Some(assertion) = slots[slot].as_mut() {
                    claim(
                        source,
                        assertion,
                        MatchEvent::MatchByName,
                        &mut outcomes[index],
                        &mut claimed[slot],
                        slot,
                    );
                }
            }
            many => {
                outcomes[index] = Some(ListOutcome::Unmatched {
                    candidates: many.len(),
                    event: MatchEvent::MatchFailedOneToMany,
                    reason: UnmatchedReason::TooManyCandidates(many.len()),
                });
            }
        }
    }
    rejoin_split_groups(slots, &claimed, split);

    // Phase 3: location.
    if phases.location && phases.located {
        for (index, source) in sources.iter_mut().enumerate() {
            if outcomes[index].is_some() {
                continue;
            }

            let options = MatchOptions {
                check_is_within: true,
                ignore_group_diff: true,
                ignore_non_literal_name_diff: true,
                accept_local_name_match: false,
            };
            let dynamic = source.is_dynamic();
            let candidates: Vec<usize> = unclaimed_slots(slots, &claimed)
                .filter(|&(_, assertion)| dynamic || assertion.group().is_empty())
                .filter(|&(_, assertion)| assertion.matches(&*source, options))
                .map(|(slot, _)| slot)
                .collect();

            let slot = match candidates.as_slice() {
                [] => continue,
                &[slot] => slot,
                [first, rest @ ..] if dynamic => {
                    for &member_slot in rest {
                        let member = slots[member_slot].take();
                        if let (Some(primary), Some(member)) = (slots[*first].as_mut(), member) {
                            primary.force_merge(member);
                        }
                    }
                    *first
                }
                many => {
                    outcomes[index] = Some(ListOutcome::Unmatched {
                        candidates: many.len(),
                        event: MatchEvent::MatchFailedOneToMany,
                        reason: UnmatchedReason::TooManyCandidates(many.len()),
                    });
                    continue;
                }
            };

            if let Some(assertion) = slots[slot].as_mut() {
                claim(
                    source,
                    assertion,
                    MatchEvent::MatchByLocation,
                    &mut outcomes[index],
                    &mut claimed[slot],
                    slot,
                );
            }
        }
    }

    // Whatever is left has no candidates.
    let outcomes: Vec<ListOutcome> = sources
        .iter_mut()
        .zip(outcomes)
        .map(|(source, outcome)| {
            let outcome = outcome.unwrap_or(ListOutcome::Unmatched {
                candidates: 0,
                event: MatchEvent::MatchFailed,
                reason: UnmatchedReason::NoCandidates,
            });
            if let ListOutcome::Unmatched { event, .. } = &outcome {
                source.add_event(*event);
            }
            outcome
        })
        .collect();

    let unclaimed: Vec<usize> = unclaimed_slots(slots, &claimed)
        .map(|(slot, _)| slot)
        .collect();
    for &slot in &unclaimed {
        if let Some(assertion) = slots[slot].as_mut() {
            assertion.add_event(MatchEvent::MatchFailed);
        }
    }

    ListMatches {
        outcomes,
        unclaimed,
    }
}

/// Moves the members of every unclaimed runner group with differing names into slots of their
/// own, returning each group's slot along with the slots its members went to.
fn split_mixed_groups<A: TreeNode>(
    slots: &mut Vec<Option<A>>,
    claimed: &mut Vec<bool>,
) -> Vec<(usize, Range<usize>)> {
    let mut split = Vec::new();
    for slot in 0..slots.len() {
        if claimed[slot] {
            continue;
        }
        let Some(primary) = slots[slot].as_mut() else {
            continue;
        };
        let mixed = primary
            .group()
            .iter()
            .any(|member| member.full_name() != primary.full_name());
        if !mixed {
            continue;
        }

        let members = mem::take(primary.group_mut());
        let start = slots.len();
        slots.extend(members.into_iter().map(Some));
        claimed.resize(slots.len(), false);
        split.push((slot, start..slots.len()));
    }
    split
}

/// Puts split members nobody claimed back into their group, if the group's own node is
/// unclaimed too. Other members keep their own slots.
fn rejoin_split_groups<A: TreeNode>(
    slots: &mut [Option<A>],
    claimed: &[bool],
    split: Vec<(usize, Range<usize>)>,
) {
    for (slot, members) in split {
        if claimed[slot] {
            continue;
        }
        let Some(mut primary) = slots[slot].take() else {
            continue;
        };
        for member_slot in members {
            if claimed[member_slot] {
                continue;
            }
            if let Some(member) = slots[member_slot].take() {
                primary.force_merge(member);
            }
        }
        slots[slot] = Some(primary);
    }
}

fn claim<S: TreeNode, A: TreeNode>(
    source: &mut S,
    assertion: &mut A,
    event: MatchEvent,
    outcome: &mut Option<ListOutcome>,
    claimed: &mut bool,
    slot: usize,
) {
    source.add_event(event);
    assertion.add_event(event);
    *outcome = Some(ListOutcome::Matched { slot, event });
    *claimed = true;
}

fn unclaimed_slots<'a, A>(
    slots: &'a [Option<A>],
    claimed: &'a [bool],
) -> impl Iterator<Item = (usize, &'a A)> + 'a {
    slots
        .iter()
        .enumerate()
        .filter(|&(slot, _)| !claimed[slot])
        .filter_map(|(slot, assertion)| assertion.as_ref().map(|assertion| (slot, assertion)))
}

fn name_options<S: TreeNode, A: TreeNode>(
    phases: ListPhases,
    source: &S,
    assertion: &A,
) -> MatchOptions {
    MatchOptions {
        ignore_group_diff: phases.ignore_group_diff,
        accept_local_name_match: phases.local_name
            && (lacks_ancestor_info(source) || lacks_ancestor_info(assertion)),
        ..MatchOptions::default()
    }
}

fn lacks_ancestor_info<N: TreeNode>(node: &N) -> bool {
    node.history().contains(MatchEvent::MissingAncestorInfo)
}

// Copyright (c) The blockmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use blockmatch_metadata::{MatchEvent, TestReconciliationState, ZeroBasedLocation};
use blockmatch_reconciler::matcher::MatcherOptions;
use color_eyre::eyre::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;

#[test]
fn single_block_is_projected() -> Result<()> {
    let reconciled = reconcile_json(
        indoc! {r#"
            {
              "root": [
                { "type": "it", "name": "adds",
                  "start": { "line": 2, "column": 0 }, "end": { "line": 4, "column": 0 } }
              ]
            }
        "#},
        indoc! {r#"
            [{ "title": "adds", "ancestorTitles": [], "status": "KnownSuccess",
               "location": { "line": 3 } }]
        "#},
    )?;

    let [result] = reconciled.results.as_slice() else {
        panic!("expected one result, found {:?}", reconciled.results);
    };
    assert_eq!(result.name, "adds");
    assert_eq!(result.status, TestReconciliationState::KnownSuccess);
    assert_eq!(result.start, ZeroBasedLocation { line: 1, column: 0 });
    assert_eq!(result.end, ZeroBasedLocation { line: 3, column: 0 });
    assert_eq!(result.line_number_of_error, Some(2));
    assert_eq!(result.source_history, vec![MatchEvent::MatchByContext]);
    Ok(())
}

#[test]
fn missing_assertion_is_unknown() -> Result<()> {
    let reconciled = reconcile_json(
        indoc! {r#"
            {
              "root": [
                { "type": "describe", "name": "d",
                  "start": { "line": 1, "column": 0 }, "end": { "line": 6, "column": 2 },
                  "children": [
                    { "type": "it", "name": "t1",
                      "start": { "line": 2, "column": 2 }, "end": { "line": 3, "column": 4 } },
                    { "type": "it", "name": "t2",
                      "start": { "line": 4, "column": 2 }, "end": { "line": 5, "column": 4 } }
                  ] }
              ]
            }
        "#},
        indoc! {r#"
            [{ "title": "t1", "ancestorTitles": ["d"], "fullName": "d t1",
               "status": "KnownSuccess", "location": { "line": 2 } }]
        "#},
    )?;

    assert_eq!(names(&reconciled.results), ["d t1", "t2"]);
    let (t1, t2) = (&reconciled.results[0], &reconciled.results[1]);

    assert_eq!(t1.status, TestReconciliationState::KnownSuccess);
    assert_eq!(t1.source_history, vec![MatchEvent::MatchByName]);

    assert_eq!(t2.status, TestReconciliationState::Unknown);
    assert_eq!(t2.source_history, vec![MatchEvent::MatchFailed]);
    assert_eq!(t2.short_message.as_deref(), Some("no assertion found"));
    assert_eq!(t2.identifier.ancestor_titles, vec!["d"]);
    assert_eq!(t2.line_number_of_error, None);
    Ok(())
}

#[test]
fn parameterized_block_picks_failure_as_primary() -> Result<()> {
    let reconciled = reconcile_json(
        indoc! {r#"
            {
              "root": [
                { "type": "it", "name": "p-%i", "lastProperty": "each",
                  "start": { "line": 8, "column": 0 }, "end": { "line": 10, "column": 2 } }
              ]
            }
        "#},
        indoc! {r#"
            [
              { "title": "p-1", "status": "KnownFail", "location": { "line": 8 },
                "shortMessage": "expected 1 to be 2" },
              { "title": "p-2", "status": "KnownSuccess", "location": { "line": 8 } },
              { "title": "p-3", "status": "KnownFail", "location": { "line": 8 },
                "shortMessage": "expected 3 to be 2" }
            ]
        "#},
    )?;

    let [result] = reconciled.results.as_slice() else {
        panic!("expected one result, found {:?}", reconciled.results);
    };
    assert_eq!(result.name, "p-1");
    assert_eq!(result.status, TestReconciliationState::KnownFail);
    assert_eq!(result.short_message.as_deref(), Some("expected 1 to be 2"));
    assert_eq!(result.line_number_of_error, Some(7));

    assert_eq!(names(&result.multi_results), ["p-3", "p-2"]);
    assert_eq!(
        result
            .multi_results
            .iter()
            .map(|result| result.status)
            .collect::<Vec<_>>(),
        [
            TestReconciliationState::KnownFail,
            TestReconciliationState::KnownSuccess
        ]
    );
    Ok(())
}

const DUPLICATE_NAMES: &str = indoc! {r#"
    {
      "root": [
        { "type": "describe", "name": "scope",
          "start": { "line": 1, "column": 0 }, "end": { "line": 10, "column": 2 },
          "children": [
            { "type": "it", "name": "test-1",
              "start": { "line": 2, "column": 2 }, "end": { "line": 3, "column": 4 } },
            { "type": "it", "name": "test-1",
              "start": { "line": 5, "column": 2 }, "end": { "line": 6, "column": 4 } }
          ] }
      ]
    }
"#};

#[test]
fn duplicate_names_match_by_sequence() -> Result<()> {
    let reconciled = reconcile_json(
        DUPLICATE_NAMES,
        indoc! {r#"
            [
              { "title": "test-1", "ancestorTitles": ["scope"], "status": "KnownFail",
                "location": { "line": 2 } },
              { "title": "test-1", "ancestorTitles": ["scope"], "status": "KnownSuccess",
                "location": { "line": 5 } }
            ]
        "#},
    )?;

    assert_eq!(
        reconciled
            .results
            .iter()
            .map(|result| result.status)
            .collect::<Vec<_>>(),
        [
            TestReconciliationState::KnownFail,
            TestReconciliationState::KnownSuccess
        ]
    );
    for result in &reconciled.results {
        assert_eq!(result.source_history, vec![MatchEvent::MatchByContext]);
        assert!(!has_event(result, MatchEvent::DuplicateName));
    }
    Ok(())
}

#[test]
fn duplicate_names_without_sequence_are_ambiguous() -> Result<()> {
    let reconciled = reconcile_json(
        DUPLICATE_NAMES,
        indoc! {r#"
            [{ "title": "test-1", "ancestorTitles": ["scope"], "status": "KnownFail",
               "location": { "line": 2 } }]
        "#},
    )?;

    assert_eq!(reconciled.results.len(), 2);
    for result in &reconciled.results {
        assert_eq!(result.status, TestReconciliationState::Unknown);
        assert_eq!(
            result.source_history,
            vec![MatchEvent::DuplicateName, MatchEvent::MatchFailed]
        );
    }
    assert!(
        reconciled.messages.iter().any(|message| message
            == "runner test `scope test-1` (line 1) was not claimed by any source block"),
        "unclaimed assertion is reported: {:?}",
        reconciled.messages
    );
    Ok(())
}

#[test]
fn unknown_location_falls_back_to_name() -> Result<()> {
    let reconciled = reconcile_json(
        indoc! {r#"
            {
              "root": [
                { "type": "it", "name": "works",
                  "start": { "line": 1, "column": 0 }, "end": { "line": 2, "column": 2 } },
                { "type": "test", "name": "todo thing",
                  "start": { "line": 4, "column": 0 }, "end": { "line": 4, "column": 20 } },
                { "type": "it", "name": "also works",
                  "start": { "line": 6, "column": 0 }, "end": { "line": 7, "column": 2 } }
              ]
            }
        "#},
        indoc! {r#"
            [
              { "title": "works", "status": "KnownSuccess", "location": { "line": 1 } },
              { "title": "todo thing", "status": "KnownTodo", "location": null },
              { "title": "also works", "status": "KnownFail", "location": { "line": 6 } }
            ]
        "#},
    )?;

    assert_eq!(names(&reconciled.results), ["works", "todo thing", "also works"]);
    let [works, todo, also_works] = reconciled.results.as_slice() else {
        panic!("expected three results");
    };

    assert_eq!(works.source_history, vec![MatchEvent::MatchByContext]);
    assert_eq!(also_works.source_history, vec![MatchEvent::MatchByContext]);
    assert_eq!(also_works.status, TestReconciliationState::KnownFail);

    assert_eq!(todo.status, TestReconciliationState::KnownTodo);
    assert_eq!(todo.source_history, vec![MatchEvent::MatchByName]);
    assert_eq!(
        todo.assertion_history,
        vec![MatchEvent::InvalidLocation, MatchEvent::MatchByName]
    );
    // No location to report, so the error points at the end of the block.
    assert_eq!(todo.line_number_of_error, Some(3));
    Ok(())
}

#[test]
fn sequence_ignores_template_names() -> Result<()> {
    let reconciled = reconcile_json(
        indoc! {r#"
            {
              "root": [
                { "type": "it", "name": "adds ${a} and ${b}", "nonLiteralName": true,
                  "start": { "line": 2, "column": 0 }, "end": { "line": 4, "column": 2 } },
                { "type": "it", "name": "subtracts",
                  "start": { "line": 5, "column": 0 }, "end": { "line": 7, "column": 2 } }
              ]
            }
        "#},
        indoc! {r#"
            [
              { "title": "adds 1 and 2", "status": "KnownSuccess", "location": { "line": 2 } },
              { "title": "subtracts", "status": "KnownFail", "location": { "line": 5 } }
            ]
        "#},
    )?;

    assert_eq!(names(&reconciled.results), ["adds 1 and 2", "subtracts"]);
    assert!(
        reconciled
            .results
            .iter()
            .all(|result| result.source_history == [MatchEvent::MatchByContext])
    );
    Ok(())
}

const TEMPLATE_WITH_EXTRA_BLOCK: (&str, &str) = (
    indoc! {r#"
        {
          "root": [
            { "type": "it", "name": "adds ${x}", "nonLiteralName": true,
              "start": { "line": 2, "column": 0 }, "end": { "line": 4, "column": 2 } },
            { "type": "it", "name": "skipped by filter",
              "start": { "line": 6, "column": 0 }, "end": { "line": 7, "column": 2 } },
            { "type": "it", "name": "third",
              "start": { "line": 9, "column": 0 }, "end": { "line": 10, "column": 2 } }
          ]
        }
    "#},
    indoc! {r#"
        [
          { "title": "adds 5", "status": "KnownSuccess", "location": { "line": 3 } },
          { "title": "third", "status": "KnownSuccess", "location": { "line": 9 } }
        ]
    "#},
);

#[test]
fn template_name_matches_by_location() -> Result<()> {
    let (source, assertions) = TEMPLATE_WITH_EXTRA_BLOCK;
    let reconciled = reconcile_json(source, assertions)?;

    let statuses: Vec<_> = reconciled
        .results
        .iter()
        .map(|result| (result.name.as_str(), result.status))
        .collect();
    assert_eq!(
        statuses,
        [
            ("adds 5", TestReconciliationState::KnownSuccess),
            ("skipped by filter", TestReconciliationState::Unknown),
            ("third", TestReconciliationState::KnownSuccess),
        ]
    );
    assert!(has_event(&reconciled.results[0], MatchEvent::MatchByLocation));
    assert!(has_event(&reconciled.results[2], MatchEvent::MatchByName));
    Ok(())
}

#[test]
fn location_fallback_can_be_disabled() -> Result<()> {
    let (source, assertions) = TEMPLATE_WITH_EXTRA_BLOCK;
    let options = MatcherOptions {
        location_fallback: false,
        ..MatcherOptions::default()
    };
    let reconciled = reconcile_json_with(source, assertions, options)?;

    assert_eq!(
        reconciled.results[0].status,
        TestReconciliationState::Unknown
    );
    assert_eq!(
        reconciled.results[2].status,
        TestReconciliationState::KnownSuccess
    );
    Ok(())
}

#[test]
fn unmatched_describe_fails_whole_subtree() -> Result<()> {
    let reconciled = reconcile_json(
        indoc! {r#"
            {
              "root": [
                { "type": "describe", "name": "outer",
                  "start": { "line": 1, "column": 0 }, "end": { "line": 12, "column": 2 },
                  "children": [
                    { "type": "it", "name": "a",
                      "start": { "line": 2, "column": 2 }, "end": { "line": 3, "column": 4 } },
                    { "type": "describe", "name": "inner",
                      "start": { "line": 4, "column": 2 }, "end": { "line": 11, "column": 4 },
                      "children": [
                        { "type": "it", "name": "b",
                          "start": { "line": 5, "column": 4 }, "end": { "line": 6, "column": 6 } }
                      ] }
                  ] },
                { "type": "describe", "name": "other",
                  "start": { "line": 14, "column": 0 }, "end": { "line": 18, "column": 2 },
                  "children": [
                    { "type": "it", "name": "c",
                      "start": { "line": 15, "column": 2 }, "end": { "line": 16, "column": 4 } }
                  ] }
              ]
            }
        "#},
        indoc! {r#"
            [{ "title": "c", "ancestorTitles": ["other"], "status": "KnownSuccess",
               "location": { "line": 15 } }]
        "#},
    )?;

    assert_eq!(names(&reconciled.results), ["a", "b", "c"]);
    for result in &reconciled.results[..2] {
        assert_eq!(result.status, TestReconciliationState::Unknown);
        assert_eq!(result.source_history, vec![MatchEvent::MatchFailed]);
        assert_eq!(
            result.short_message.as_deref(),
            Some("describe block `outer`: no assertion found")
        );
    }
    assert_eq!(
        reconciled.results[2].status,
        TestReconciliationState::KnownSuccess
    );
    Ok(())
}

#[test]
fn assertion_in_other_scope_is_unclaimed() -> Result<()> {
    let source = indoc! {r#"
        {
          "root": [
            { "type": "describe", "name": "suite",
              "start": { "line": 1, "column": 0 }, "end": { "line": 9, "column": 2 },
              "children": [
                { "type": "it", "name": "first",
                  "start": { "line": 2, "column": 2 }, "end": { "line": 3, "column": 4 } },
                { "type": "it", "name": "second",
                  "start": { "line": 5, "column": 2 }, "end": { "line": 6, "column": 4 } }
              ] }
          ]
        }
    "#};
    // The runner reported a full name but lost the ancestor titles, so the assertion lands in
    // the root scope.
    let assertions = indoc! {r#"
        [{ "title": "second", "fullName": "suite second", "status": "KnownFail" }]
    "#};

    let reconciled = reconcile_json(source, assertions)?;
    assert!(
        reconciled
            .results
            .iter()
            .all(|result| result.status == TestReconciliationState::Unknown),
        "the assertion is in a different scope than the block"
    );
    assert!(
        reconciled
            .messages
            .iter()
            .any(|message| message.starts_with("runner test `suite second`")),
        "unclaimed assertion is reported: {:?}",
        reconciled.messages
    );
    Ok(())
}

#[test]
fn missing_ancestors_accept_local_name() -> Result<()> {
    let reconciled = reconcile_json(
        indoc! {r#"
            {
              "root": [
                { "type": "it", "name": "first",
                  "start": { "line": 2, "column": 0 }, "end": { "line": 3, "column": 2 } },
                { "type": "it", "name": "second",
                  "start": { "line": 5, "column": 0 }, "end": { "line": 6, "column": 2 } }
              ]
            }
        "#},
        indoc! {r#"
            [{ "title": "second", "fullName": "suite second", "status": "KnownFail",
               "location": { "line": 5 } }]
        "#},
    )?;

    let second = &reconciled.results[1];
    assert_eq!(second.name, "suite second");
    assert_eq!(second.status, TestReconciliationState::KnownFail);
    assert_eq!(second.source_history, vec![MatchEvent::MatchByName]);
    assert_eq!(
        second.assertion_history,
        vec![MatchEvent::MissingAncestorInfo, MatchEvent::MatchByName]
    );
    assert_eq!(
        reconciled.results[0].status,
        TestReconciliationState::Unknown
    );
    Ok(())
}

#[test]
fn same_line_assertions_with_different_names_match_by_name() -> Result<()> {
    let reconciled = reconcile_json(
        indoc! {r#"
            {
              "root": [
                { "type": "it", "name": "a",
                  "start": { "line": 2, "column": 0 }, "end": { "line": 3, "column": 2 } },
                { "type": "it", "name": "b",
                  "start": { "line": 5, "column": 0 }, "end": { "line": 6, "column": 2 } },
                { "type": "it", "name": "c",
                  "start": { "line": 8, "column": 0 }, "end": { "line": 9, "column": 2 } }
              ]
            }
        "#},
        // A source map collapsed both assertions onto the first block's line.
        indoc! {r#"
            [
              { "title": "a", "ancestorTitles": [], "status": "KnownFail",
                "location": { "line": 2 } },
              { "title": "b", "ancestorTitles": [], "status": "KnownSuccess",
                "location": { "line": 2 } }
            ]
        "#},
    )?;

    assert_eq!(names(&reconciled.results), ["a", "b", "c"]);
    let [a, b, c] = reconciled.results.as_slice() else {
        panic!("expected three results, found {:?}", reconciled.results);
    };

    assert_eq!(a.status, TestReconciliationState::KnownFail);
    assert_eq!(a.source_history, vec![MatchEvent::MatchByName]);
    assert!(a.multi_results.is_empty(), "`b` is not folded into `a`");

    assert_eq!(b.status, TestReconciliationState::KnownSuccess);
    assert_eq!(b.source_history, vec![MatchEvent::MatchByName]);

    assert_eq!(c.status, TestReconciliationState::Unknown);
    assert_eq!(c.source_history, vec![MatchEvent::MatchFailed]);
    Ok(())
}

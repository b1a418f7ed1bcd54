//! Property-based tests for the validator and the query primitives.
//!
//! Uses proptest to verify:
//! 1. `validate` never panics and always returns either a full draft or a
//!    non-empty violation list.
//! 2. Re-validating a draft's own field renderings is a fixed point.
//! 3. The escaped title matcher matches its own input (case-insensitively)
//!    and never lets metacharacters act as pattern syntax.
//! 4. Pagination coercion stays inside its documented bounds.

use chrono::NaiveDate;
use proptest::prelude::*;

use taskboard_core::query::{
    MAX_LIMIT, TaskSort, TitleMatch, parse_limit, parse_page, total_pages,
};
use taskboard_core::validate::{TaskInput, validate};

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 5).expect("valid date")
}

/// Strategy for arbitrary raw input: mostly junk, occasionally valid.
fn arb_raw_input() -> impl Strategy<Value = TaskInput> {
    (
        ".{0,120}",
        ".{0,120}",
        prop_oneof!["todo|inprogress|done", ".{0,16}"],
        ".{0,16}",
        ".{0,50}",
        prop_oneof![
            Just(String::new()),
            "[0-9]{4}-[0-9]{2}-[0-9]{2}",
            ".{0,20}"
        ],
    )
        .prop_map(
            |(title, details, status, priority, category, deadline)| TaskInput {
                title,
                details,
                status,
                priority,
                category,
                deadline,
            },
        )
}

/// Strategy for input that always passes validation.
fn arb_valid_input() -> impl Strategy<Value = TaskInput> {
    (
        "[a-zA-Z][a-zA-Z ]{0,80}[a-zA-Z]",
        "[a-zA-Z][a-zA-Z ]{0,200}[a-zA-Z]",
        prop_oneof![
            Just("todo".to_string()),
            Just("In Progress".to_string()),
            Just("DONE".to_string())
        ],
        ".{0,12}",
        ".{0,50}",
    )
        .prop_map(|(title, details, status, priority, category)| TaskInput {
            title,
            details,
            status,
            priority,
            category,
            deadline: String::new(),
        })
}

proptest! {
    /// Either a complete draft or at least one hard error -- never both,
    /// never neither, never a panic.
    #[test]
    fn validate_is_total_and_exclusive(input in arb_raw_input()) {
        match validate(&input, reference_date()) {
            Ok(draft) => {
                prop_assert!(!draft.title.is_empty());
                prop_assert!(!draft.category.is_empty());
            }
            Err(errors) => prop_assert!(!errors.is_empty()),
        }
    }

    /// Re-validating a draft's own renderings yields the same draft.
    #[test]
    fn validate_is_idempotent(input in arb_valid_input()) {
        let first = validate(&input, reference_date()).expect("strategy produces valid input");

        let rendered = TaskInput {
            title: first.title.clone(),
            details: first.details.clone(),
            status: first.status.as_str().to_string(),
            priority: first.priority.as_str().to_string(),
            category: first.category.clone(),
            deadline: first.deadline.map(|d| d.to_rfc3339()).unwrap_or_default(),
        };
        let second = validate(&rendered, reference_date()).expect("draft must re-validate");
        prop_assert_eq!(first, second);
    }

    /// The escaped matcher always matches its own input, in any ASCII case.
    #[test]
    fn title_match_accepts_itself(raw in "[ -~]{0,60}") {
        let matcher = TitleMatch::new(&raw).expect("escaped pattern must compile");
        prop_assert!(matcher.matches(&raw));
        prop_assert!(matcher.matches(&raw.to_uppercase()));
        prop_assert!(matcher.matches(&raw.to_lowercase()));
    }

    /// Anchoring: the match is full-string, so any proper superstring of a
    /// non-empty input must not match.
    #[test]
    fn title_match_rejects_superstrings(raw in "[ -~]{1,60}") {
        let matcher = TitleMatch::new(&raw).expect("escaped pattern must compile");
        let suffixed = format!("{raw}x");
        let prefixed = format!("x{raw}");
        prop_assert!(!matcher.matches(&suffixed));
        prop_assert!(!matcher.matches(&prefixed));
    }

    /// Metacharacters are inert: a filter of "." only matches ".".
    #[test]
    fn title_match_metacharacters_are_literal(pad in "[a-z]{1,10}") {
        let matcher = TitleMatch::new(".*").expect("escaped pattern must compile");
        prop_assert!(!matcher.matches(&pad));
        prop_assert!(matcher.matches(".*"));
    }

    /// Coerced limit always lands inside [1, MAX_LIMIT].
    #[test]
    fn limit_is_always_bounded(raw in ".{0,12}") {
        let limit = parse_limit(Some(&raw));
        prop_assert!(limit >= 1);
        prop_assert!(limit <= MAX_LIMIT);
    }

    /// Coerced page is always positive.
    #[test]
    fn page_is_always_positive(raw in ".{0,12}") {
        prop_assert!(parse_page(Some(&raw)) >= 1);
    }

    /// `total_pages` is the minimal page count covering `total` items.
    #[test]
    fn total_pages_covers_exactly(total in 0u64..10_000, limit in 1u64..=MAX_LIMIT) {
        let pages = total_pages(total, limit);
        prop_assert!(pages >= 1);
        prop_assert!(pages * limit >= total);
        if total > limit {
            prop_assert!((pages - 1) * limit < total);
        }
    }

    /// Sort parsing is total: arbitrary parameters fall back to the default
    /// rather than erroring.
    #[test]
    fn sort_parse_is_total(raw in ".{0,24}") {
        let _ = TaskSort::parse(Some(&raw));
    }
}

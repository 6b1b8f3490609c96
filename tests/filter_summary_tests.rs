//! Filter and summary state tests
//!
//! Committed selections, aggregate groupings and their rebuild on every
//! commit or dataset change.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use gridview::filter::{aggregate, Commit, FilterSummaryState};
use gridview::popover::PopoverKind;
use gridview::render::{LayerId, ShapeKind};
use gridview::{GridError, GridEvent, SummaryRule};
use test_case::test_case;

#[test_case(SummaryRule::Count, 3, Some("Count: 8") ; "count")]
#[test_case(SummaryRule::Sum, 3, Some("Sum: 28") ; "sum")]
#[test_case(SummaryRule::Average, 3, Some("Average: 3.5") ; "average")]
#[test_case(SummaryRule::Min, 3, Some("Min: 0") ; "min")]
#[test_case(SummaryRule::Max, 3, Some("Max: 7") ; "max")]
#[test_case(SummaryRule::Sum, 4, Some("Sum: 70") ; "fractional column sum")]
#[test_case(SummaryRule::Distinct, 1, Some("Distinct: 4") ; "distinct text")]
#[test_case(SummaryRule::Sum, 1, Some("Sum: 0") ; "sum of text column")]
#[test_case(SummaryRule::Max, 1, None ; "max of text column")]
#[test_case(SummaryRule::None, 3, None ; "no rule")]
fn test_aggregates_over_eight_rows(rule: SummaryRule, col: usize, expected: Option<&str>) {
    let dataset = common::sales_dataset(8);
    assert_eq!(aggregate(rule, &dataset, col).as_deref(), expected);
}

#[test]
fn test_commit_rebuilds_groupings() {
    let dataset = common::sales_dataset(8);
    let mut state = FilterSummaryState::new();
    let before = state.rebuilds();

    let event = state
        .apply(
            Commit::Summary {
                column_key: "units".into(),
                rule: SummaryRule::Sum,
            },
            &dataset,
        )
        .unwrap();
    assert_eq!(
        event,
        GridEvent::SummaryChange {
            column_key: "units".into(),
            rule: SummaryRule::Sum,
        }
    );
    assert_eq!(state.rebuilds(), before + 1);
    assert_eq!(state.grouping("units"), Some("Sum: 28"));

    // A filter commit also rebuilds, and never leaves a stale grouping behind
    state
        .apply(
            Commit::Filter {
                column_key: "region".into(),
                selected_values: vec!["North".into()],
            },
            &dataset,
        )
        .unwrap();
    assert_eq!(state.rebuilds(), before + 2);
    assert_eq!(state.grouping("units"), Some("Sum: 28"));
    assert_eq!(state.selected_values("region"), ["North".to_string()]);
}

#[test]
fn test_none_rule_and_empty_filter_clear_the_column() {
    let dataset = common::sales_dataset(8);
    let mut state = FilterSummaryState::new();
    let commits = [
        Commit::Summary {
            column_key: "units".into(),
            rule: SummaryRule::Max,
        },
        Commit::Filter {
            column_key: "region".into(),
            selected_values: vec!["East".into()],
        },
        Commit::Summary {
            column_key: "units".into(),
            rule: SummaryRule::None,
        },
        Commit::Filter {
            column_key: "region".into(),
            selected_values: Vec::new(),
        },
    ];
    for commit in commits {
        state.apply(commit, &dataset).unwrap();
    }
    assert_eq!(state.grouping("units"), None);
    assert_eq!(state.grouping_count(), 0);
    assert!(!state.is_filtered("region"));
    assert_eq!(state.rule("units"), SummaryRule::None);
}

#[test]
fn test_unknown_column_is_rejected_without_changes() {
    let dataset = common::sales_dataset(8);
    let mut state = FilterSummaryState::new();
    let err = state
        .apply(
            Commit::Summary {
                column_key: "missing".into(),
                rule: SummaryRule::Sum,
            },
            &dataset,
        )
        .unwrap_err();
    assert!(matches!(err, GridError::UnknownColumn(ref key) if key == "missing"));
    assert_eq!(state.rebuilds(), 0);
}

#[test]
fn test_summary_commit_through_the_grid_paints_the_summary_row() {
    let mut grid = common::grid(8);
    grid.open_summary_popover(3, 500.0, 500.0).unwrap();
    assert!(grid.set_summary_rule(SummaryRule::Sum).unwrap());
    let event = grid.commit_popover(PopoverKind::Summary).unwrap().unwrap();
    assert!(matches!(event, GridEvent::SummaryChange { rule: SummaryRule::Sum, .. }));

    let texts: Vec<String> = grid
        .scene_snapshot()
        .into_iter()
        .filter(|s| s.layer == LayerId::SummaryCenter && s.kind == ShapeKind::Text)
        .map(|s| s.text)
        .filter(|t| !t.is_empty())
        .collect();
    assert_eq!(texts, vec!["Sum: 28".to_string()]);
    assert!(grid.dirty_layers().contains(LayerId::SummaryCenter));
}

#[test]
fn test_filter_commit_does_not_touch_rows() {
    let mut grid = common::grid(8);
    grid.open_filter_popover(1, 10.0, 10.0).unwrap();
    grid.toggle_filter_value("North").unwrap();
    grid.commit_popover(PopoverKind::Filter).unwrap();

    assert!(grid.filters().is_filtered("region"));
    assert_eq!(grid.dataset().row_count(), 8);
    assert_eq!(grid.viewport().visible_row_end, 8);
}

#[test]
fn test_filtered_header_keeps_its_glyph() {
    let mut grid = common::grid(8);
    let header = |grid: &gridview::Grid| {
        grid.scene_snapshot()
            .into_iter()
            .find(|s| s.layer == LayerId::HeaderCenter && s.kind == ShapeKind::Text)
            .map(|s| s.text)
            .unwrap()
    };
    assert_eq!(header(&grid), "Region \u{2261}");
    grid.open_filter_popover(1, 10.0, 10.0).unwrap();
    grid.toggle_filter_value("North").unwrap();
    grid.commit_popover(PopoverKind::Filter).unwrap();
    assert!(header(&grid).starts_with("Region"));
}

#[test]
fn test_rules_survive_a_dataset_swap() {
    let mut grid = common::grid(8);
    grid.open_summary_popover(3, 500.0, 500.0).unwrap();
    grid.set_summary_rule(SummaryRule::Sum).unwrap();
    grid.commit_popover(PopoverKind::Summary).unwrap();
    assert_eq!(grid.filters().grouping("units"), Some("Sum: 28"));

    grid.set_dataset(common::sales_dataset(4)).unwrap();
    assert_eq!(grid.filters().rule("units"), SummaryRule::Sum);
    assert_eq!(grid.filters().grouping("units"), Some("Sum: 6"));
}

#[test]
fn test_hidden_summary_row_paints_nothing() {
    let config = gridview::GridConfig {
        show_summary: false,
        ..gridview::GridConfig::default()
    };
    let grid = common::grid_with(8, config);
    let summary_shapes = grid
        .scene_snapshot()
        .into_iter()
        .filter(|s| s.layer == LayerId::SummaryCenter)
        .count();
    assert_eq!(summary_shapes, 0);
    assert_eq!(grid.viewport().frame().body_height, 564.0);
}

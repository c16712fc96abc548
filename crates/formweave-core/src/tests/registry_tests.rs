use super::*;
use crate::test_support::probe;
use crate::unknown::UNKNOWN_RENDERER_TEXT;
use crate::view::View;
use crate::widget::Widget;
use serde_json::json;

fn age_schema() -> JsonSchema {
    JsonSchema::new(json!({"type": "number"}))
}

fn age_control() -> UiSchema {
    UiSchema::control("#/properties/age")
}

fn fixed(rank: Rank, name: &'static str) -> RendererEntry {
    RendererEntry::new(move |_, _, _| Ok(rank), probe(name).0)
}

fn resolve(registry: &RendererRegistry) -> WidgetKind {
    registry
        .resolve(&age_control(), &age_schema(), &TesterContext::default())
        .kind()
}

#[test]
fn single_matching_entry_wins() {
    let registry = RendererRegistry::new().with(fixed(1, "a"));
    assert_eq!(resolve(&registry), WidgetKind::Control("a"));
}

#[test]
fn negative_scores_fall_back_to_unknown() {
    let registry = RendererRegistry::new()
        .with(fixed(NOT_APPLICABLE, "a"))
        .with(fixed(-7, "b"));
    assert_eq!(resolve(&registry), WidgetKind::Unknown);
}

#[test]
fn empty_registry_resolves_to_unknown() {
    assert_eq!(resolve(&RendererRegistry::new()), WidgetKind::Unknown);
}

#[test]
fn highest_score_wins_regardless_of_position() {
    let registry = RendererRegistry::new()
        .with(fixed(1, "low"))
        .with(fixed(5, "high"))
        .with(fixed(3, "mid"));
    assert_eq!(resolve(&registry), WidgetKind::Control("high"));
}

#[test]
fn ties_keep_the_first_registered_entry() {
    let registry = RendererRegistry::new()
        .with(fixed(2, "first"))
        .with(fixed(2, "second"));
    assert_eq!(resolve(&registry), WidgetKind::Control("first"));
    assert_eq!(
        registry.best_match(&age_control(), &age_schema(), &TesterContext::default()),
        Some(0)
    );
}

#[test]
fn faulting_tester_counts_as_not_applicable() {
    let faulty = RendererEntry::new(
        |_, _, _| Err(TesterError::new("boom")),
        probe("faulty").0,
    );
    let registry = RendererRegistry::new().with(faulty).with(fixed(0, "fallback"));
    assert_eq!(
        registry.scores(&age_control(), &age_schema(), &TesterContext::default()),
        vec![NOT_APPLICABLE, 0]
    );
    assert_eq!(resolve(&registry), WidgetKind::Control("fallback"));

    let only_faulty = RendererRegistry::new().with(RendererEntry::new(
        |_, _, _| Err(TesterError::new("boom")),
        probe("faulty").0,
    ));
    assert_eq!(resolve(&only_faulty), WidgetKind::Unknown);
}

#[test]
fn testers_see_the_context() {
    let registry = RendererRegistry::new().with(RendererEntry::new(
        |_, _, context| Ok(if context.config["special"] == json!(true) { 4 } else { -1 }),
        probe("special").0,
    ));
    let context = TesterContext {
        root_schema: None,
        config: json!({"special": true}),
    };
    assert_eq!(
        registry.resolve(&age_control(), &age_schema(), &context).kind(),
        WidgetKind::Control("special")
    );
    assert_eq!(resolve(&registry), WidgetKind::Unknown);
}

#[test]
fn unknown_widget_shows_placeholder_once_mounted() {
    let mut widget = UnknownWidget::new();
    assert_eq!(widget.view(), View::Empty);
    widget.mount();
    assert_eq!(widget.view(), View::Placeholder(UNKNOWN_RENDERER_TEXT.to_owned()));
}

use super::*;
use std::rc::Rc;

use formweave_core::{
    Condition, EditError, LayoutKind, RendererRegistry, Rule, RuleEffect, ShrinkPolicy, UiSchema,
    WidgetKind, UNKNOWN_RENDERER_TEXT,
};
use formweave_testing::{form_state, with_core, FormsTestRule};
use serde_json::{json, Value};

fn person_schema() -> Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"type": "string"},
            "email": {"type": "string", "format": "email"},
            "age": {"type": "integer"},
            "height": {"type": "number"},
            "active": {"type": "boolean"},
            "tags": {"type": "array", "items": {"type": "string"}}
        }
    })
}

fn person_data() -> Value {
    json!({"name": "Ada", "email": "ada@example.com", "age": 36, "height": 1.7, "active": true})
}

#[test]
fn vertical_layout_renders_typed_inputs() {
    let rule = FormsTestRule::new();
    let uischema = UiSchema::vertical([
        UiSchema::control("#/properties/name"),
        UiSchema::control("#/properties/age"),
        UiSchema::control("#/properties/active"),
    ]);
    let root = rule.mount(form_state(
        vanilla_renderers(),
        person_data(),
        person_schema(),
        uischema,
    ));

    assert_eq!(root.widget_kind(), Some(WidgetKind::Layout(LayoutKind::Vertical)));
    assert_eq!(
        HeadlessRenderer::new(&root).dump(),
        "<column>\n  <input type=text> Name* = \"Ada\"\n  <input type=number> Age = \"36\"\n  \
         <input type=checkbox> Active = \"true\"\n"
    );
    let kinds: Vec<_> = root.children().iter().map(|child| child.widget_kind()).collect();
    assert_eq!(
        kinds,
        vec![
            Some(WidgetKind::Control("text")),
            Some(WidgetKind::Control("integer")),
            Some(WidgetKind::Control("boolean")),
        ]
    );
}

#[test]
fn groups_and_rows_nest() {
    let rule = FormsTestRule::new();
    let uischema = UiSchema::group(
        "Person",
        [UiSchema::horizontal([
            UiSchema::control("#/properties/height"),
            UiSchema::label("metres"),
        ])],
    );
    let root = rule.mount(form_state(
        vanilla_renderers(),
        person_data(),
        person_schema(),
        uischema,
    ));
    assert_eq!(
        HeadlessRenderer::new(&root).dump(),
        "<column> Person\n  <row>\n    <input type=number> Height = \"1.7\"\n    <label> metres\n"
    );
}

#[test]
fn text_input_type_follows_format() {
    let rule = FormsTestRule::new();
    let uischema = UiSchema::vertical([
        UiSchema::control("#/properties/email"),
        UiSchema::control("#/properties/name").with_option("format", json!("password")),
    ]);
    let root = rule.mount(form_state(
        vanilla_renderers(),
        person_data(),
        person_schema(),
        uischema,
    ));
    let types: Vec<String> = HeadlessRenderer::new(&root)
        .inputs()
        .into_iter()
        .map(|input| input.input_type)
        .collect();
    assert_eq!(types, vec!["email", "password"]);
}

#[test]
fn unmatched_controls_show_the_unknown_placeholder() {
    let rule = FormsTestRule::new();
    let uischema = UiSchema::vertical([UiSchema::control("#/properties/tags")]);
    let root = rule.mount(form_state(
        vanilla_renderers(),
        person_data(),
        person_schema(),
        uischema,
    ));
    assert_eq!(
        HeadlessRenderer::new(&root).dump(),
        format!("<column>\n  <placeholder> {UNKNOWN_RENDERER_TEXT}\n")
    );
}

#[test]
fn edits_emit_reduced_state_and_only_the_edited_control_updates() {
    let rule = FormsTestRule::new();
    let uischema = UiSchema::vertical([
        UiSchema::control("#/properties/name"),
        UiSchema::control("#/properties/age"),
    ]);
    let state = form_state(vanilla_renderers(), person_data(), person_schema(), uischema);
    let root = rule.mount(state.clone());

    let name = root.find_control("#/properties/name").expect("name control");
    name.submit_edit(json!("Grace")).expect("edit accepted");
    let changes = rule.context().events.drain();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].origin, name.id());
    assert_eq!(changes[0].core.data["name"], json!("Grace"));
    assert!(rule.context().events.is_empty());

    let age = root.find_control("#/properties/age").expect("age control");
    let age_pushes = age.stats().pushes;
    root.set_state(with_core(&state, changes[0].core.clone()));
    rule.settle();

    assert_eq!(age.stats().pushes, age_pushes);
    assert!(HeadlessRenderer::new(&root).dump().contains("Name* = \"Grace\""));
}

#[test]
fn numeric_edits_are_coerced() {
    let rule = FormsTestRule::new();
    let uischema = UiSchema::vertical([UiSchema::control("#/properties/age")]);
    let root = rule.mount(form_state(
        vanilla_renderers(),
        person_data(),
        person_schema(),
        uischema,
    ));
    let age = root.find_control("#/properties/age").expect("age control");

    age.submit_edit(json!("41")).expect("edit accepted");
    let changes = rule.context().events.drain();
    assert_eq!(changes[0].core.data["age"], json!(41));

    assert!(matches!(
        age.submit_edit(json!("forty")),
        Err(EditError::Rejected { .. })
    ));
    assert!(rule.context().events.is_empty());
}

#[test]
fn readonly_forms_reject_edits() {
    let rule = FormsTestRule::new();
    let uischema = UiSchema::vertical([UiSchema::control("#/properties/name")]);
    let state = form_state(vanilla_renderers(), person_data(), person_schema(), uischema);
    let readonly = Rc::new((*state).clone().with_readonly(true));
    let root = rule.mount(readonly);

    assert!(HeadlessRenderer::new(&root).dump().contains("disabled"));
    let name = root.find_control("#/properties/name").expect("name control");
    assert!(matches!(
        name.submit_edit(json!("Grace")),
        Err(EditError::Rejected { .. })
    ));
}

#[test]
fn hidden_controls_render_nothing() {
    let rule = FormsTestRule::new();
    let hidden = UiSchema::control("#/properties/email").with_rule(Rule {
        effect: RuleEffect::Hide,
        condition: Condition::Leaf {
            scope: "#/properties/active".into(),
            expected: json!(true),
        },
    });
    let uischema = UiSchema::vertical([UiSchema::control("#/properties/name"), hidden]);
    let root = rule.mount(form_state(
        vanilla_renderers(),
        person_data(),
        person_schema(),
        uischema,
    ));
    assert_eq!(HeadlessRenderer::new(&root).inputs().len(), 1);
}

#[test]
fn required_asterisk_can_be_hidden() {
    let rule = FormsTestRule::new();
    let uischema = UiSchema::vertical([UiSchema::control("#/properties/name")
        .with_option("hideRequiredAsterisk", json!(true))]);
    let root = rule.mount(form_state(
        vanilla_renderers(),
        person_data(),
        person_schema(),
        uischema,
    ));
    assert!(HeadlessRenderer::new(&root).dump().contains("Name = \"Ada\""));
}

#[test]
fn control_ids_are_unique_and_released_on_dispose() {
    let rule = FormsTestRule::new();
    let uischema = UiSchema::vertical([
        UiSchema::control("#/properties/name"),
        UiSchema::control("#/properties/name"),
    ]);
    let root = rule.mount(form_state(
        vanilla_renderers(),
        person_data(),
        person_schema(),
        uischema,
    ));
    let ids: Vec<Option<String>> = HeadlessRenderer::new(&root)
        .inputs()
        .into_iter()
        .map(|input| input.id)
        .collect();
    assert_eq!(
        ids,
        vec![
            Some("#/properties/name".to_owned()),
            Some("#/properties/name2".to_owned())
        ]
    );

    root.dispose();
    assert!(rule.context().ids.is_empty());
}

#[test]
fn shrinking_layouts_dispose_surplus_children() {
    let rule = FormsTestRule::new();
    let wide = UiSchema::vertical([
        UiSchema::control("#/properties/name"),
        UiSchema::control("#/properties/age"),
        UiSchema::control("#/properties/active"),
    ]);
    let state = form_state(vanilla_renderers(), person_data(), person_schema(), wide);
    let root = rule.mount(state.clone());
    let first = root.children()[0].clone();
    assert_eq!(root.children().len(), 3);

    let mut narrow = (*state).clone();
    narrow.core.uischema = Some(Rc::new(UiSchema::vertical([
        UiSchema::control("#/properties/name"),
        UiSchema::control("#/properties/age"),
    ])));
    root.set_state(Rc::new(narrow));
    rule.settle();

    let children = root.children();
    assert_eq!(children.len(), 2);
    assert!(children[0].ptr_eq(&first));
    assert_eq!(rule.context().ids.len(), 2);
}

#[test]
fn retained_children_are_out_of_reach() {
    let rule = FormsTestRule::new();
    let registry = RendererRegistry::new()
        .with(layout_entry(LayoutKind::Vertical, ShrinkPolicy::Retain))
        .with(text_control_entry())
        .with(integer_control_entry());
    let wide = UiSchema::vertical([
        UiSchema::control("#/properties/name"),
        UiSchema::control("#/properties/age"),
    ]);
    let state = form_state(registry, person_data(), person_schema(), wide);
    let root = rule.mount(state.clone());
    assert!(root.find_control("#/properties/age").is_some());

    let mut narrow = (*state).clone();
    narrow.core.uischema = Some(Rc::new(UiSchema::vertical([UiSchema::control(
        "#/properties/name",
    )])));
    root.set_state(Rc::new(narrow));
    rule.settle();

    assert_eq!(root.children().len(), 1);
    assert!(root.find_control("#/properties/age").is_none());
    assert_eq!(HeadlessRenderer::new(&root).inputs().len(), 1);
    assert_eq!(rule.context().ids.len(), 2);
}

#[test]
fn format_tree_lists_kinds_and_paths() {
    let rule = FormsTestRule::new();
    let uischema = UiSchema::vertical([UiSchema::control("#/properties/name")]);
    let root = rule.mount(form_state(
        vanilla_renderers(),
        person_data(),
        person_schema(),
        uischema,
    ));
    let tree = format_tree(&root);
    let lines: Vec<&str> = tree.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("VerticalLayout"));
    assert!(lines[1].starts_with("  #"));
    assert!(lines[1].ends_with("Control(text) @name"));
}

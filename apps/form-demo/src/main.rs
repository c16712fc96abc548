use anyhow::{Context, Result};
use formweave_app_shell::JsonForms;
use formweave_core::{Condition, JsonSchema, Rule, RuleEffect, UiSchema};
use formweave_runtime_std::StdRuntime;
use formweave_ui::format_tree;
use serde_json::json;

fn person_schema() -> JsonSchema {
    JsonSchema::new(json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"type": "string", "maxLength": 20},
            "email": {"type": "string", "format": "email"},
            "age": {"type": "integer"},
            "newsletter": {"type": "boolean"}
        }
    }))
}

fn person_layout() -> UiSchema {
    let email = UiSchema::control("#/properties/email").with_rule(Rule {
        effect: RuleEffect::Show,
        condition: Condition::Leaf {
            scope: "#/properties/newsletter".into(),
            expected: json!(true),
        },
    });
    UiSchema::group(
        "Person",
        [
            UiSchema::horizontal([
                UiSchema::control("#/properties/name"),
                UiSchema::control("#/properties/age"),
            ]),
            UiSchema::control("#/properties/newsletter"),
            email,
            UiSchema::label("Fields marked * are required."),
        ],
    )
}

fn main() -> Result<()> {
    env_logger::init();

    println!("=== formweave headless form demo ===");
    let runtime = StdRuntime::new();
    let forms = JsonForms::with_runtime(&runtime);
    forms.on_change(|event| {
        println!("change: {}", event.data);
    });
    forms.set_data(json!({"name": "Ada Lovelace", "age": 36, "newsletter": false}));
    forms.set_schema(Some(person_schema()));
    forms.set_uischema(Some(person_layout()));
    forms.connect().context("connecting the form")?;
    runtime.run_until_idle();
    println!("\n{}", forms.dump());

    println!("-- subscribing to the newsletter --");
    forms
        .edit("#/properties/newsletter", json!(true))
        .context("editing newsletter")?;
    forms.process_events();
    runtime.run_until_idle();
    println!("\n{}", forms.dump());

    println!("-- node tree --");
    print!("{}", format_tree(forms.root()));
    Ok(())
}

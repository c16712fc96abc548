use formweave_core::{ControlLabel, JsonSchema, UiSchema};

/// `firstName`, `first_name` and `first-name` all become `First Name`.
pub fn start_case(input: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous: Option<char> = None;
    for ch in input.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous = None;
            continue;
        }
        let boundary = match previous {
            Some(prev) => {
                (prev.is_lowercase() && ch.is_uppercase())
                    || (prev.is_alphabetic() && ch.is_ascii_digit())
                    || (prev.is_ascii_digit() && ch.is_alphabetic())
            }
            None => false,
        };
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
        previous = Some(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label a control shows before translation: an explicit text, nothing
/// when hidden, else the schema title, else the property name in start case.
pub fn default_label(uischema: &UiSchema, control_schema: Option<&JsonSchema>) -> String {
    let UiSchema::Control(control) = uischema else {
        return String::new();
    };
    match &control.label {
        Some(ControlLabel::Text(text)) => return text.clone(),
        Some(ControlLabel::Show(false)) => return String::new(),
        Some(ControlLabel::Show(true)) | None => {}
    }
    if let Some(title) = control_schema.and_then(JsonSchema::title) {
        return title.to_owned();
    }
    let property = control.scope.rsplit('/').next().unwrap_or_default();
    start_case(property)
}

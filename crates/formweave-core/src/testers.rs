//! Tester combinators.
//!
//! A [`Tester`] answers yes or no for an element; [`rank_with`] turns it into
//! a [`RankedTester`] for the registry.

use std::rc::Rc;

use serde_json::Value;

use crate::equality::deep_equal;
use crate::error::TesterError;
use crate::registry::{Rank, RankedTester, TesterContext, NOT_APPLICABLE};
use crate::schema::JsonSchema;
use crate::uischema::UiSchema;

pub type Tester = Rc<dyn Fn(&UiSchema, &JsonSchema, &TesterContext) -> Result<bool, TesterError>>;

pub fn tester(
    f: impl Fn(&UiSchema, &JsonSchema, &TesterContext) -> Result<bool, TesterError> + 'static,
) -> Tester {
    Rc::new(f)
}

fn ranked(
    f: impl Fn(&UiSchema, &JsonSchema, &TesterContext) -> Result<Rank, TesterError> + 'static,
) -> RankedTester {
    Rc::new(f)
}

pub fn rank_with(rank: Rank, inner: Tester) -> RankedTester {
    ranked(move |uischema, schema, context| {
        Ok(if inner(uischema, schema, context)? {
            rank
        } else {
            NOT_APPLICABLE
        })
    })
}

pub fn ui_type_is(type_name: &'static str) -> Tester {
    tester(move |uischema, _, _| Ok(uischema.type_name() == type_name))
}

pub fn is_control() -> Tester {
    tester(|uischema, _, _| Ok(uischema.is_control()))
}

pub fn is_layout() -> Tester {
    tester(|uischema, _, _| Ok(uischema.is_layout()))
}

/// Matches controls whose scope resolves to a sub-schema satisfying
/// `predicate`. Scopes that do not resolve do not match.
pub fn schema_matches(
    predicate: impl Fn(&JsonSchema, Option<&JsonSchema>) -> bool + 'static,
) -> Tester {
    tester(move |uischema, schema, context| {
        let Some(scope) = uischema.scope() else {
            return Ok(false);
        };
        if scope.is_empty() {
            return Ok(false);
        }
        if !scope.starts_with('#') {
            return Err(TesterError::new(format!("scope `{scope}` is not a schema pointer")));
        }
        let root = context.root_schema.as_ref();
        Ok(schema
            .resolve_scope(root, scope)
            .is_some_and(|resolved| predicate(&resolved, root)))
    })
}

pub fn schema_type_is(type_name: &'static str) -> Tester {
    schema_matches(move |schema, _| schema.has_type(type_name))
}

pub fn format_is(format: &'static str) -> Tester {
    schema_matches(move |schema, _| schema.format() == Some(format))
}

pub fn option_is(key: &'static str, expected: Value) -> Tester {
    tester(move |uischema, _, _| {
        Ok(uischema
            .option(key)
            .is_some_and(|value| deep_equal(value, &expected)))
    })
}

pub fn scope_ends_with(suffix: &'static str) -> Tester {
    tester(move |uischema, _, _| Ok(uischema.scope().is_some_and(|scope| scope.ends_with(suffix))))
}

pub fn and(testers: impl IntoIterator<Item = Tester>) -> Tester {
    let testers: Vec<Tester> = testers.into_iter().collect();
    tester(move |uischema, schema, context| {
        for each in &testers {
            if !each(uischema, schema, context)? {
                return Ok(false);
            }
        }
        Ok(true)
    })
}

pub fn or(testers: impl IntoIterator<Item = Tester>) -> Tester {
    let testers: Vec<Tester> = testers.into_iter().collect();
    tester(move |uischema, schema, context| {
        for each in &testers {
            if each(uischema, schema, context)? {
                return Ok(true);
            }
        }
        Ok(false)
    })
}

pub fn not(inner: Tester) -> Tester {
    tester(move |uischema, schema, context| Ok(!inner(uischema, schema, context)?))
}

pub fn is_string_control() -> Tester {
    and([is_control(), schema_type_is("string")])
}

pub fn is_number_control() -> Tester {
    and([is_control(), schema_type_is("number")])
}

pub fn is_integer_control() -> Tester {
    and([is_control(), schema_type_is("integer")])
}

pub fn is_boolean_control() -> Tester {
    and([is_control(), schema_type_is("boolean")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> JsonSchema {
        JsonSchema::new(json!({
            "type": "object",
            "properties": {
                "email": {"type": "string", "format": "email"},
                "age": {"type": "integer"},
                "subscribed": {"type": "boolean"}
            }
        }))
    }

    fn rank(tester: &RankedTester, uischema: &UiSchema) -> Result<Rank, TesterError> {
        tester(uischema, &schema(), &TesterContext::default())
    }

    #[test]
    fn rank_with_maps_misses_to_not_applicable() {
        let tester = rank_with(3, is_string_control());
        assert_eq!(rank(&tester, &UiSchema::control("#/properties/email")), Ok(3));
        assert_eq!(rank(&tester, &UiSchema::control("#/properties/age")), Ok(NOT_APPLICABLE));
        assert_eq!(rank(&tester, &UiSchema::vertical([])), Ok(NOT_APPLICABLE));
    }

    #[test]
    fn schema_predicates_resolve_the_scope() {
        let email = UiSchema::control("#/properties/email");
        assert_eq!(rank(&rank_with(2, format_is("email")), &email), Ok(2));
        let age = UiSchema::control("#/properties/age");
        assert_eq!(rank(&rank_with(2, is_integer_control()), &age), Ok(2));
        assert_eq!(rank(&rank_with(2, is_boolean_control()), &email), Ok(NOT_APPLICABLE));
        let missing = UiSchema::control("#/properties/missing");
        assert_eq!(
            rank(&rank_with(2, schema_type_is("string")), &missing),
            Ok(NOT_APPLICABLE)
        );
    }

    #[test]
    fn malformed_scope_is_a_fault() {
        let tester = rank_with(1, is_string_control());
        assert!(rank(&tester, &UiSchema::control("properties/email")).is_err());
    }

    #[test]
    fn combinators_compose() {
        let multiline = UiSchema::control("#/properties/email").with_option("multi", json!(true));
        let tester = rank_with(5, and([is_string_control(), option_is("multi", json!(true))]));
        assert_eq!(rank(&tester, &multiline), Ok(5));
        assert_eq!(rank(&tester, &UiSchema::control("#/properties/email")), Ok(NOT_APPLICABLE));

        let either = rank_with(1, or([ui_type_is("VerticalLayout"), scope_ends_with("age")]));
        assert_eq!(rank(&either, &UiSchema::vertical([])), Ok(1));
        assert_eq!(rank(&either, &UiSchema::control("#/properties/age")), Ok(1));
        assert_eq!(
            rank(&rank_with(1, not(is_layout())), &UiSchema::horizontal([])),
            Ok(NOT_APPLICABLE)
        );
    }
}

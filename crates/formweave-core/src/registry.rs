//! Ranked renderer registry and resolution.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::TesterError;
use crate::schema::JsonSchema;
use crate::uischema::{LayoutKind, UiSchema};
use crate::unknown::UnknownWidget;
use crate::widget::{NodeContext, Widget};

pub type Rank = i32;

/// Score meaning "cannot render this element". Any negative rank is treated
/// the same way.
pub const NOT_APPLICABLE: Rank = -1;

#[derive(Debug, Clone, Default)]
pub struct TesterContext {
    pub root_schema: Option<JsonSchema>,
    pub config: Value,
}

pub type RankedTester =
    Rc<dyn Fn(&UiSchema, &JsonSchema, &TesterContext) -> Result<Rank, TesterError>>;

/// Identifies the widget implementation a factory produces. Dispatch nodes
/// remount only when the resolved kind changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Unknown,
    Dispatch,
    Layout(LayoutKind),
    Label,
    Control(&'static str),
    Custom(&'static str),
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetKind::Unknown => f.write_str("Unknown"),
            WidgetKind::Dispatch => f.write_str("Dispatch"),
            WidgetKind::Layout(kind) => f.write_str(kind.type_name()),
            WidgetKind::Label => f.write_str("Label"),
            WidgetKind::Control(name) => write!(f, "Control({name})"),
            WidgetKind::Custom(name) => f.write_str(name),
        }
    }
}

type BuildFn = Rc<dyn Fn(&NodeContext) -> Box<dyn Widget>>;

#[derive(Clone)]
pub struct WidgetFactory {
    kind: WidgetKind,
    build: BuildFn,
}

impl WidgetFactory {
    pub fn new(
        kind: WidgetKind,
        build: impl Fn(&NodeContext) -> Box<dyn Widget> + 'static,
    ) -> Self {
        Self {
            kind,
            build: Rc::new(build),
        }
    }

    /// Factory for the placeholder shown when nothing matches.
    pub fn unknown() -> Self {
        Self::new(WidgetKind::Unknown, |_| Box::new(UnknownWidget::new()))
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn build(&self, context: &NodeContext) -> Box<dyn Widget> {
        (self.build)(context)
    }
}

impl PartialEq for WidgetFactory {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Debug for WidgetFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WidgetFactory").field(&self.kind).finish()
    }
}

#[derive(Clone)]
pub struct RendererEntry {
    pub tester: RankedTester,
    pub factory: WidgetFactory,
}

impl RendererEntry {
    pub fn new(
        tester: impl Fn(&UiSchema, &JsonSchema, &TesterContext) -> Result<Rank, TesterError>
            + 'static,
        factory: WidgetFactory,
    ) -> Self {
        Self {
            tester: Rc::new(tester),
            factory,
        }
    }

    /// Runs the tester, turning a fault into [`NOT_APPLICABLE`].
    pub fn score(&self, uischema: &UiSchema, schema: &JsonSchema, context: &TesterContext) -> Rank {
        match (self.tester)(uischema, schema, context) {
            Ok(rank) => rank,
            Err(err) => {
                log::warn!(
                    "tester for {} failed on `{}` element: {err}",
                    self.factory.kind(),
                    uischema.type_name()
                );
                NOT_APPLICABLE
            }
        }
    }
}

impl fmt::Debug for RendererEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererEntry")
            .field("factory", &self.factory)
            .finish_non_exhaustive()
    }
}

/// Ordered list of renderer candidates. Registration order breaks ties.
#[derive(Clone, Default)]
pub struct RendererRegistry {
    entries: Vec<RendererEntry>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: RendererEntry) {
        self.entries.push(entry);
    }

    pub fn with(mut self, entry: RendererEntry) -> Self {
        self.register(entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RendererEntry] {
        &self.entries
    }

    pub fn scores(
        &self,
        uischema: &UiSchema,
        schema: &JsonSchema,
        context: &TesterContext,
    ) -> Vec<Rank> {
        self.entries
            .iter()
            .map(|entry| entry.score(uischema, schema, context))
            .collect()
    }

    /// Index of the highest scoring entry, the earliest one on ties.
    /// Scores are not filtered here; a winner may still be negative.
    pub fn best_match(
        &self,
        uischema: &UiSchema,
        schema: &JsonSchema,
        context: &TesterContext,
    ) -> Option<usize> {
        let mut best: Option<(usize, Rank)> = None;
        for (index, entry) in self.entries.iter().enumerate() {
            let score = entry.score(uischema, schema, context);
            match best {
                Some((_, top)) if top >= score => {}
                _ => best = Some((index, score)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Picks the factory that renders `uischema`, or the unknown placeholder
    /// when the registry is empty or the best score is negative.
    pub fn resolve(
        &self,
        uischema: &UiSchema,
        schema: &JsonSchema,
        context: &TesterContext,
    ) -> WidgetFactory {
        let Some(index) = self.best_match(uischema, schema, context) else {
            log::debug!("no renderers registered; using unknown renderer");
            return WidgetFactory::unknown();
        };
        let entry = &self.entries[index];
        // The winner is re-scored; testers are expected to be pure.
        if entry.score(uischema, schema, context) < 0 {
            log::debug!(
                "no applicable renderer for `{}` element",
                uischema.type_name()
            );
            return WidgetFactory::unknown();
        }
        entry.factory.clone()
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| entry.factory.kind()))
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;

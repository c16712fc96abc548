//! Recording widgets and canned testers.

use std::cell::RefCell;
use std::rc::Rc;

use formweave_core::{
    EditError, JsonSchema, Rank, RefreshError, RendererEntry, TesterContext, TesterError,
    UiSchema, View, Widget, WidgetFactory, WidgetInputs, WidgetKind,
};
use serde_json::Value;

/// Lifecycle calls in order: `name:mount`, `name:update:<data>`,
/// `name:edit:<value>`, `name:unmount`.
pub type ProbeLog = Rc<RefCell<Vec<String>>>;

pub struct ProbeWidget {
    name: &'static str,
    log: ProbeLog,
    value: Value,
}

impl ProbeWidget {
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Widget for ProbeWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Control(self.name)
    }

    fn mount(&mut self) {
        self.log.borrow_mut().push(format!("{}:mount", self.name));
    }

    fn update(&mut self, inputs: &WidgetInputs<'_>) -> Result<(), RefreshError> {
        self.value = inputs.props.data.clone();
        self.log
            .borrow_mut()
            .push(format!("{}:update:{}", self.name, inputs.props.data));
        Ok(())
    }

    fn unmount(&mut self) {
        self.log.borrow_mut().push(format!("{}:unmount", self.name));
    }

    fn view(&self) -> View {
        View::Label(format!("{}={}", self.name, self.value))
    }

    fn edit(&mut self, value: Value) -> Result<(), EditError> {
        self.log
            .borrow_mut()
            .push(format!("{}:edit:{value}", self.name));
        Ok(())
    }
}

/// Factory for a probe of kind `Control(name)` and the log its widgets share.
pub fn probe(name: &'static str) -> (WidgetFactory, ProbeLog) {
    let log = ProbeLog::default();
    let shared = log.clone();
    let factory = WidgetFactory::new(WidgetKind::Control(name), move |_| {
        Box::new(ProbeWidget {
            name,
            log: shared.clone(),
            value: Value::Null,
        })
    });
    (factory, log)
}

/// Probe entry scoring `rank` for every element.
pub fn probe_entry(name: &'static str, rank: Rank) -> (RendererEntry, ProbeLog) {
    let (factory, log) = probe(name);
    (RendererEntry::new(fixed_rank(rank), factory), log)
}

pub fn fixed_rank(
    rank: Rank,
) -> impl Fn(&UiSchema, &JsonSchema, &TesterContext) -> Result<Rank, TesterError> {
    move |_, _, _| Ok(rank)
}

/// Tester that always faults.
pub fn faulty(
    message: &'static str,
) -> impl Fn(&UiSchema, &JsonSchema, &TesterContext) -> Result<Rank, TesterError> {
    move |_, _, _| Err(TesterError::new(message))
}

pub fn count(log: &ProbeLog, entry: &str) -> usize {
    log.borrow().iter().filter(|line| line.as_str() == entry).count()
}

pub fn count_prefix(log: &ProbeLog, prefix: &str) -> usize {
    log.borrow()
        .iter()
        .filter(|line| line.starts_with(prefix))
        .count()
}

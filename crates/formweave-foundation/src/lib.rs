//! Default collaborators for formweave: state projection, reducers, schema
//! generation and the scope/path helpers they share.

pub mod config;
pub mod generate;
pub mod label;
pub mod path;
pub mod projector;
pub mod reducer;
pub mod rules;
pub mod validate;

use std::rc::Rc;

use formweave_core::{Coalescer, NodeContext};

// Re-export commonly used items
pub use config::{default_config, merge_config};
pub use generate::DefaultGenerator;
pub use label::{default_label, start_case};
pub use path::{compose_paths, resolve_data, set_data, to_data_path};
pub use projector::DefaultProjector;
pub use reducer::CoreReducer;
pub use rules::{evaluate_condition, is_visible};
pub use validate::NoopValidator;

/// Node context wired with the default projector and a non-validating
/// reducer.
pub fn default_context(coalescer: Coalescer) -> NodeContext {
    NodeContext::new(
        coalescer,
        Rc::new(DefaultProjector::new()),
        Rc::new(CoreReducer::new()),
    )
}

pub mod prelude {
    pub use crate::{
        default_context, CoreReducer, DefaultGenerator, DefaultProjector, NoopValidator,
    };
}

//! Tool infrastructure: catalog, argument validation, builtin calendar tools.
//!
//! Definitions are data. The catalog answers "does this tool exist and are
//! these arguments acceptable"; the dispatch layer turns a validated call
//! into an HTTP request.

pub mod catalog;
pub mod registry;

pub use catalog::{
    apply_defaults, validate_arguments, BodyShape, HttpMethod, ParamDef, ParamLocation, ParamType,
    ToolCatalog, ToolDefinition, ToolFamily, SCOPE_CALENDAR, SCOPE_CALENDAR_EVENTS,
};
pub use registry::{builtin_catalog, builtin_definitions};

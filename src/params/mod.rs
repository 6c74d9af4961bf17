//! Simulation parameter records, form coercion and loaders

mod data;
pub mod loader;

pub use data::{
    parse_lenient, Coerced, FieldBounds, ParamBounds, ParamField, RawParameters, SimulationParameters, MAX_HORIZON,
};
pub use loader::{load_parameter_sets, load_parameter_sets_from_reader, ParameterSet};

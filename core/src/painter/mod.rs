//! Branch painting: parameter values, condition evaluation, line
//! classification and HTML rendering

pub mod classify;
pub mod eval;
pub mod params;
pub mod render;

#[cfg(test)]
mod tests;

pub use classify::{classify, Classification, LineState};
pub use eval::{evaluate, EvaluationError, ParamBindings, ParamValue};
pub use params::extract_param_values;
pub use render::{render_html, render_lines, RenderOptions};

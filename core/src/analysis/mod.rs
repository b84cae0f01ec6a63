//! Analysis pipeline
//!
//! The entry points a presentation layer calls: simplify source text, paint
//! already simplified text under parameter values, or do both in one go.
//! Every call starts from fresh state; a failure produces no partial output.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::painter::{
    classify, extract_param_values, render_html, Classification, EvaluationError, RenderOptions,
};
use crate::parser::{parse_program, ParseError};
use crate::printer::Printer;
use crate::substitute::substitute;


#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// Classified lines of simplified source and their HTML rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Painting {
    pub classification: Classification,
    pub html: String,
}

/// Result of the full pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub simplified: String,
    pub classification: Classification,
    pub html: String,
}

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    printer: Printer,
    render: RenderOptions,
}

impl Analyzer {
    pub fn new(printer: Printer, render: RenderOptions) -> Self {
        Self { printer, render }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Printer::new(config.printer.indent_width),
            config.render.clone(),
        )
    }

    /// Parse, substitute and print `source`
    pub fn simplify(&self, source: &str) -> Result<String, AnalysisError> {
        let program = parse_program(source)?;
        let simplified = self.printer.program(&substitute(program));
        debug!(lines = simplified.lines().count(), "simplified source");
        Ok(simplified)
    }

    /// Classify the branches of `simplified` under the comma-separated
    /// `params` and render the result
    pub fn paint(&self, simplified: &str, params: &str) -> Result<Painting, AnalysisError> {
        let program = parse_program(simplified)?;
        let values = extract_param_values(params)?;
        let classification = classify(&program, values)?;
        let html = render_html(simplified, &classification, &self.render);
        Ok(Painting {
            classification,
            html,
        })
    }

    pub fn analyze(&self, source: &str, params: &str) -> Result<Report, AnalysisError> {
        let simplified = self.simplify(source)?;
        let Painting {
            classification,
            html,
        } = self.paint(&simplified, params)?;
        Ok(Report {
            simplified,
            classification,
            html,
        })
    }
}

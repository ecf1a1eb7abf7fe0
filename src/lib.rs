//! Interpreter for a small teaching pseudocode language
//!
//! Source text flows through three stages: a per-line scanner, a
//! recursive-descent parser, and a tree-walking evaluator that writes
//! `OUTPUT` lines to an injected sink. Every stage fails fast; the first
//! error aborts the run and surfaces as one diagnostic.

pub mod error;
pub mod pseudo;

pub use error::{Error, LexError, RuntimeError, SyntaxError};
pub use pseudo::{Interpreter, Lexer, OutputSink, Parser, Value};

/// Run source text through the full scan/parse/evaluate pipeline.
pub fn run_source(source: &str, sink: &mut dyn OutputSink) -> Result<(), Error> {
    let tokens = Lexer::new(source).tokenize()?;
    let program = Parser::new(tokens).parse()?;
    Interpreter::new().run(&program, sink)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_roundtrip() {
        let mut output: Vec<String> = Vec::new();
        run_source("OUTPUT 1 + 1", &mut output).expect("should run");
        assert_eq!(output, vec!["2".to_string()]);
    }

    #[test]
    fn test_lex_failure_surfaces_as_one_error() {
        let mut output: Vec<String> = Vec::new();
        let err = run_source("OUTPUT \"abc", &mut output).unwrap_err();
        assert!(matches!(err, Error::Lex(LexError::UnterminatedString { line: 1, .. })));
        assert!(output.is_empty());
    }

    #[test]
    fn test_syntax_failure_surfaces_as_one_error() {
        let mut output: Vec<String> = Vec::new();
        let err = run_source("DECLARE", &mut output).unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
        assert!(output.is_empty());
    }
}

use nom::error::{VerboseError, VerboseErrorKind};

/// Error type for expression string parsing errors
#[derive(Debug, thiserror::Error)]
#[error("{err}")]
pub struct ParseError {
    err: Box<ErrorImpl>,
}

impl ParseError {
    /// Get the 1-indexed error position
    pub fn position(&self) -> usize {
        self.err.position
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.err.message
    }
}

#[derive(Debug, thiserror::Error)]
#[error("at position {position}, {message}")]
struct ErrorImpl {
    position: usize,
    message: Box<str>,
}

impl<'a> From<(&'a str, VerboseError<&'a str>)> for ParseError {
    fn from((input, err): (&'a str, VerboseError<&'a str>)) -> Self {
        let position = calculate_position(input, &err);
        let message = describe(&err).into();
        Self {
            err: Box::new(ErrorImpl { position, message }),
        }
    }
}

/// 1-indexed offset of the deepest error in the original input
fn calculate_position(input: &str, err: &VerboseError<&str>) -> usize {
    err.errors
        .first()
        .map(|(remaining, _)| input.len() - remaining.len() + 1)
        .unwrap_or(1)
}

fn describe(err: &VerboseError<&str>) -> String {
    let context = err.errors.iter().rev().find_map(|(_, kind)| match kind {
        VerboseErrorKind::Context(ctx) => Some(*ctx),
        _ => None,
    });
    match (context, err.errors.first()) {
        (Some(ctx), Some((remaining, _))) if remaining.is_empty() => {
            format!("unexpected end of input while parsing {ctx}")
        }
        (Some(ctx), Some((remaining, _))) => {
            format!(
                "failed to parse {ctx} at {fragment:?}",
                fragment = truncated(remaining)
            )
        }
        (None, Some((remaining, _))) if remaining.is_empty() => {
            String::from("unexpected end of input")
        }
        (None, Some((remaining, _))) => {
            format!(
                "unexpected input at {fragment:?}",
                fragment = truncated(remaining)
            )
        }
        _ => String::from("invalid expression"),
    }
}

fn truncated(remaining: &str) -> &str {
    let cut = remaining
        .char_indices()
        .nth(16)
        .map(|(i, _)| i)
        .unwrap_or(remaining.len());
    &remaining[..cut]
}

/// Error type for failures during evaluation of a parsed expression
///
/// Structural mismatches between an expression and a document are never
/// errors; they yield empty results. Only the reserved expression forms
/// surface here.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// The expression contains a reserved form with no defined semantics
    #[error("the `{0}` expression form is reserved and not implemented")]
    Unimplemented(&'static str),
    /// The expression names a back-tick operator this crate does not know
    #[error("unknown named operator `{0}`")]
    UnknownOperator(String),
}

/// Any error this crate can produce: parsing or evaluation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

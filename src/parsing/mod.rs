//! Decoders for the flat hypoDD files read back in.
//!
//! - **Hypocenter files**: `hypoDD.loc` (initial locations) and `hypoDD.reloc`
//!   (relocated events) share one positional layout; see [`hypocenter`]
//! - **Phase lists**: the `phase.dat` input of `ph2dt`; see [`phase`]
//!
//! Every decoder is fixed-schema: a line either yields a typed record or a
//! [`ParseError`] naming the line and field.
//!
//! ## Hypocenter columns
//!
//! | Index | Field | Unit |
//! |-------|-------|------|
//! | 0 | event id | |
//! | 1, 2 | latitude, longitude | degrees |
//! | 3 | depth | km |
//! | 7, 8 | horizontal errors (EX, EY) | m |
//! | 9 | depth error (EZ) | m |
//! | 10-15 | year, month, day, hour, minute, second | |
//! | 16 | magnitude | |
//! | 22 | catalog travel-time residual (relocated only) | s |

use thiserror::Error;

pub mod hypocenter;
pub mod phase;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: {message}")]
    InvalidFormat { line: usize, message: String },

    #[error("Line {line}: expected at least {expected} fields, found {found}")]
    MissingField {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: invalid {field} '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Line {line}: invalid date/time {value}")]
    InvalidDate { line: usize, value: String },
}

/// Parse one whitespace-separated token, naming it in the error
pub(crate) fn parse_token<T: std::str::FromStr>(
    token: &str,
    field: &'static str,
    line: usize,
) -> Result<T, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        field,
        value: token.to_string(),
    })
}

/// Parse a float token, rejecting `nan` and infinities
pub(crate) fn parse_finite(token: &str, field: &'static str, line: usize) -> Result<f64, ParseError> {
    let value: f64 = parse_token(token, field, line)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::InvalidNumber {
            line,
            field,
            value: token.to_string(),
        })
    }
}

//! Float rendering compatible with the files hypoDD users already have.
//!
//! Existing station and phase files were written with Python's `str(float)`,
//! i.e. the shortest round-trip representation, always with a fractional part,
//! switching to scientific notation below `1e-4` and from `1e16` upward with
//! a signed two-digit exponent.

/// Render a float the way Python's `repr(float)` does.
///
/// # Examples
///
/// ```
/// use relocdd::utils::numbers::py_float;
///
/// assert_eq!(py_float(10.0), "10.0");
/// assert_eq!(py_float(46.512), "46.512");
/// assert_eq!(py_float(0.00001), "1e-05");
/// ```
#[must_use]
pub fn py_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return scientific(value);
    }

    // Debug output is the shortest round-trip form and keeps the ".0"
    format!("{value:?}")
}

fn scientific(value: f64) -> String {
    let formatted = format!("{value:e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(rest) => ('-', rest),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_values() {
        assert_eq!(py_float(0.0), "0.0");
        assert_eq!(py_float(-0.0), "-0.0");
        assert_eq!(py_float(5.25), "5.25");
        assert_eq!(py_float(-122.1234567), "-122.1234567");
        assert_eq!(py_float(1577880000.0), "1577880000.0");
        assert_eq!(py_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(py_float(0.0001), "0.0001");
    }

    #[test]
    fn test_scientific_values() {
        assert_eq!(py_float(0.00001), "1e-05");
        assert_eq!(py_float(-2.5e-7), "-2.5e-07");
        assert_eq!(py_float(1e16), "1e+16");
        assert_eq!(py_float(1.25e120), "1.25e+120");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(py_float(f64::NAN), "nan");
        assert_eq!(py_float(f64::INFINITY), "inf");
        assert_eq!(py_float(f64::NEG_INFINITY), "-inf");
    }
}

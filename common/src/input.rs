use thiserror::Error;

/// Largest integer a JSON number carries without losing precision.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("'{0}' is not a whole number")]
    NotInteger(String),
    #[error("'{0}' is outside the safe integer range")]
    OutOfRange(String),
}

/// Parses a target temperature entry. Empty input reads as zero, integral
/// decimals such as `27.0` are accepted, fractions are not.
pub fn parse_target(raw: &str) -> Result<i64, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    if let Ok(value) = trimmed.parse::<i64>() {
        return if value.unsigned_abs() <= MAX_SAFE_INTEGER as u64 {
            Ok(value)
        } else {
            Err(InputError::OutOfRange(trimmed.to_string()))
        };
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => {
            if value.abs() <= MAX_SAFE_INTEGER as f64 {
                Ok(value as i64)
            } else {
                Err(InputError::OutOfRange(trimmed.to_string()))
            }
        }
        _ => Err(InputError::NotInteger(trimmed.to_string())),
    }
}

/// The controlled numeric field of the controls form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetInput {
    value: i64,
}

impl TargetInput {
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Applies a user entry. A rejected entry leaves the field untouched.
    pub fn enter(&mut self, raw: &str) -> Result<i64, InputError> {
        let value = parse_target(raw)?;
        self.value = value;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_integers_and_integral_decimals() {
        assert_eq!(parse_target("27"), Ok(27));
        assert_eq!(parse_target(" -4 "), Ok(-4));
        assert_eq!(parse_target("26.0"), Ok(26));
        assert_eq!(parse_target("1e2"), Ok(100));
        assert_eq!(parse_target(""), Ok(0));
    }

    #[test]
    fn rejects_fractions_and_text() {
        assert_eq!(
            parse_target("26.5"),
            Err(InputError::NotInteger("26.5".to_string()))
        );
        assert!(matches!(parse_target("warm"), Err(InputError::NotInteger(_))));
        assert!(matches!(parse_target("NaN"), Err(InputError::NotInteger(_))));
        assert!(matches!(parse_target("inf"), Err(InputError::NotInteger(_))));
    }

    #[test]
    fn rejects_values_beyond_safe_range() {
        assert_eq!(parse_target("9007199254740991"), Ok(MAX_SAFE_INTEGER));
        assert!(matches!(
            parse_target("9007199254740992"),
            Err(InputError::OutOfRange(_))
        ));
        assert!(matches!(parse_target("1e300"), Err(InputError::OutOfRange(_))));
        assert_eq!(
            parse_target("-9223372036854775808"),
            Err(InputError::OutOfRange("-9223372036854775808".to_string()))
        );
        assert!(matches!(
            parse_target("-9007199254740992"),
            Err(InputError::OutOfRange(_))
        ));
    }

    #[test]
    fn rejected_entry_keeps_previous_value() {
        let mut input = TargetInput::default();
        assert_eq!(input.enter("28"), Ok(28));

        assert!(input.enter("28.7").is_err());
        assert!(input.enter("abc").is_err());

        assert_eq!(input.value(), 28);
    }
}

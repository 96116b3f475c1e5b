//! Checked parsing of integer literals.
//!
//! Accepted syntax is an optional sign followed by `0x`/`0X` hexadecimal
//! digits, a leading `0` and octal digits, or plain decimal digits.
//! Values are parsed into an `i128` first and then narrowed into the
//! requested target type, so `-1` is out of range for `u32` rather than
//! wrapping.

/// Why an integer literal was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegerLiteralError {
    #[error("empty integer literal")]
    Empty,

    #[error("malformed integer literal `{0}`")]
    Malformed(String),

    #[error("integer literal `{0}` is out of range")]
    OutOfRange(String),
}

/// Parse `text` into `T`, rejecting anything malformed or out of range.
pub fn parse_integer_literal<T: TryFrom<i128>>(text: &str) -> Result<T, IntegerLiteralError> {
    if text.is_empty() {
        return Err(IntegerLiteralError::Empty);
    }

    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(IntegerLiteralError::Malformed(text.to_string()));
    }

    let out_of_range = || IntegerLiteralError::OutOfRange(text.to_string());
    let magnitude = u128::from_str_radix(digits, radix).map_err(|_| out_of_range())?;
    let magnitude = i128::try_from(magnitude).map_err(|_| out_of_range())?;
    let value = if negative { -magnitude } else { magnitude };

    T::try_from(value).map_err(|_| out_of_range())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal() {
        assert_eq!(parse_integer_literal::<u32>("42"), Ok(42));
        assert_eq!(parse_integer_literal::<u32>("0"), Ok(0));
        assert_eq!(parse_integer_literal::<i64>("-17"), Ok(-17));
        assert_eq!(parse_integer_literal::<i8>("+5"), Ok(5));
    }

    #[test]
    fn test_hex_and_octal() {
        assert_eq!(parse_integer_literal::<u32>("0x10"), Ok(16));
        assert_eq!(parse_integer_literal::<u32>("0XfF"), Ok(255));
        assert_eq!(parse_integer_literal::<u32>("010"), Ok(8));
        assert_eq!(parse_integer_literal::<i32>("-0x8"), Ok(-8));
    }

    #[test]
    fn test_range_checks() {
        assert_eq!(parse_integer_literal::<u32>("4294967295"), Ok(u32::MAX));
        assert_eq!(
            parse_integer_literal::<u32>("4294967296"),
            Err(IntegerLiteralError::OutOfRange("4294967296".to_string()))
        );
        assert_eq!(
            parse_integer_literal::<u32>("-1"),
            Err(IntegerLiteralError::OutOfRange("-1".to_string()))
        );
        assert_eq!(parse_integer_literal::<i8>("-128"), Ok(-128));
        assert!(parse_integer_literal::<i8>("128").is_err());
        assert!(parse_integer_literal::<i128>("0xffffffffffffffffffffffffffffffffff").is_err());
    }

    #[test]
    fn test_malformed() {
        assert_eq!(parse_integer_literal::<u32>(""), Err(IntegerLiteralError::Empty));
        for text in ["-", "0x", "09", "12a", "1.5", "--1", "0x-1"] {
            assert_eq!(
                parse_integer_literal::<u32>(text),
                Err(IntegerLiteralError::Malformed(text.to_string())),
                "{text}"
            );
        }
    }
}

//! Serde helpers for carrying `BigDecimal` values as plain JSON numbers.
//!
//! Values are written as their exact decimal text in a JSON number token
//! (serde_json `arbitrary_precision`), so nothing is rounded through `f64`.
//! Fields opt in with `#[serde(with = "crate::models::decimal")]`.

use bigdecimal::BigDecimal;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::str::FromStr;

/// Most decimal places a trade amount may carry.
pub const MAX_AMOUNT_SCALE: i64 = 18;
/// Most significant digits a trade amount may carry.
pub const MAX_AMOUNT_DIGITS: i64 = 38;

pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let number = Number::from_str(&value.to_string()).map_err(ser::Error::custom)?;
    number.serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let expected = &"a finite number or a numeric string";
    match Value::deserialize(deserializer)? {
        Value::Number(n) => BigDecimal::from_str(&n.to_string()).map_err(de::Error::custom),
        Value::String(s) => BigDecimal::from_str(s.trim())
            .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&s), expected)),
        Value::Null => Err(de::Error::invalid_type(de::Unexpected::Unit, expected)),
        Value::Bool(b) => Err(de::Error::invalid_type(de::Unexpected::Bool(b), expected)),
        Value::Array(_) => Err(de::Error::invalid_type(de::Unexpected::Seq, expected)),
        Value::Object(_) => Err(de::Error::invalid_type(de::Unexpected::Map, expected)),
    }
}

/// Rejects amounts whose arithmetic or text form would be unbounded.
///
/// Parsing only records the exponent, so `1e-50000000` is cheap to read but
/// every later subtraction has to rescale the balance to fifty million places.
pub fn check_amount(amount: &BigDecimal) -> Result<(), String> {
    let (int, scale) = amount.as_bigint_and_exponent();
    if scale > MAX_AMOUNT_SCALE {
        return Err(format!(
            "amount must have at most {} decimal places",
            MAX_AMOUNT_SCALE
        ));
    }

    let int_digits = int.magnitude().to_string().len() as i64;
    let digits = if scale < 0 {
        int_digits.saturating_sub(scale)
    } else {
        int_digits.max(scale)
    };
    if digits > MAX_AMOUNT_DIGITS {
        return Err(format!(
            "amount must have at most {} significant digits",
            MAX_AMOUNT_DIGITS
        ));
    }
    Ok(())
}

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Outcome of decoding a field that clients may send either as a native
/// structured value or as JSON text (FormData stringifies nested values).
///
/// Malformed input is not an error here: the API contract swallows it and
/// stores an empty default instead. Keeping the two cases distinct lets
/// callers log the substitution and lets tests assert on it directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Lenient<T> {
    Parsed(T),
    Defaulted(T),
}

impl<T> Lenient<T> {
    pub fn into_inner(self) -> T {
        match self {
            Lenient::Parsed(value) | Lenient::Defaulted(value) => value,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Lenient::Defaulted(_))
    }
}

pub fn decode_lenient<T>(value: Value) -> Lenient<T>
where
    T: DeserializeOwned + Default,
{
    let result = match value {
        Value::String(text) => serde_json::from_str(&text),
        other => serde_json::from_value(other),
    };

    match result {
        Ok(parsed) => Lenient::Parsed(parsed),
        Err(_) => Lenient::Defaulted(T::default()),
    }
}

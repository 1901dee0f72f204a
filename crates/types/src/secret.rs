//! Secrecy marking for configuration fields
//!
//! A field is secret when it is declared as [`Secret<T>`] or annotated with
//! `#[serde(with = "types::secret")]`. Both forms serialize as a newtype
//! struct named [`SECRET_MARKER`]. Ordinary serializers (figment, serde_json,
//! serde_yaml) treat that newtype transparently and see the real value; the
//! field walker recognises the name and prints [`SENSITIVE_DATA_MASK`]
//! instead, without descending into the value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Mask printed in place of secret values
pub const SENSITIVE_DATA_MASK: &str = "***************";

/// Newtype name carried by secret values through `Serialize`
pub const SECRET_MARKER: &str = "$confload::private::Secret";

/// Serialize `value` as a secret. Use through `#[serde(with = "...")]`.
pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize + ?Sized,
    S: Serializer,
{
    serializer.serialize_newtype_struct(SECRET_MARKER, value)
}

/// Deserialize a secret field; the value is read unchanged.
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer)
}

/// Wrapper marking a value as sensitive.
///
/// `Debug` never shows the inner value.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Secret(value)
    }

    /// Access the real value
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Secret<T> {
    fn from(value: T) -> Self {
        Secret(value)
    }
}

impl From<&str> for Secret<String> {
    fn from(value: &str) -> Self {
        Secret(value.to_string())
    }
}

impl<T> Deref for Secret<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Secret<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", SENSITIVE_DATA_MASK)
    }
}

impl<T: Serialize> Serialize for Secret<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize(&self.0, serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Secret<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Credentials {
        user: String,
        password: Secret<String>,
        #[serde(with = "crate::secret")]
        token: String,
    }

    #[test]
    fn test_mask_is_fifteen_asterisks() {
        assert_eq!(SENSITIVE_DATA_MASK.len(), 15);
        assert!(SENSITIVE_DATA_MASK.chars().all(|c| c == '*'));
    }

    #[test]
    fn test_debug_hides_value() {
        let secret = Secret::new("hunter2".to_string());
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains(SENSITIVE_DATA_MASK));
    }

    #[test]
    fn test_regular_serializers_see_real_value() {
        let creds = Credentials {
            user: "admin".to_string(),
            password: Secret::from("hunter2"),
            token: "abc".to_string(),
        };
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json["password"], "hunter2");
        assert_eq!(json["token"], "abc");

        let back: Credentials = serde_json::from_value(json).unwrap();
        assert_eq!(back.password.expose(), "hunter2");
        assert_eq!(back.token, "abc");
    }
}

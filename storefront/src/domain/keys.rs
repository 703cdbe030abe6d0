//! Validated identifiers shared by both stores.
use thiserror::Error;

/// Validation errors returned when constructing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyValidationError {
    /// Value is empty after trimming whitespace.
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
    /// Value carries leading or trailing whitespace.
    #[error("{kind} must not contain surrounding whitespace")]
    ContainsWhitespace { kind: &'static str },
}

fn validate(kind: &'static str, raw: String) -> Result<String, KeyValidationError> {
    if raw.trim().is_empty() {
        return Err(KeyValidationError::Empty { kind });
    }
    if raw.trim() != raw {
        return Err(KeyValidationError::ContainsWhitespace { kind });
    }
    Ok(raw)
}

macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Construct the identifier after checking it is non-empty and trimmed.
            pub fn new(value: impl Into<String>) -> Result<Self, KeyValidationError> {
                validate($kind, value.into()).map(Self)
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = KeyValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_key!(
    /// Key of a document inside a store collection.
    EntityKey,
    "entity key"
);

define_key!(
    /// Identifier of the signed-in user, as issued by the authentication provider.
    UserId,
    "user id"
);

define_key!(
    /// Stable catalog identifier of a product.
    ProductId,
    "product id"
);

define_key!(
    /// Promotion code entered at checkout.
    PromoCode,
    "promo code"
);

impl EntityKey {
    /// Key a product-scoped record by its product and optional qualifiers.
    ///
    /// Every qualifier keeps its position: an unset or blank qualifier is an
    /// empty segment, so `[Some("M"), None]` and `[None, Some("M")]` yield
    /// different keys. `%` and `:` inside a qualifier are percent-escaped.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::{EntityKey, ProductId};
    ///
    /// let product = ProductId::new("p-1").expect("valid id");
    /// let key = EntityKey::product_scoped(&product, &[Some("M"), Some("red")]);
    /// assert_eq!(key.as_str(), "p-1:M:red");
    /// let unsized_line = EntityKey::product_scoped(&product, &[None, Some("red")]);
    /// assert_eq!(unsized_line.as_str(), "p-1::red");
    /// ```
    pub fn product_scoped(product: &ProductId, qualifiers: &[Option<&str>]) -> Self {
        let mut raw = product.as_str().to_owned();
        for qualifier in qualifiers {
            raw.push(':');
            let trimmed = qualifier.map_or("", str::trim);
            for ch in trimmed.chars() {
                match ch {
                    '%' => raw.push_str("%25"),
                    ':' => raw.push_str("%3A"),
                    other => raw.push(other),
                }
            }
        }
        Self(raw)
    }
}

impl From<&uuid::Uuid> for EntityKey {
    fn from(value: &uuid::Uuid) -> Self {
        Self(value.hyphenated().to_string())
    }
}

impl From<&PromoCode> for EntityKey {
    fn from(value: &PromoCode) -> Self {
        Self(value.as_str().to_owned())
    }
}

impl From<&ProductId> for EntityKey {
    fn from(value: &ProductId) -> Self {
        Self(value.as_str().to_owned())
    }
}

impl From<&UserId> for EntityKey {
    fn from(value: &UserId) -> Self {
        Self(value.as_str().to_owned())
    }
}

#[cfg(test)]
mod tests {
    //! Validates identifier parsing and whitespace constraints.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn keys_reject_blank(#[case] value: &str) {
        let err = EntityKey::new(value).expect_err("blank keys rejected");
        assert_eq!(err, KeyValidationError::Empty { kind: "entity key" });
    }

    #[rstest]
    #[case(" leading")]
    #[case("trailing ")]
    fn keys_reject_whitespace_padding(#[case] value: &str) {
        let err = ProductId::new(value).expect_err("padded id rejected");
        assert_eq!(
            err,
            KeyValidationError::ContainsWhitespace { kind: "product id" }
        );
    }

    #[rstest]
    fn user_id_accepts_provider_uids() {
        let id = UserId::new("Xy9kQ2bLw1").expect("valid uid");
        assert_eq!(id.to_string(), "Xy9kQ2bLw1");
    }

    #[rstest]
    fn product_scoped_key_keeps_qualifier_positions() {
        let product = ProductId::new("p-1").expect("valid id");
        let key = EntityKey::product_scoped(&product, &[Some("M"), None, Some(" ")]);
        assert_eq!(key.as_str(), "p-1:M::");
    }

    #[rstest]
    #[case(&[Some("M"), None], &[None, Some("M")])]
    #[case(&[Some("a:b"), None], &[Some("a"), Some("b")])]
    #[case(&[Some("%3A"), None], &[Some(":"), None])]
    fn product_scoped_keys_do_not_collide(
        #[case] left: &[Option<&str>],
        #[case] right: &[Option<&str>],
    ) {
        let product = ProductId::new("p-1").expect("valid id");
        assert_ne!(
            EntityKey::product_scoped(&product, left),
            EntityKey::product_scoped(&product, right)
        );
    }

    #[rstest]
    fn keys_deserialise_with_validation() {
        let ok: ProductId = serde_json::from_str("\"p-7\"").expect("valid id");
        assert_eq!(ok.as_str(), "p-7");
        assert!(serde_json::from_str::<ProductId>("\" p-7\"").is_err());
    }
}

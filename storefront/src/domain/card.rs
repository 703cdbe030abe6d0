//! Payment cards and their encrypted storage form.
//!
//! Plaintext [`PaymentCard`] values only live in memory; both stores hold
//! [`StoredCard`] documents whose payload is opaque ciphertext produced by the
//! card cipher port.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

use super::{Collection, EntityKey, SyncableEntity};

/// Plaintext card details. Sensitive fields are wiped on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCard {
    /// Card identifier, shared with the stored form.
    pub id: Uuid,
    /// Name printed on the card.
    pub holder_name: String,
    /// Primary account number.
    pub number: String,
    /// Expiry in `MM/YY` form.
    pub expiry: String,
    /// Card verification value.
    pub cvv: String,
}

impl PaymentCard {
    /// Last four digits of the card number, for display.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::PaymentCard;
    /// use uuid::Uuid;
    ///
    /// let card = PaymentCard {
    ///     id: Uuid::nil(),
    ///     holder_name: "Ada".into(),
    ///     number: "4111 1111 1111 1234".into(),
    ///     expiry: "05/30".into(),
    ///     cvv: "123".into(),
    /// };
    /// assert_eq!(card.last_four(), "1234");
    /// ```
    pub fn last_four(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(char::is_ascii_digit).collect();
        let start = digits.len().saturating_sub(4);
        digits.get(start..).unwrap_or_default().iter().collect()
    }
}

impl std::fmt::Debug for PaymentCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentCard")
            .field("id", &self.id)
            .field("holder_name", &self.holder_name)
            .field("last_four", &self.last_four())
            .finish_non_exhaustive()
    }
}

impl Drop for PaymentCard {
    fn drop(&mut self) {
        self.number.zeroize();
        self.cvv.zeroize();
    }
}

/// Opaque ciphertext produced by the card cipher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CipherText(String);

impl CipherText {
    /// Wrap ciphertext produced by a cipher adapter.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the ciphertext.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Card document as written to both stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCard {
    /// Card identifier.
    pub id: Uuid,
    /// Encrypted [`PaymentCard`] payload.
    pub payload: CipherText,
}

impl SyncableEntity for StoredCard {
    const COLLECTION: Collection = Collection::Cards;

    fn key(&self) -> EntityKey {
        EntityKey::from(&self.id)
    }
}

//! Default card and address selection used to pre-fill checkout.

use serde::{Deserialize, Serialize};

use super::{Collection, EntityKey, SyncableEntity, UserId};

/// Which default a checkout update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutSlot {
    /// Default payment card.
    Card,
    /// Default shipping address.
    Address,
}

impl CheckoutSlot {
    /// Field name in the stored record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Address => "address",
        }
    }
}

impl std::fmt::Display for CheckoutSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's default checkout selection, as list indices.
///
/// The record is written wholesale: every update re-sends both fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckoutIndices {
    /// Index of the default card, if chosen.
    pub card: Option<usize>,
    /// Index of the default address, if chosen.
    pub address: Option<usize>,
}

impl CheckoutIndices {
    /// Read the index stored for `slot`.
    pub fn get(&self, slot: CheckoutSlot) -> Option<usize> {
        match slot {
            CheckoutSlot::Card => self.card,
            CheckoutSlot::Address => self.address,
        }
    }

    /// Copy of `self` with `slot` set to `index`; the other field is kept.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::{CheckoutIndices, CheckoutSlot};
    ///
    /// let pair = CheckoutIndices::default()
    ///     .with(CheckoutSlot::Card, 2)
    ///     .with(CheckoutSlot::Address, 1);
    /// assert_eq!(pair, CheckoutIndices { card: Some(2), address: Some(1) });
    /// ```
    #[must_use]
    pub fn with(self, slot: CheckoutSlot, index: usize) -> Self {
        match slot {
            CheckoutSlot::Card => Self {
                card: Some(index),
                ..self
            },
            CheckoutSlot::Address => Self {
                address: Some(index),
                ..self
            },
        }
    }
}

/// Stored default-checkout record of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultCheckoutIndex {
    /// Owner of the selection.
    pub user_id: UserId,
    /// Selected indices.
    #[serde(flatten)]
    pub indices: CheckoutIndices,
}

impl SyncableEntity for DefaultCheckoutIndex {
    const COLLECTION: Collection = Collection::CheckoutDefaults;

    fn key(&self) -> EntityKey {
        EntityKey::from(&self.user_id)
    }
}

//! Port for payment-card encryption.
//!
//! Card details never reach a store in plaintext. The domain hands a
//! [`PaymentCard`] to the cipher and persists only the resulting
//! [`CipherText`].

use crate::domain::{CipherText, PaymentCard};

use super::define_port_error;

define_port_error! {
    /// Errors raised by card cipher adapters.
    pub enum CardCipherError => CipherFailure {
        /// Encrypting a card failed.
        Encrypt { message: String } => "card encryption failed: {message}",
        /// Decrypting a stored payload failed.
        Decrypt { message: String } => "card decryption failed: {message}",
    }
}

/// Encrypts cards before they are stored and decrypts them when read.
#[cfg_attr(test, mockall::automock)]
pub trait CardCipher: Send + Sync {
    /// Produce the stored form of `card`.
    fn encrypt(&self, card: &PaymentCard) -> Result<CipherText, CardCipherError>;

    /// Recover a card from its stored form.
    fn decrypt(&self, payload: &CipherText) -> Result<PaymentCard, CardCipherError>;
}

/// Reversible hex encoding of the card's JSON form.
///
/// Provides no confidentiality. Intended for tests and local development.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCardCipher;

impl CardCipher for FixtureCardCipher {
    fn encrypt(&self, card: &PaymentCard) -> Result<CipherText, CardCipherError> {
        let json = serde_json::to_vec(card).map_err(|err| CardCipherError::encrypt(err.to_string()))?;
        Ok(CipherText::new(hex::encode(json)))
    }

    fn decrypt(&self, payload: &CipherText) -> Result<PaymentCard, CardCipherError> {
        let json =
            hex::decode(payload.as_str()).map_err(|err| CardCipherError::decrypt(err.to_string()))?;
        serde_json::from_slice(&json).map_err(|err| CardCipherError::decrypt(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    fn fixture_cipher_recovers_the_card() {
        let card = PaymentCard {
            id: Uuid::new_v4(),
            holder_name: "Ada Lovelace".to_owned(),
            number: "4111111111111111".to_owned(),
            expiry: "01/31".to_owned(),
            cvv: "321".to_owned(),
        };

        let payload = FixtureCardCipher.encrypt(&card).expect("encrypt");
        assert!(!payload.as_str().contains("4111111111111111"));

        let recovered = FixtureCardCipher.decrypt(&payload).expect("decrypt");
        assert_eq!(recovered, card);
    }

    #[rstest]
    #[case("not hex")]
    #[case("7b7d")]
    fn fixture_cipher_rejects_garbage(#[case] payload: &str) {
        let err = FixtureCardCipher
            .decrypt(&CipherText::new(payload))
            .expect_err("garbage payload");
        assert!(matches!(err, CardCipherError::Decrypt { .. }));
    }
}

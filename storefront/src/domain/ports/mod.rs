//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod card_cipher;
mod image_uploader;
mod local_store;
mod network_probe;
mod remote_store;

#[cfg(test)]
pub use card_cipher::MockCardCipher;
pub use card_cipher::{CardCipher, CardCipherError, FixtureCardCipher};
#[cfg(test)]
pub use image_uploader::MockImageUploader;
pub use image_uploader::{FixtureImageUploader, ImageUploadError, ImageUploader};
#[cfg(test)]
pub use local_store::MockLocalStore;
pub use local_store::{LocalStore, LocalStoreError};
#[cfg(test)]
pub use network_probe::MockNetworkProbe;
pub use network_probe::{FixtureNetworkProbe, NetworkProbe};
#[cfg(test)]
pub use remote_store::MockRemoteStore;
pub use remote_store::{RemoteStore, RemoteStoreError};

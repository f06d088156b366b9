pub mod ciphertext;
pub mod encryption;
pub mod keyswitch;
pub mod keyswitch_key;
pub mod public_key;
pub mod secret;

pub use ciphertext::LweCiphertext;
pub use keyswitch_key::LweKeySwitchKey;
pub use public_key::PublicKey;
pub use secret::LweSecret;

pub mod automorphism_key;
pub mod ciphertext;
pub mod encryption;
pub mod external_product;
pub mod secret;

pub use ciphertext::RlweCiphertext;
pub use external_product::ExternalProductScratch;
pub use secret::RlweSecret;

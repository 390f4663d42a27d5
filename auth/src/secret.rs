use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes behind every refresh secret.
pub const SECRET_BYTES: usize = 32;

/// Source of high-entropy refresh secrets.
///
/// Draws from the operating system CSPRNG and encodes with standard base64 for transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretGenerator;

impl SecretGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh base64-encoded secret of [`SECRET_BYTES`] random bytes.
    pub fn generate(&self) -> String {
        let mut bytes = [0u8; SECRET_BYTES];
        OsRng.fill_bytes(&mut bytes);
        STANDARD.encode(bytes)
    }
}

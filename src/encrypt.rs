use crate::error::EncryptError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::{BigUint, Pkcs1v15Encrypt, RsaPublicKey};

/// Encrypts a password with the RSA public key Steam handed out for this
/// login attempt. The modulus and exponent arrive hex-encoded; the result is
/// the PKCS#1 v1.5 ciphertext encoded with standard base64, ready to be
/// submitted as the `password` form field.
///
/// Nothing derived from the key outlives the call.
pub fn encrypt_password(
    password: &str,
    modulus_hex: &str,
    exponent_hex: &str,
) -> Result<String, EncryptError> {
    let modulus = BigUint::parse_bytes(modulus_hex.as_bytes(), 16)
        .ok_or(EncryptError::KeyParse("modulus"))?;
    let exponent = BigUint::parse_bytes(exponent_hex.as_bytes(), 16)
        .ok_or(EncryptError::KeyParse("exponent"))?;
    let public_key = RsaPublicKey::new(modulus, exponent)?;
    let encrypted = public_key.encrypt(
        &mut rand::thread_rng(),
        Pkcs1v15Encrypt,
        password.as_bytes(),
    )?;

    Ok(BASE64.encode(encrypted))
}

#[cfg(test)]
mod tests {
    use super::*;

    // a 1024-bit modulus of the kind getrsakey responds with
    const MODULUS_HEX: &str = "\
        c136c27d3b0bcd4ce6e48b6654d4e2effa1c1b6b5bf10b0b1e3d5ff8b1f6f6c3\
        8f3a7f8e51b2a90b7a6533e1e2b5c8d9a0f1b2c3d4e5f60718293a4b5c6d7e8f\
        90a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f\
        90a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8d";
    const EXPONENT_HEX: &str = "010001";

    #[test]
    fn encrypts_to_one_base64_block() {
        let encrypted = encrypt_password("hunter2", MODULUS_HEX, EXPONENT_HEX).unwrap();
        // 128 ciphertext bytes
        assert_eq!(encrypted.len(), 172);
        assert!(BASE64.decode(encrypted).is_ok());
    }

    #[test]
    fn fails_on_bad_modulus() {
        let error = encrypt_password("hunter2", "not hex", EXPONENT_HEX).unwrap_err();

        assert!(matches!(error, EncryptError::KeyParse("modulus")));
    }

    #[test]
    fn fails_on_bad_exponent() {
        let error = encrypt_password("hunter2", MODULUS_HEX, "not hex").unwrap_err();

        assert!(matches!(error, EncryptError::KeyParse("exponent")));
    }

    #[test]
    fn fails_on_password_longer_than_the_modulus_allows() {
        // PKCS#1 v1.5 padding allows at most 117 bytes under a 1024-bit key
        let password = "a".repeat(118);
        let error = encrypt_password(&password, MODULUS_HEX, EXPONENT_HEX).unwrap_err();

        assert!(matches!(error, EncryptError::Rsa(_)));
    }

    #[test]
    fn accepts_password_at_the_limit() {
        let password = "a".repeat(117);

        assert!(encrypt_password(&password, MODULUS_HEX, EXPONENT_HEX).is_ok());
    }
}

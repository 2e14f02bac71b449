//! Ethereum wallet signer.
//!
//! Actions are signed as EIP-191 personal messages with the account's
//! secp256k1 key. The exchange authenticates the wallet address recovered
//! from the signature, so there is no shared secret.

use std::io;

use k256::ecdsa::{SigningKey, VerifyingKey};
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;
use sha3::{Digest, Keccak256};

use super::{ExchangeError, Signer};

/// Signs actions with a secp256k1 private key.
///
/// The signature is `0x` + r (32 bytes) + s (32 bytes) + v (27 or 28),
/// hex-encoded. The key is never printed by `Debug`.
#[derive(Clone)]
pub struct WalletSigner {
    signing_key: SigningKey,
    /// EIP-55 checksummed address derived from the key
    address: String,
}

impl WalletSigner {
    /// Create a signer from a hex private key (with or without `0x`).
    ///
    /// # Errors
    /// `MissingCredentials` if the key is empty; `Signing` if it is not hex,
    /// not 32 bytes, or not a valid secp256k1 scalar.
    pub fn from_hex(private_key_hex: &str) -> Result<Self, ExchangeError> {
        let hex_str = private_key_hex
            .strip_prefix("0x")
            .or_else(|| private_key_hex.strip_prefix("0X"))
            .unwrap_or(private_key_hex);

        if hex_str.is_empty() {
            return Err(ExchangeError::MissingCredentials(
                "signing key is empty; set PRIVATE_KEY".to_string(),
            ));
        }

        let bytes = hex::decode(hex_str)
            .map_err(|e| ExchangeError::Signing(format!("Invalid private key hex: {}", e)))?;

        if bytes.len() != 32 {
            return Err(ExchangeError::Signing(format!(
                "Private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }

        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| ExchangeError::Signing(format!("Invalid private key: {}", e)))?;
        let address = address_of(signing_key.verifying_key());

        Ok(Self {
            signing_key,
            address,
        })
    }

    /// The wallet address that signatures recover to.
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl std::fmt::Debug for WalletSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSigner")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl Signer for WalletSigner {
    fn sign(&self, action: &Value) -> Result<String, ExchangeError> {
        let message = action_message(action)?;
        let hash = personal_message_hash(message.as_bytes());

        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&hash)
            .map_err(|e| ExchangeError::Signing(e.to_string()))?;

        Ok(format!(
            "0x{}{:02x}",
            hex::encode(signature.to_bytes()),
            27 + recovery_id.to_byte()
        ))
    }
}

/// Render an action the way the exchange hashes it: `", "` between items
/// and `": "` after keys.
fn action_message(action: &Value) -> Result<String, ExchangeError> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedSeparators);
    action
        .serialize(&mut serializer)
        .map_err(|e| ExchangeError::Signing(format!("Cannot encode action: {}", e)))?;
    String::from_utf8(buf).map_err(|e| ExchangeError::Signing(e.to_string()))
}

struct SpacedSeparators;

impl Formatter for SpacedSeparators {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// EIP-191 hash: keccak256("\x19Ethereum Signed Message:\n" + len + message).
fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

fn address_of(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    checksum_address(&hex::encode(&hash[12..]))
}

/// EIP-55 mixed-case checksum over a lowercase hex address (no prefix).
fn checksum_address(addr: &str) -> String {
    let hash = hex::encode(Keccak256::digest(addr.as_bytes()));

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");
    for (c, h) in addr.chars().zip(hash.chars()) {
        if c.is_ascii_alphabetic() && h.to_digit(16).unwrap_or(0) >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, Signature};
    use serde_json::json;

    // Well-known development key (Hardhat / Anvil account #0)
    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn recover(message: &str, signature: &str) -> String {
        let bytes = hex::decode(signature.strip_prefix("0x").unwrap()).unwrap();
        assert_eq!(bytes.len(), 65);
        let sig = Signature::from_slice(&bytes[..64]).unwrap();
        let recid = RecoveryId::from_byte(bytes[64] - 27).unwrap();
        let hash = personal_message_hash(message.as_bytes());
        let key = VerifyingKey::recover_from_prehash(&hash, &sig, recid).unwrap();
        address_of(&key)
    }

    #[test]
    fn test_address_derivation() {
        let signer = WalletSigner::from_hex(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(signer.address(), TEST_ADDRESS);

        let unprefixed = WalletSigner::from_hex(TEST_PRIVATE_KEY.strip_prefix("0x").unwrap()).unwrap();
        assert_eq!(unprefixed.address(), TEST_ADDRESS);
    }

    #[test]
    fn test_signature_recovers_to_wallet_address() {
        let signer = WalletSigner::from_hex(TEST_PRIVATE_KEY).unwrap();
        let action = json!({"symbol": "BTC-USDT", "quantity": "0.5"});

        let sig = signer.sign(&action).unwrap();
        assert!(sig.starts_with("0x"));
        assert_eq!(sig.len(), 2 + 130);
        assert!(sig.ends_with("1b") || sig.ends_with("1c"));
        assert_eq!(sig, signer.sign(&action).unwrap());

        let message = action_message(&action).unwrap();
        assert_eq!(recover(&message, &sig), TEST_ADDRESS);
    }

    #[test]
    fn test_action_message_uses_spaced_separators() {
        let action = json!({"a": 1, "b": [1, 2], "c": {"d": "x"}});
        assert_eq!(
            action_message(&action).unwrap(),
            r#"{"a": 1, "b": [1, 2], "c": {"d": "x"}}"#
        );
    }

    #[test]
    fn test_empty_key_is_missing_credentials() {
        for key in ["", "0x"] {
            assert!(matches!(
                WalletSigner::from_hex(key),
                Err(ExchangeError::MissingCredentials(_))
            ));
        }
    }

    #[test]
    fn test_malformed_keys_rejected() {
        let zero_key = "00".repeat(32);
        for key in ["not-hex", "0x1234", zero_key.as_str()] {
            assert!(matches!(
                WalletSigner::from_hex(key),
                Err(ExchangeError::Signing(_))
            ));
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let signer = WalletSigner::from_hex(TEST_PRIVATE_KEY).unwrap();
        let printed = format!("{:?}", signer);
        assert!(!printed.contains("ac0974bec39a17e3"));
        assert!(printed.contains(TEST_ADDRESS));
    }
}

//! # Accounts
//!
//! Read access to account state and public key rendering.

use crate::entities::{Address, U256};
use crate::errors::AccountsError;
use parking_lot::RwLock;
use std::collections::HashMap;

/// State of a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub nonce: u64,
    pub balance: U256,
}

/// Accounts state contract.
pub trait AccountsAdapter: Send + Sync {
    fn get_existing_account(&self, address: &Address) -> Result<Account, AccountsError>;
}

/// In-memory accounts state.
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    accounts: RwLock<HashMap<Address, Account>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&self, account: Account) {
        self.accounts.write().insert(account.address, account);
    }
}

impl AccountsAdapter for InMemoryAccounts {
    fn get_existing_account(&self, address: &Address) -> Result<Account, AccountsError> {
        self.accounts
            .read()
            .get(address)
            .cloned()
            .ok_or_else(|| AccountsError::AccountNotFound(hex::encode(address)))
    }
}

/// Converts raw public keys to their printable form and back.
pub trait PubkeyConverter: Send + Sync {
    /// Length in bytes of a valid public key.
    fn address_len(&self) -> usize;

    fn encode(&self, pubkey: &[u8]) -> String;

    fn decode(&self, encoded: &str) -> Result<Vec<u8>, AccountsError>;
}

/// Hex public key converter.
#[derive(Debug, Clone, Copy)]
pub struct HexPubkeyConverter {
    len: usize,
}

impl HexPubkeyConverter {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Default for HexPubkeyConverter {
    fn default() -> Self {
        Self::new(32)
    }
}

impl PubkeyConverter for HexPubkeyConverter {
    fn address_len(&self) -> usize {
        self.len
    }

    fn encode(&self, pubkey: &[u8]) -> String {
        hex::encode(pubkey)
    }

    fn decode(&self, encoded: &str) -> Result<Vec<u8>, AccountsError> {
        let bytes =
            hex::decode(encoded).map_err(|e| AccountsError::InvalidPubkey(e.to_string()))?;
        if bytes.len() != self.len {
            return Err(AccountsError::InvalidPubkey(format!(
                "expected {} bytes, got {}",
                self.len,
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_account() {
        let accounts = InMemoryAccounts::new();
        assert!(matches!(
            accounts.get_existing_account(&[1u8; 32]),
            Err(AccountsError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_set_and_get_account() {
        let accounts = InMemoryAccounts::new();
        accounts.set_account(Account {
            address: [1u8; 32],
            nonce: 3,
            balance: U256::from(10u64),
        });
        assert_eq!(accounts.get_existing_account(&[1u8; 32]).unwrap().nonce, 3);
    }

    #[test]
    fn test_hex_converter_checks_length() {
        let converter = HexPubkeyConverter::new(2);
        assert_eq!(converter.encode(&[0xAB, 0xCD]), "abcd");
        assert_eq!(converter.decode("abcd").unwrap(), vec![0xAB, 0xCD]);
        assert!(converter.decode("ab").is_err());
        assert!(converter.decode("zz").is_err());
    }
}

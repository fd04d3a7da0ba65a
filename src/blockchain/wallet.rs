//! Wallet management and transaction signing.
//!
//! # Security
//! - Key material comes from configuration or environment variables only
//! - Keys are never logged or serialized
//! - Sequence numbers are allocated atomically and never reused

use ed25519_dalek::{
    Signature, Signer, SigningKey, Verifier, VerifyingKey, KEYPAIR_LENGTH, SECRET_KEY_LENGTH,
};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::blockchain::transaction::{
    check_address, PayloadTag, SignedTransaction, TransactionIntent, DEFAULT_GAS_FEE,
};
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::WalletCredentials;

/// Prefix of every derived address.
pub const ADDRESS_TAG: &str = "EQ";

/// Number of digest bytes kept in an address.
const ADDRESS_HASH_BYTES: usize = 20;

/// Wallet for transaction signing with sequence number management.
pub struct Wallet {
    /// Signing key; `None` until initialized.
    signer: Option<SigningKey>,
    /// Derived address; empty until initialized.
    address: String,
    /// Last allocated sequence number.
    seqno: AtomicU32,
}

impl Wallet {
    /// Create an uninitialized wallet.
    pub fn new() -> Self {
        Self {
            signer: None,
            address: String::new(),
            seqno: AtomicU32::new(0),
        }
    }

    /// Create and initialize a wallet in one step.
    pub fn from_credentials(credentials: &WalletCredentials) -> BlockchainResult<Self> {
        let mut wallet = Self::new();
        wallet.initialize(credentials)?;
        Ok(wallet)
    }

    /// Load key material. Exactly one credential must be present.
    pub fn initialize(&mut self, credentials: &WalletCredentials) -> BlockchainResult<()> {
        let private_key = credentials.private_key.as_deref().filter(|k| !k.is_empty());
        let mnemonic = credentials.mnemonic.as_deref().filter(|m| !m.is_empty());

        match (private_key, mnemonic) {
            (Some(key), None) => self.load_private_key(key),
            (None, Some(_)) => {
                tracing::debug!("Loading wallet from mnemonic");
                Err(BlockchainError::UnsupportedCredential(
                    "mnemonic-based key derivation is not implemented".to_string(),
                ))
            }
            (Some(_), Some(_)) => Err(BlockchainError::Configuration(
                "private key and mnemonic are mutually exclusive".to_string(),
            )),
            (None, None) => Err(BlockchainError::Configuration(
                "neither private key nor mnemonic provided".to_string(),
            )),
        }
    }

    fn load_private_key(&mut self, private_key_hex: &str) -> BlockchainResult<()> {
        // Strip 0x prefix if present
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let bytes = hex::decode(key_hex).map_err(|e| BlockchainError::InvalidKey(e.to_string()))?;

        let signer = if let Ok(seed) = <[u8; SECRET_KEY_LENGTH]>::try_from(bytes.as_slice()) {
            SigningKey::from_bytes(&seed)
        } else if let Ok(keypair) = <[u8; KEYPAIR_LENGTH]>::try_from(bytes.as_slice()) {
            SigningKey::from_keypair_bytes(&keypair)
                .map_err(|e| BlockchainError::InvalidKey(e.to_string()))?
        } else {
            return Err(BlockchainError::InvalidKeyLength {
                expected_seed: SECRET_KEY_LENGTH,
                expected_full: KEYPAIR_LENGTH,
                actual: bytes.len(),
            });
        };

        self.address = derive_address(&signer.verifying_key());
        self.signer = Some(signer);

        tracing::info!(address = %self.address, "Wallet initialized");
        Ok(())
    }

    /// Whether key material has been loaded.
    pub fn is_initialized(&self) -> bool {
        self.signer.is_some()
    }

    /// Get the wallet's address (empty before initialization).
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Get the public key, if initialized.
    pub fn public_key(&self) -> Option<VerifyingKey> {
        self.signer.as_ref().map(SigningKey::verifying_key)
    }

    /// Last sequence number handed out.
    pub fn current_sequence(&self) -> u32 {
        self.seqno.load(Ordering::SeqCst)
    }

    /// Allocate the next sequence number; never wraps.
    fn next_sequence(&self) -> BlockchainResult<u32> {
        self.seqno
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map(|prev| prev + 1)
            .map_err(|_| BlockchainError::SequenceExhausted)
    }

    fn signer(&self) -> BlockchainResult<&SigningKey> {
        self.signer.as_ref().ok_or(BlockchainError::NotInitialized)
    }

    /// Sign arbitrary message bytes.
    pub fn sign(&self, message: &[u8]) -> BlockchainResult<Signature> {
        let signer = self.signer()?;
        tracing::debug!(message_length = message.len(), "Signing message");
        Ok(signer.sign(message))
    }

    /// Verify a signature against a raw 32-byte public key.
    pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
            return false;
        };
        let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify(message, &signature).is_ok()
    }

    /// Build and sign a transaction, consuming the next sequence number.
    pub fn build_transaction(
        &self,
        to: &str,
        amount: u64,
        payload: PayloadTag,
    ) -> BlockchainResult<SignedTransaction> {
        let signer = self.signer()?;
        check_address(to)?;

        let seqno = self.next_sequence()?;
        let kind = payload.kind();
        let intent = TransactionIntent::new(&self.address, to, amount, seqno, payload);
        let body = intent.encode()?;
        let signature = signer.sign(&body);

        tracing::debug!(
            to = %to,
            amount = amount,
            seqno = seqno,
            kind = kind,
            "Transaction built"
        );

        Ok(SignedTransaction::new(
            &signature.to_bytes(),
            &body,
            seqno,
            amount,
            kind,
        ))
    }

    /// Build a `drawWinner` message for the lottery contract.
    pub fn build_draw_winner(&self, contract_address: &str) -> BlockchainResult<SignedTransaction> {
        self.build_transaction(contract_address, DEFAULT_GAS_FEE, PayloadTag::DrawWinner)
    }

    /// Build a `startNewRound` message for the lottery contract.
    pub fn build_start_new_round(&self, contract_address: &str) -> BlockchainResult<SignedTransaction> {
        self.build_transaction(contract_address, DEFAULT_GAS_FEE, PayloadTag::StartNewRound)
    }

    /// Build a message pointing the lottery at an NFT collection.
    pub fn build_set_nft_contract(
        &self,
        contract_address: &str,
        nft_address: &str,
    ) -> BlockchainResult<SignedTransaction> {
        self.build_transaction(
            contract_address,
            DEFAULT_GAS_FEE,
            PayloadTag::SetNftContract(nft_address.to_string()),
        )
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("seqno", &self.current_sequence())
            .finish()
    }
}

/// Tag followed by the hex of the first 20 bytes of SHA-256(public key).
fn derive_address(key: &VerifyingKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    format!("{}{}", ADDRESS_TAG, hex::encode(&digest[..ADDRESS_HASH_BYTES]))
}

//! Transaction intents and their signed form.
//!
//! # Responsibilities
//! - Describe what a keeper transaction carries (destination, value, payload)
//! - Encode an intent into the bytes that get signed
//! - Hold the signed payload until it is submitted
//!
//! The byte layout is a stand-in for the ledger's real cell encoding:
//! ```text
//! from_len:u8 | from | to_len:u8 | to | amount:u64 BE | seqno:u32 BE | timestamp:u64 BE | payload
//! ```
//! A signed transaction is `signature (64 bytes) || body`.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Longest address the one-byte length prefix can carry.
pub const MAX_ADDRESS_LEN: usize = u8::MAX as usize;

/// Gas fee attached to every keeper message, in nano units (0.05 coin).
pub const DEFAULT_GAS_FEE: u64 = 50_000_000;

/// Message kinds the keeper sends to the lottery contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadTag {
    DrawWinner,
    StartNewRound,
    SetNftContract(String),
}

impl PayloadTag {
    /// Short name used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PayloadTag::DrawWinner => "draw_winner",
            PayloadTag::StartNewRound => "start_new_round",
            PayloadTag::SetNftContract(_) => "set_nft_contract",
        }
    }

    /// Bytes placed at the end of the transaction body.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            PayloadTag::DrawWinner => b"drawWinner".to_vec(),
            PayloadTag::StartNewRound => b"startNewRound".to_vec(),
            PayloadTag::SetNftContract(addr) => format!("setNFTContract:{}", addr).into_bytes(),
        }
    }
}

/// An unsigned transaction, consumed by signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    pub from: String,
    pub to: String,
    pub amount: u64,
    pub seqno: u32,
    pub timestamp: u64,
    pub payload: PayloadTag,
}

impl TransactionIntent {
    /// Create an intent stamped with the current unix time.
    pub fn new(from: &str, to: &str, amount: u64, seqno: u32, payload: PayloadTag) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            from: from.to_string(),
            to: to.to_string(),
            amount,
            seqno,
            timestamp,
            payload,
        }
    }

    /// Encode the intent into the bytes that get signed.
    pub fn encode(&self) -> BlockchainResult<Vec<u8>> {
        let payload = self.payload.to_bytes();
        let mut out = Vec::with_capacity(2 + self.from.len() + self.to.len() + 20 + payload.len());

        push_address(&mut out, &self.from)?;
        push_address(&mut out, &self.to)?;
        out.extend_from_slice(&self.amount.to_be_bytes());
        out.extend_from_slice(&self.seqno.to_be_bytes());
        out.extend_from_slice(&self.timestamp.to_be_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }
}

/// Reject addresses the length prefix cannot represent.
pub fn check_address(address: &str) -> BlockchainResult<()> {
    if address.len() > MAX_ADDRESS_LEN {
        return Err(BlockchainError::AddressTooLong {
            len: address.len(),
            max: MAX_ADDRESS_LEN,
        });
    }
    Ok(())
}

fn push_address(out: &mut Vec<u8>, address: &str) -> BlockchainResult<()> {
    check_address(address)?;
    out.push(address.len() as u8);
    out.extend_from_slice(address.as_bytes());
    Ok(())
}

/// Authenticated transaction payload, ready for a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    bytes: Vec<u8>,
    seqno: u32,
    gas_fee: u64,
    kind: &'static str,
}

impl SignedTransaction {
    pub(crate) fn new(signature: &[u8], body: &[u8], seqno: u32, gas_fee: u64, kind: &'static str) -> Self {
        let mut bytes = Vec::with_capacity(signature.len() + body.len());
        bytes.extend_from_slice(signature);
        bytes.extend_from_slice(body);
        Self {
            bytes,
            seqno,
            gas_fee,
            kind,
        }
    }

    /// Hex encoding used by the submission endpoint.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Sequence number carried by this transaction.
    pub fn seqno(&self) -> u32 {
        self.seqno
    }

    /// Gas fee (value) attached to the message.
    pub fn gas_fee(&self) -> u64 {
        self.gas_fee
    }

    /// Message kind, see [`PayloadTag::kind`].
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Split into `(signature, body)`.
    pub fn split(&self) -> (&[u8], &[u8]) {
        self.bytes.split_at(ed25519_dalek::SIGNATURE_LENGTH.min(self.bytes.len()))
    }
}

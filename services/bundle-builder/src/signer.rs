//! The external signer boundary (spec.md §4.6 step 5): the builder never holds key
//! material, only a handle it asks to sign each leg in sequence order.

use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("external signer unreachable")]
    Unreachable,
    #[error("signer rejected the request: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait TxSigner: Send + Sync {
    async fn sign(
        &self,
        to: Address,
        data: Bytes,
        value: U256,
        gas_limit: U256,
        max_fee: U256,
        priority_fee: U256,
        nonce: U256,
    ) -> Result<Bytes, SignerError>;
}

/// Lets a strategy's `BuildContext` pass `&dyn TxSigner` straight into the bundle
/// builder's `S: TxSigner` generic parameter.
#[async_trait]
impl<T: TxSigner + ?Sized> TxSigner for &T {
    async fn sign(
        &self,
        to: Address,
        data: Bytes,
        value: U256,
        gas_limit: U256,
        max_fee: U256,
        priority_fee: U256,
        nonce: U256,
    ) -> Result<Bytes, SignerError> {
        (**self).sign(to, data, value, gas_limit, max_fee, priority_fee, nonce).await
    }
}

/// Deterministic test double: encodes the call arguments into a recognizable byte
/// string rather than producing a real signature.
pub struct MockTxSigner;

#[async_trait]
impl TxSigner for MockTxSigner {
    async fn sign(
        &self,
        to: Address,
        _data: Bytes,
        _value: U256,
        _gas_limit: U256,
        max_fee: U256,
        priority_fee: U256,
        nonce: U256,
    ) -> Result<Bytes, SignerError> {
        let mut bytes = to.as_bytes().to_vec();
        bytes.extend_from_slice(&max_fee.low_u64().to_be_bytes());
        bytes.extend_from_slice(&priority_fee.low_u64().to_be_bytes());
        bytes.extend_from_slice(&nonce.low_u64().to_be_bytes());
        Ok(Bytes::from(bytes))
    }
}

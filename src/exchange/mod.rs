//! Exchange Boundary
//!
//! Traits for the two collaborators the order layer depends on but does not
//! implement: a signer that authenticates actions and a transport that
//! delivers them. `WalletSigner` and `HttpTransport` are the production
//! implementations. `OrderGateway` wires validation output, the tracker and
//! these collaborators into the submit flow.

mod gateway;
mod http;
mod signer;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::orders::OrderError;
use crate::validation::ValidationError;

pub use gateway::OrderGateway;
pub use http::HttpTransport;
pub use signer::WalletSigner;

/// Endpoint that accepts signed actions.
pub const EXCHANGE_ENDPOINT: &str = "exchange";

/// Errors raised by signing or transport collaborators.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// No key material configured for signed requests
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Signing failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// Request could not be delivered or the exchange answered with a failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Exchange answered with a body we cannot interpret
    #[error("Invalid exchange response: {0}")]
    InvalidResponse(String),
}

/// Errors surfaced by [`OrderGateway`].
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// HTTP method for a transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Produces a signature over an action.
pub trait Signer: Send + Sync {
    fn sign(&self, action: &Value) -> Result<String, ExchangeError>;
}

/// Delivers signed actions and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(
        &self,
        method: Method,
        endpoint: &str,
        payload: &SignedAction,
    ) -> Result<Value, ExchangeError>;
}

/// An action together with its freshness nonce and signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedAction {
    pub action: Value,
    /// Epoch milliseconds at signing time
    pub nonce: i64,
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_address: Option<String>,
}

impl SignedAction {
    /// Sign `action` with a nonce taken from the current clock.
    pub fn now(
        signer: &dyn Signer,
        action: Value,
        vault_address: Option<String>,
    ) -> Result<Self, ExchangeError> {
        prepare_action(signer, action, Utc::now().timestamp_millis(), vault_address)
    }
}

/// Build a signed action envelope with an explicit nonce.
pub fn prepare_action(
    signer: &dyn Signer,
    action: Value,
    nonce: i64,
    vault_address: Option<String>,
) -> Result<SignedAction, ExchangeError> {
    let signature = signer.sign(&action)?;
    Ok(SignedAction {
        action,
        nonce,
        signature,
        vault_address,
    })
}

//! Solana JSON-RPC evidence collector
//!
//! Speaks the standard JSON-RPC surface (getAccountInfo, getSlot,
//! getBlockTime, getSignaturesForAddress, getTransaction) over HTTP with
//! gzip, a per-call timeout, and bounded exponential-backoff retry with
//! jitter for retryable failures (timeout, connect, HTTP 429).
//!
//! Parsing is deliberately shallow: the collector maps RPC JSON into the
//! snapshot types the audit engine consumes and nothing more.

use rand::Rng;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::config::AuditConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{AccountSnapshot, SignatureRecord, TransactionRecord};
use crate::providers::EvidenceSource;
use crate::utils::constants::{BASE_RETRY_DELAY_MS, MAX_RPC_RETRIES};

const USER_AGENT_STRING: &str = concat!("SolSentry/", env!("CARGO_PKG_VERSION"));

/// Solana JSON-RPC client
#[derive(Clone)]
pub struct SolanaClient {
    rpc_url: String,
    client: reqwest::Client,
}

impl SolanaClient {
    pub fn new(config: &AuditConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.rpc_timeout)
            .gzip(true)
            .user_agent(USER_AGENT_STRING)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorCode::ConfigInvalidValue, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            rpc_url: config.rpc_url.clone(),
            client,
        })
    }

    /// Execute one JSON-RPC call with retry for transient failures
    async fn call(&self, method: &str, params: Value) -> AppResult<Value> {
        let mut last_err = AppError::rpc_error("no attempt made");

        for attempt in 0..MAX_RPC_RETRIES {
            if attempt > 0 {
                let backoff = BASE_RETRY_DELAY_MS * 2u64.pow(attempt - 1);
                let jitter = rand::thread_rng().gen_range(0..BASE_RETRY_DELAY_MS / 2);
                debug!(method, attempt, backoff_ms = backoff + jitter, "Retrying RPC call");
                tokio::time::sleep(Duration::from_millis(backoff + jitter)).await;
            }

            match self.call_once(method, params.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) if e.code.is_retryable() => {
                    warn!(method, code = e.code_str(), "Retryable RPC failure");
                    last_err = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err)
    }

    async fn call_once(&self, method: &str, params: Value) -> AppResult<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self.client.post(&self.rpc_url).json(&payload).send().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::rpc_rate_limited());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::rpc_invalid_response(format!("bad RPC body: {}", e)))?;

        if let Some(error) = body.get("error") {
            return Err(AppError::rpc_error(format!(
                "{} failed: {}",
                method, error
            )));
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| AppError::rpc_invalid_response(format!("{}: no result field", method)))
    }
}

/// Account data size in bytes from a getAccountInfo value.
///
/// Recent nodes report `space` directly; older ones only carry the base64
/// payload, whose decoded size we estimate instead.
fn account_data_len(value: &Value) -> u64 {
    if let Some(space) = value.get("space").and_then(Value::as_u64) {
        return space;
    }
    value
        .get("data")
        .and_then(|d| d.get(0))
        .and_then(Value::as_str)
        .map(|b64| (b64.len() as u64 * 3) / 4)
        .unwrap_or(0)
}

impl EvidenceSource for SolanaClient {
    async fn fetch_account(&self, address: &str) -> AppResult<Option<AccountSnapshot>> {
        let result = self
            .call(
                "getAccountInfo",
                json!([address, {"encoding": "base64", "commitment": "confirmed"}]),
            )
            .await?;

        let value = result.get("value").cloned().unwrap_or(Value::Null);
        if value.is_null() {
            return Ok(None);
        }

        let snapshot = AccountSnapshot {
            lamports: value.get("lamports").and_then(Value::as_u64).unwrap_or(0),
            data_len: account_data_len(&value),
            executable: value
                .get("executable")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            rent_epoch: value.get("rentEpoch").and_then(Value::as_u64).unwrap_or(0),
        };

        Ok(Some(snapshot))
    }

    async fn current_slot(&self) -> AppResult<u64> {
        let result = self
            .call("getSlot", json!([{"commitment": "confirmed"}]))
            .await?;
        result
            .as_u64()
            .ok_or_else(|| AppError::rpc_invalid_response("getSlot: non-numeric result"))
    }

    async fn block_time(&self, slot: u64) -> AppResult<Option<i64>> {
        let result = self.call("getBlockTime", json!([slot])).await?;
        Ok(result.as_i64())
    }

    async fn fetch_recent_signatures(
        &self,
        address: &str,
        limit: usize,
    ) -> AppResult<Vec<SignatureRecord>> {
        let result = self
            .call(
                "getSignaturesForAddress",
                json!([address, {"limit": limit}]),
            )
            .await?;

        serde_json::from_value(result)
            .map_err(|e| AppError::rpc_invalid_response(format!("bad signature list: {}", e)))
    }

    async fn fetch_transaction(&self, signature: &str) -> AppResult<Option<TransactionRecord>> {
        let result = self
            .call(
                "getTransaction",
                json!([signature, {"encoding": "json", "maxSupportedTransactionVersion": 0}]),
            )
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        let meta = result.get("meta").cloned().unwrap_or(Value::Null);
        let message = result
            .pointer("/transaction/message")
            .cloned()
            .unwrap_or(Value::Null);

        let instruction_count = message
            .get("instructions")
            .and_then(Value::as_array)
            .map(|a| a.len() as u64)
            .unwrap_or(0);

        let signer_count = result
            .pointer("/transaction/signatures")
            .and_then(Value::as_array)
            .map(|a| a.len() as u64)
            .unwrap_or(0);

        let balances = |key: &str| -> Vec<u64> {
            meta.get(key)
                .and_then(Value::as_array)
                .map(|arr| arr.iter().filter_map(Value::as_u64).collect())
                .unwrap_or_default()
        };

        let log_messages = meta
            .get("logMessages")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        let err = meta.get("err").cloned().filter(|v| !v.is_null());

        Ok(Some(TransactionRecord {
            instruction_count,
            signer_count,
            pre_balances: balances("preBalances"),
            post_balances: balances("postBalances"),
            err,
            log_messages,
        }))
    }
}

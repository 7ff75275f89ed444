//! A thin JSON-RPC 2.0 client over the Soroban RPC surface this crate needs:
//! `simulateTransaction`, `sendTransaction`, `getTransaction`. Building and
//! submitting the transaction envelope itself is handled by `envelope`; this
//! module only knows how to shuttle JSON-RPC requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;
use url::Url;

use crate::abi::ScVal;
use crate::b64;
use crate::backend::{ContractBackend, Simulation, SubmittedTransaction, TransactionOutcome, TransactionStatus};
use crate::error::{ContractError, Result};
use crate::xdr;

pub struct SorobanRpcClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl SorobanRpcClient {
    pub fn new(endpoint: Url) -> Self {
        Self { http: reqwest::Client::new(), endpoint }
    }

    #[instrument(skip(self, params), fields(method = method))]
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        #[derive(Serialize)]
        struct Request<'a> {
            jsonrpc: &'a str,
            id: u32,
            method: &'a str,
            params: Value,
        }
        #[derive(Deserialize)]
        struct RpcErrorBody {
            message: String,
        }
        #[derive(Deserialize)]
        struct Response {
            result: Option<Value>,
            error: Option<RpcErrorBody>,
        }

        let body = Request { jsonrpc: "2.0", id: 1, method, params };
        let response: Response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        match (response.result, response.error) {
            (Some(result), _) => Ok(result),
            (None, Some(err)) => Err(ContractError::RpcError(err.message)),
            (None, None) => Err(ContractError::RpcError("empty RPC response".to_string())),
        }
    }
}

#[async_trait::async_trait]
impl ContractBackend for SorobanRpcClient {
    #[instrument(skip(self, args), fields(contract_id, method))]
    async fn simulate(&self, contract_id: &str, method: &str, args: &[ScVal]) -> Result<Simulation> {
        let encoded_args: Vec<String> = args.iter().map(|a| b64::encode(xdr::encode(a))).collect();
        let params = json!({
            "transaction": {
                "contractId": contract_id,
                "method": method,
                "args": encoded_args,
            }
        });
        let result = self.call("simulateTransaction", params).await?;

        if let Some(err) = result.get("error").and_then(Value::as_str) {
            return Err(ContractError::Simulation(err.to_string()));
        }

        let transaction_data = result
            .get("transactionData")
            .and_then(Value::as_str)
            .ok_or(ContractError::Decode("simulation missing transactionData"))?
            .to_string();
        let min_resource_fee = result
            .get("minResourceFee")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);
        let return_xdr = result
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|r| r.get("xdr"))
            .and_then(Value::as_str)
            .ok_or(ContractError::Decode("simulation missing return value"))?;
        let return_bytes = b64::decode(return_xdr)
            .map_err(|_| ContractError::Decode("return value is not valid base64"))?;
        let result_val = xdr::decode(&return_bytes)?;

        Ok(Simulation { transaction_data, min_resource_fee, result: result_val })
    }

    #[instrument(skip(self, signed_envelope_xdr))]
    async fn submit_signed(&self, signed_envelope_xdr: &str) -> Result<SubmittedTransaction> {
        let params = json!({ "transaction": signed_envelope_xdr });
        let result = self.call("sendTransaction", params).await?;
        let status = result.get("status").and_then(Value::as_str).unwrap_or("");
        if status == "ERROR" {
            let message = result
                .get("errorResultXdr")
                .and_then(Value::as_str)
                .unwrap_or("submission rejected")
                .to_string();
            return Err(ContractError::RpcError(message));
        }
        let hash = result
            .get("hash")
            .and_then(Value::as_str)
            .ok_or(ContractError::Decode("sendTransaction missing hash"))?
            .to_string();
        Ok(SubmittedTransaction { hash })
    }

    #[instrument(skip(self))]
    async fn get_transaction(&self, hash: &str) -> Result<TransactionOutcome> {
        let params = json!({ "hash": hash });
        let result = self.call("getTransaction", params).await?;
        let status = result.get("status").and_then(Value::as_str).unwrap_or("NOT_FOUND");
        let status = match status {
            "SUCCESS" => TransactionStatus::Success,
            "FAILED" => TransactionStatus::Failed,
            _ => TransactionStatus::Pending,
        };

        let result_val = result
            .get("returnValue")
            .and_then(Value::as_str)
            .and_then(|xdr_str| b64::decode(xdr_str).ok())
            .and_then(|bytes| xdr::decode(&bytes).ok());

        let raw_result = result.get("resultXdr").and_then(Value::as_str).unwrap_or("execution failed");
        let error_code = if status == TransactionStatus::Failed { extract_error_code(raw_result) } else { None };
        let error_message = if status == TransactionStatus::Failed { Some(raw_result.to_string()) } else { None };

        Ok(TransactionOutcome { status, result: result_val, error_code, error_message })
    }
}

/// Pulls a contract error code out of the `Error(Contract, #N)` diagnostic
/// Soroban prints for a panicking contract call. Decoding the full
/// `TransactionResult` XDR to reach the same number is unnecessary when it is
/// already spelled out in that textual form.
fn extract_error_code(raw: &str) -> Option<i32> {
    const MARKER: &str = "Error(Contract, #";
    let start = raw.find(MARKER)? + MARKER.len();
    let rest = &raw[start..];
    let end = rest.find(')')?;
    rest[..end].parse::<i32>().ok()
}

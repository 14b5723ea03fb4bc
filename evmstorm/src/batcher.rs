//! Batched transaction submission.
//!
//! Partitions signed transactions into batches of size `B` (the last batch
//! may be short), posts every batch concurrently as one JSON-RPC array, and
//! merges the results. A batch that fails at the transport level is logged
//! and its transactions are dropped from the output — the run proceeds with
//! whatever submitted successfully.

use std::str::FromStr;

use alloy::primitives::{Bytes, TxHash};
use futures::future::join_all;
use rpc_client::RpcClient;
use tracing::{info, instrument, warn};

use crate::observer::ProgressObserver;

/// Outcome of submitting a batch of signed transactions.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Hashes of transactions the node accepted.
    pub hashes: Vec<TxHash>,
    /// Human-readable messages for transactions or batches that failed.
    pub errors: Vec<String>,
}

/// Submit every raw transaction in `raw_txs`, `batch_size` at a time,
/// dispatching all batches concurrently and awaiting all of them before
/// returning.
#[instrument(skip(client, raw_txs, observer), fields(count = raw_txs.len(), batch_size))]
pub async fn submit_all(
    client: &RpcClient,
    raw_txs: &[Bytes],
    batch_size: usize,
    observer: &dyn ProgressObserver,
) -> BatchOutcome {
    if raw_txs.is_empty() {
        return BatchOutcome::default();
    }

    let chunks: Vec<&[Bytes]> = raw_txs.chunks(batch_size.max(1)).collect();
    info!(batches = chunks.len(), batch_size, "dispatching submission batches");

    let futures = chunks.into_iter().map(|chunk| async move {
        let ids = client.next_ids(chunk.len());
        let requests: Vec<_> = ids
            .into_iter()
            .zip(chunk.iter())
            .map(|(id, tx)| RpcClient::send_raw_transaction_request(id, tx))
            .collect();

        let result = client.batch(&requests).await;
        (chunk.len(), result)
    });

    let batch_results = join_all(futures).await;

    let mut outcome = BatchOutcome::default();
    let mut completed = 0usize;
    let total = raw_txs.len();

    for (chunk_len, result) in batch_results {
        match result {
            Err(e) => {
                warn!(error = %e, chunk_len, "batch submission failed, dropping its transactions");
                outcome
                    .errors
                    .push(format!("batch of {chunk_len} transactions failed: {e}"));
            }
            Ok(responses) => {
                for response in responses {
                    if let Some(detail) = response.error {
                        outcome.errors.push(detail.message);
                        continue;
                    }
                    match response.result.as_ref().and_then(|v| v.as_str()) {
                        Some(hash_str) => match TxHash::from_str(hash_str) {
                            Ok(hash) => outcome.hashes.push(hash),
                            Err(e) => outcome.errors.push(format!("malformed transaction hash: {e}")),
                        },
                        None => outcome.errors.push("response missing transaction hash".into()),
                    }
                }
            }
        }
        completed += chunk_len;
        observer.on_item_completed("submit", total, completed);
    }

    info!(
        submitted = outcome.hashes.len(),
        failed = outcome.errors.len(),
        "submission batches complete"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn empty_input_returns_empty_outcome() {
        let client = RpcClient::new("https://example.com/rpc").expect("client creation failed");
        let outcome = submit_all(&client, &[], 20, &NoopObserver).await;
        assert!(outcome.hashes.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn dispatches_multiple_batches_concurrently() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(|req: &wiremock::Request| {
                let body: serde_json::Value = req.body_json().expect("request body must be JSON");
                let array = body.as_array().expect("batch body must be a JSON array");
                let responses: Vec<_> = array
                    .iter()
                    .map(|item| {
                        serde_json::json!({
                            "jsonrpc": "2.0",
                            "id": item["id"],
                            "result": "0x1111111111111111111111111111111111111111111111111111111111111111"
                        })
                    })
                    .collect();
                ResponseTemplate::new(200).set_body_json(serde_json::json!(responses))
            })
            .mount(&mock_server)
            .await;

        let client = RpcClient::new(mock_server.uri()).expect("client creation failed");
        let raw_txs: Vec<Bytes> = (0..5).map(|i| Bytes::from(vec![i as u8; 4])).collect();

        let outcome = submit_all(&client, &raw_txs, 2, &NoopObserver).await;
        assert_eq!(outcome.hashes.len(), 5);
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn per_element_errors_are_collected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"jsonrpc": "2.0", "id": 1, "error": {"code": -32000, "message": "nonce too low"}},
            ])))
            .mount(&mock_server)
            .await;

        let client = RpcClient::new(mock_server.uri()).expect("client creation failed");
        let raw_txs = vec![Bytes::from(vec![1u8, 2, 3])];

        let outcome = submit_all(&client, &raw_txs, 20, &NoopObserver).await;
        assert!(outcome.hashes.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("nonce too low"));
    }
}

use crate::core::ingest::IngestPipeline;
use crate::core::normalize::NormalizeRules;
use crate::domain::model::IngestResult;
use crate::domain::ports::DataSource;
use crate::utils::error::{Result, StoreMapError};
use std::sync::mpsc;
use std::thread;
use tokio::sync::oneshot;

const WORKER_THREAD_NAME: &str = "ingest-worker";

#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub source_url: String,
    pub rules: NormalizeRules,
}

#[derive(Debug)]
pub enum WorkerMessage {
    Ingest(IngestRequest),
    Terminate,
}

#[derive(Debug)]
pub enum IngestResponse {
    Success(IngestResult),
    Failure { message: String, offline: bool },
}

/// 在獨立執行緒上跑完整個載入流程，只以訊息往返
pub struct IngestWorker {
    sender: mpsc::Sender<WorkerMessage>,
    responses: Option<oneshot::Receiver<IngestResponse>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl IngestWorker {
    /// 啟動 worker 執行緒；每個 worker 只回覆一次
    pub fn spawn<D>(source: D) -> Result<Self>
    where
        D: DataSource + 'static,
    {
        let (sender, inbox) = mpsc::channel::<WorkerMessage>();
        let (reply, responses) = oneshot::channel::<IngestResponse>();

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || worker_main(source, inbox, reply))?;

        Ok(Self {
            sender,
            responses: Some(responses),
            handle: Some(handle),
        })
    }

    pub async fn request(&mut self, request: IngestRequest) -> Result<IngestResult> {
        let responses = self.responses.take().ok_or_else(|| StoreMapError::WorkerError {
            message: "worker already answered a request".to_string(),
            offline: false,
        })?;

        self.sender
            .send(WorkerMessage::Ingest(request))
            .map_err(|_| StoreMapError::WorkerError {
                message: "worker exited before receiving the request".to_string(),
                offline: false,
            })?;

        match responses.await {
            Ok(IngestResponse::Success(result)) => Ok(result),
            Ok(IngestResponse::Failure { message, offline }) => {
                Err(StoreMapError::WorkerError { message, offline })
            }
            Err(_) => Err(StoreMapError::WorkerError {
                message: "worker terminated without a response".to_string(),
                offline: false,
            }),
        }
    }

    /// 通知 worker 結束並等待執行緒收尾；執行緒正常結束時回傳 true
    pub async fn terminate(mut self) -> bool {
        let _ = self.sender.send(WorkerMessage::Terminate);

        let Some(handle) = self.handle.take() else {
            return false;
        };
        match tokio::task::spawn_blocking(move || handle.join()).await {
            Ok(Ok(())) => {
                tracing::debug!("Ingest worker terminated");
                true
            }
            Ok(Err(_)) => {
                tracing::warn!("Ingest worker panicked");
                false
            }
            Err(e) => {
                tracing::warn!("Failed to join ingest worker: {}", e);
                false
            }
        }
    }
}

/// 啟動 worker、送出單一請求，並在取得結果（成功或失敗）後關閉 worker
pub async fn run_ingest_job<D>(source: D, request: IngestRequest) -> Result<IngestResult>
where
    D: DataSource + 'static,
{
    let mut worker = IngestWorker::spawn(source)?;
    let outcome = worker.request(request).await;
    if !worker.terminate().await {
        tracing::warn!("Ingest worker did not shut down cleanly");
    }
    outcome
}

fn worker_main<D: DataSource>(
    source: D,
    inbox: mpsc::Receiver<WorkerMessage>,
    reply: oneshot::Sender<IngestResponse>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = reply.send(IngestResponse::Failure {
                message: format!("failed to start worker runtime: {}", e),
                offline: false,
            });
            return;
        }
    };

    let mut reply = Some(reply);

    while let Ok(message) = inbox.recv() {
        match message {
            WorkerMessage::Ingest(request) => {
                let Some(reply) = reply.take() else {
                    tracing::warn!("Ingest worker ignoring a second request");
                    continue;
                };

                let pipeline = IngestPipeline::new(&source, request.rules);
                let response = match runtime.block_on(pipeline.ingest(&request.source_url)) {
                    Ok(result) => IngestResponse::Success(result),
                    Err(e) => IngestResponse::Failure {
                        offline: e.is_offline(),
                        message: e.to_string(),
                    },
                };

                if reply.send(response).is_err() {
                    tracing::debug!("Ingest caller went away before the response arrived");
                }
            }
            WorkerMessage::Terminate => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticSource(Vec<u8>);

    #[async_trait]
    impl DataSource for StaticSource {
        async fn fetch(&self, _locator: &str) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl DataSource for FailingSource {
        async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
            Err(StoreMapError::HttpStatusError {
                url: locator.to_string(),
                status: 503,
            })
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl DataSource for PanickingSource {
        async fn fetch(&self, _locator: &str) -> Result<Vec<u8>> {
            panic!("simulated worker crash");
        }
    }

    fn request() -> IngestRequest {
        IngestRequest {
            source_url: "stores.json".to_string(),
            rules: NormalizeRules::default(),
        }
    }

    #[tokio::test]
    async fn test_worker_returns_ingest_result() {
        let body = json!({
            "keys": ["NAME", "py", "px"],
            "data": [["A", "25", "121"], ["B", "", "121"]],
            "last_updated": "2024-01-01"
        });

        let result = run_ingest_job(StaticSource(body.to_string().into_bytes()), request())
            .await
            .unwrap();

        assert_eq!(result.stores.len(), 1);
        assert_eq!(result.rejected, 1);
        assert_eq!(result.last_updated, "2024-01-01");
    }

    #[tokio::test]
    async fn test_worker_failure_is_reported_as_message() {
        let err = run_ingest_job(FailingSource, request()).await.unwrap_err();

        match err {
            StoreMapError::WorkerError { message, offline } => {
                assert!(message.contains("503"));
                assert!(!offline);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_worker_thread_exits_after_failure() {
        let mut worker = IngestWorker::spawn(FailingSource).unwrap();

        tokio_test::assert_err!(worker.request(request()).await);
        assert!(worker.terminate().await);
    }

    #[tokio::test]
    async fn test_panicked_worker_is_not_a_clean_shutdown() {
        let mut worker = IngestWorker::spawn(PanickingSource).unwrap();

        tokio_test::assert_err!(worker.request(request()).await);
        assert!(!worker.terminate().await);
    }

    #[tokio::test]
    async fn test_worker_crash_surfaces_as_worker_error() {
        let err = run_ingest_job(PanickingSource, request()).await.unwrap_err();
        assert!(matches!(err, StoreMapError::WorkerError { offline: false, .. }));
    }

    #[tokio::test]
    async fn test_worker_answers_only_once() {
        let mut worker = IngestWorker::spawn(StaticSource(b"[]".to_vec())).unwrap();

        tokio_test::assert_ok!(worker.request(request()).await);
        tokio_test::assert_err!(worker.request(request()).await);

        assert!(worker.terminate().await);
    }
}

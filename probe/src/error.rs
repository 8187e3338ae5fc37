use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("building runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("building http client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

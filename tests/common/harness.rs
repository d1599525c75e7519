//! Spawns the router on an ephemeral port.

use std::net::SocketAddr;
use std::sync::Arc;

use sentinel::config::Config;
use sentinel::embedding::{EmbeddingProvider, MockEmbeddingProvider};
use sentinel::gateway::{AppState, create_router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_test_server(provider: MockEmbeddingProvider) -> std::io::Result<TestServer> {
    let config = Config {
        port: 0,
        embedding_dim: provider.embedding_dim(),
        ..Default::default()
    };
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(provider);
    let app = create_router(AppState::new(provider, config));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer { addr, handle })
}

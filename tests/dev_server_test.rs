#![cfg(feature = "server")]

use softserve_map::adapters::server::DevServer;
use tempfile::TempDir;
use tokio::sync::oneshot;

#[tokio::test]
async fn test_dev_server_serves_directory_index() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("index.html"), "<h1>霜淇淋地圖</h1>").unwrap();
    std::fs::write(temp_dir.path().join("stores.json"), "[]").unwrap();

    let server = DevServer::bind(temp_dir.path(), "127.0.0.1", 0).await.unwrap();
    let addr = server.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve_until(async {
        let _ = shutdown_rx.await;
    }));

    let index = reqwest::get(format!("http://{}/", addr)).await.unwrap();
    assert_eq!(index.status(), 200);
    assert!(index.text().await.unwrap().contains("霜淇淋地圖"));

    let data = reqwest::get(format!("http://{}/stores.json", addr)).await.unwrap();
    assert_eq!(data.text().await.unwrap(), "[]");

    let missing = reqwest::get(format!("http://{}/missing.json", addr)).await.unwrap();
    assert_eq!(missing.status(), 404);

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

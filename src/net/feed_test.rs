use super::*;

#[test]
fn feed_url_maps_http_to_ws() {
    assert_eq!(feed_url("http://localhost:8000", "abc123").unwrap(), "ws://localhost:8000/ws/oracle/abc123");
}

#[test]
fn feed_url_maps_https_to_wss_and_trims_slash() {
    assert_eq!(
        feed_url("https://oracle.example.test/", "BOND_1").unwrap(),
        "wss://oracle.example.test/ws/oracle/BOND_1"
    );
}

#[test]
fn feed_url_rejects_other_schemes() {
    assert!(matches!(feed_url("ftp://host", "x"), Err(ApiError::InvalidBaseUrl(_))));
    assert!(matches!(feed_url("localhost:8000", "x"), Err(ApiError::InvalidBaseUrl(_))));
}

#[tokio::test]
async fn dispose_signals_shutdown() {
    let (tx, rx) = oneshot::channel();
    FeedDisposer::new(tx).dispose();
    assert_eq!(rx.await, Ok(()));
}

#[tokio::test]
async fn dropping_disposer_signals_shutdown() {
    let (tx, rx) = oneshot::channel();
    let disposer = FeedDisposer::new(tx);
    drop(disposer);
    assert_eq!(rx.await, Ok(()));
}

#[tokio::test]
async fn subscription_yields_frames_in_arrival_order() {
    let (frames_tx, frames_rx) = mpsc::channel(4);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let mut sub = FeedSubscription::new("abc123", frames_rx, FeedDisposer::new(shutdown_tx));

    frames_tx.send("one".to_owned()).await.unwrap();
    frames_tx.send("two".to_owned()).await.unwrap();

    assert_eq!(sub.bond_id(), "abc123");
    assert_eq!(sub.try_recv().as_deref(), Ok("one"));
    assert_eq!(sub.recv().await.as_deref(), Some("two"));
    assert_eq!(sub.try_recv(), Err(TryRecvError::Empty));
    assert!(shutdown_rx.try_recv().is_err());

    drop(frames_tx);
    assert_eq!(sub.try_recv(), Err(TryRecvError::Disconnected));
    assert_eq!(sub.recv().await, None);

    sub.dispose();
    assert_eq!(shutdown_rx.await, Ok(()));
}

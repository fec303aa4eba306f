//! Integration tests for the link crate: station resolution over the real
//! event queue and telemetry service over loopback TCP.

use std::sync::Arc;

use roto_common::state::StateStore;
use roto_common::wire::{self, HEADER_LEN, SNAPSHOT_LEN};
use roto_link::station::{
    LinkEvent, LinkState, ScriptedStation, StationFsm, ready_signal, run_station, wait_ready,
};
use roto_link::telemetry;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

// ─── Station ────────────────────────────────────────────────────────

#[tokio::test]
async fn station_resolves_connected_after_transient_failures() {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (ready_tx, mut ready_rx) = ready_signal();

    // Two failed attempts, then success.
    let driver = ScriptedStation::new(
        &events_tx,
        [LinkEvent::Disconnected, LinkEvent::Disconnected],
    );
    tokio::spawn(run_station(StationFsm::new(100), driver, events_rx, ready_tx));

    events_tx.send(LinkEvent::StationStart).unwrap();
    assert_eq!(wait_ready(&mut ready_rx).await, Some(LinkState::Connected));
}

#[tokio::test]
async fn station_resolves_failed_on_budget_exhaustion() {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (ready_tx, mut ready_rx) = ready_signal();

    // Every attempt fails; budget of 2 exhausts on the second loss.
    let driver = ScriptedStation::new(
        &events_tx,
        [LinkEvent::Disconnected, LinkEvent::Disconnected],
    );
    tokio::spawn(run_station(StationFsm::new(2), driver, events_rx, ready_tx));

    events_tx.send(LinkEvent::StationStart).unwrap();
    assert_eq!(wait_ready(&mut ready_rx).await, Some(LinkState::Failed));
}

#[tokio::test]
async fn startup_wait_cancels_on_shutdown() {
    let (events_tx, events_rx) = mpsc::unbounded_channel::<LinkEvent>();
    let (ready_tx, mut ready_rx) = ready_signal();

    let driver = ScriptedStation::immediate(&events_tx);
    let station = tokio::spawn(run_station(StationFsm::new(100), driver, events_rx, ready_tx));

    // Never start the station; shutting down closes the event queue and the
    // unresolved wait must end cleanly.
    drop(events_tx);
    station.await.unwrap();
    assert_eq!(wait_ready(&mut ready_rx).await, None);
}

// ─── Telemetry ──────────────────────────────────────────────────────

async fn spawn_server(store: Arc<StateStore>, max_frame_len: u32) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(telemetry::serve(listener, store, max_frame_len));
    addr
}

async fn send_command(stream: &mut TcpStream, payload: &[u8]) {
    stream
        .write_all(&wire::encode_header(payload.len() as u32))
        .await
        .unwrap();
    stream.write_all(payload).await.unwrap();
}

async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut header = [0u8; HEADER_LEN];
    stream.read_exact(&mut header).await.unwrap();
    let len = wire::decode_header(header) as usize;
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await.unwrap();
    payload
}

#[tokio::test]
async fn command_frame_answered_with_snapshot() {
    let store = Arc::new(StateStore::new(122_000, 22_000));
    store.commit_sample(roto_common::state::Axis::Azim, 2000, 40_000);
    let addr = spawn_server(store.clone(), 4096).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    send_command(&mut stream, b"abc").await;

    let payload = read_frame(&mut stream).await;
    assert_eq!(payload.len(), SNAPSHOT_LEN);
    let snap = wire::decode_snapshot(&payload).unwrap();
    assert_eq!(snap, store.snapshot());
    assert_eq!(snap.val_azim, 40_000);
    assert_eq!(snap.tgt_azim, 122_000);
}

#[tokio::test]
async fn connection_is_persistent_and_snapshots_are_live() {
    let store = Arc::new(StateStore::new(122_000, 22_000));
    let addr = spawn_server(store.clone(), 4096).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();

    send_command(&mut stream, &[0x01]).await;
    let first = wire::decode_snapshot(&read_frame(&mut stream).await).unwrap();
    assert_eq!(first.tgt_azim, 122_000);

    // State moves between requests on the same connection.
    store.set_targets(150_000, 30_000);
    send_command(&mut stream, &[0x02]).await;
    let second = wire::decode_snapshot(&read_frame(&mut stream).await).unwrap();
    assert_eq!(second.tgt_azim, 150_000);
    assert_eq!(second.tgt_elev, 30_000);
}

#[tokio::test]
async fn zero_length_frame_is_a_keepalive() {
    let store = Arc::new(StateStore::new(122_000, 22_000));
    let before = store.snapshot();
    let addr = spawn_server(store.clone(), 4096).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(&wire::encode_header(0)).await.unwrap();

    // Reply is an empty frame.
    let payload = read_frame(&mut stream).await;
    assert!(payload.is_empty());
    assert_eq!(store.snapshot(), before);

    // The stream stays aligned: a real command still works afterwards.
    send_command(&mut stream, b"next").await;
    let snap = wire::decode_snapshot(&read_frame(&mut stream).await).unwrap();
    assert_eq!(snap, before);
}

#[tokio::test]
async fn oversized_frame_is_rejected_without_touching_state() {
    let store = Arc::new(StateStore::new(122_000, 22_000));
    let before = store.snapshot();
    let addr = spawn_server(store.clone(), 64).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(&wire::encode_header(65)).await.unwrap();

    // The server drops the connection; no reply arrives.
    let mut buf = [0u8; 1];
    let n = stream.read(&mut buf).await.unwrap();
    assert_eq!(n, 0, "expected EOF after protocol violation");
    assert_eq!(store.snapshot(), before);

    // Other clients are unaffected.
    let mut other = TcpStream::connect(addr).await.unwrap();
    send_command(&mut other, b"ok").await;
    let snap = wire::decode_snapshot(&read_frame(&mut other).await).unwrap();
    assert_eq!(snap, before);
}

//! Integration tests for the Unix socket transport.
//!
//! Each test binds a listener on a temporary path, runs the accept loop
//! in a background task, and drives it with real client connections.

#![cfg(unix)]

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::task::JoinHandle;

use echo_mcp::mcp::socket::{bind, serve};
use echo_mcp::mcp::{Dispatcher, ServerInfo};
use echo_mcp::tools::{PipeEchoTool, ToolRegistry};

fn dispatcher() -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(
        ServerInfo::new("named-pipe-mcp-server"),
        ToolRegistry::with_tool(PipeEchoTool),
    ))
}

/// Binds at `path` and spawns the accept loop.
fn start_server(path: &Path) -> JoinHandle<std::io::Result<()>> {
    let listener = bind(path).expect("bind should succeed");
    tokio::spawn(serve(listener, dispatcher()))
}

/// Sends one raw chunk and reads back one newline-terminated reply.
async fn send_chunk(stream: &mut BufReader<UnixStream>, chunk: &str) -> Value {
    stream.get_mut().write_all(chunk.as_bytes()).await.unwrap();

    let mut line = String::new();
    stream.read_line(&mut line).await.unwrap();
    serde_json::from_str(&line).unwrap()
}

async fn connect(path: &Path) -> BufReader<UnixStream> {
    BufReader::new(UnixStream::connect(path).await.unwrap())
}

#[tokio::test]
async fn initialize_over_socket() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");
    let server = start_server(&path);

    let mut client = connect(&path).await;
    let reply = send_chunk(
        &mut client,
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
    )
    .await;

    assert_eq!(reply["id"], 1);
    assert_eq!(reply["result"]["serverInfo"]["name"], "named-pipe-mcp-server");
    assert_eq!(reply["result"]["capabilities"]["tools"]["listChanged"], true);

    server.abort();
}

#[tokio::test]
async fn pipe_echo_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");
    let server = start_server(&path);

    let mut client = connect(&path).await;
    let reply = send_chunk(
        &mut client,
        r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"pipe_echo","arguments":{"message":"hi"}}}"#,
    )
    .await;

    assert_eq!(reply["id"], 5);
    assert_eq!(reply["result"]["content"][0]["text"], "Named Pipe Echo: hi");

    server.abort();
}

#[tokio::test]
async fn concurrent_clients_get_matched_responses() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");
    let server = start_server(&path);

    let path_a = path.clone();
    let client_a = tokio::spawn(async move {
        let mut client = connect(&path_a).await;
        send_chunk(
            &mut client,
            r#"{"jsonrpc":"2.0","id":"client-a","method":"initialize","params":{}}"#,
        )
        .await
    });

    let path_b = path.clone();
    let client_b = tokio::spawn(async move {
        let mut client = connect(&path_b).await;
        send_chunk(
            &mut client,
            r#"{"jsonrpc":"2.0","id":"client-b","method":"initialize","params":{}}"#,
        )
        .await
    });

    let reply_a = client_a.await.unwrap();
    let reply_b = client_b.await.unwrap();

    assert_eq!(reply_a["id"], "client-a");
    assert_eq!(reply_b["id"], "client-b");
    assert_eq!(reply_a["result"]["serverInfo"]["name"], "named-pipe-mcp-server");
    assert_eq!(reply_b["result"]["serverInfo"]["name"], "named-pipe-mcp-server");

    server.abort();
}

#[tokio::test]
async fn one_connection_serves_a_request_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");
    let server = start_server(&path);

    let mut client = connect(&path).await;

    let reply = send_chunk(
        &mut client,
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
    )
    .await;
    assert_eq!(reply["id"], 1);

    let reply = send_chunk(
        &mut client,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list","params":{}}"#,
    )
    .await;
    let tools = reply["result"]["tools"].as_array().unwrap();
    assert_eq!(tools[0]["name"], "pipe_echo");

    let reply = send_chunk(
        &mut client,
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"unknown","arguments":{}}}"#,
    )
    .await;
    assert_eq!(reply["error"]["code"], -32601);
    assert_eq!(reply["error"]["message"], "Unknown tool: unknown");

    server.abort();
}

#[tokio::test]
async fn malformed_chunk_gets_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");
    let server = start_server(&path);

    let mut client = connect(&path).await;
    let reply = send_chunk(&mut client, "   {not json}   ").await;

    assert_eq!(reply["id"], 1);
    assert_eq!(reply["error"]["code"], -32700);
    assert!(reply["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Parse error: "));

    server.abort();
}

#[tokio::test]
async fn disconnect_leaves_listener_serving_others() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");
    let server = start_server(&path);

    // First client connects and hangs up without sending anything.
    let early = UnixStream::connect(&path).await.unwrap();
    drop(early);

    // A later client is still served.
    let mut client = connect(&path).await;
    let reply = send_chunk(
        &mut client,
        r#"{"jsonrpc":"2.0","id":9,"method":"initialize","params":{}}"#,
    )
    .await;
    assert_eq!(reply["id"], 9);

    server.abort();
}

#[tokio::test]
async fn bind_removes_stale_socket_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");

    // Leave a stale artifact at the path, as a crashed server would.
    std::fs::write(&path, b"stale").unwrap();

    let listener = bind(&path).expect("bind must replace the stale file");
    drop(listener);
}

#[tokio::test]
async fn notification_chunk_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.sock");
    let server = start_server(&path);

    let mut client = connect(&path).await;
    client
        .get_mut()
        .write_all(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await
        .unwrap();
    client.get_mut().shutdown().await.unwrap();

    // The handler suppresses the notification and then sees the closed
    // write half; the client reads EOF with zero output units received.
    let mut line = String::new();
    let n = client.read_line(&mut line).await.unwrap();
    assert_eq!(n, 0, "notification must produce no output");

    server.abort();
}

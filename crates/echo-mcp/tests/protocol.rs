//! Dispatcher tests: session gating, method routing, tool calls, and error shapes.

use serde_json::{json, Value};

use echo_mcp::protocol::{ProtocolHandler, SessionState};
use echo_mcp::tools::ToolRegistry;
use echo_mcp::types::*;

// ─────────────────────── helpers ───────────────────────

/// Build an MCP JSON-RPC request.
fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

/// Build an initialize request.
fn init_request() -> Value {
    mcp_request(
        0,
        "initialize",
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }),
    )
}

/// Send a JSON-RPC message through the handler and return the response.
fn send(handler: &mut ProtocolHandler, msg: Value) -> Option<Value> {
    let payload = serde_json::to_vec(&msg).unwrap();
    handler.handle_payload(&payload)
}

/// Send and unwrap the response.
fn send_unwrap(handler: &mut ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).expect("expected response")
}

/// A handler that has completed the handshake.
fn ready_handler() -> ProtocolHandler {
    let mut handler = ProtocolHandler::new(ToolRegistry::builtin());
    send_unwrap(&mut handler, init_request());
    handler
}

// ═══════════════════════════════════════════════════════
// INITIALIZATION
// ═══════════════════════════════════════════════════════

#[test]
fn test_initialize_returns_capabilities_and_identity() {
    let mut handler = ProtocolHandler::new(ToolRegistry::builtin());
    assert_eq!(handler.session().state(), SessionState::Uninitialized);

    let resp = send_unwrap(&mut handler, init_request());
    assert_eq!(resp["jsonrpc"], "2.0");
    assert_eq!(resp["id"], 0);
    assert!(resp.get("error").is_none(), "got: {resp}");

    let result = &resp["result"];
    assert_eq!(result["capabilities"]["tools"]["list"], true);
    assert_eq!(result["capabilities"]["tools"]["call"], true);
    assert_eq!(result["serverInfo"]["name"], "echo-mcp");
    assert_eq!(result["serverInfo"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(result["protocolVersion"], MCP_VERSION);

    assert_eq!(handler.session().state(), SessionState::Ready);
    assert_eq!(
        handler.session().client().map(|c| c.name.clone()),
        Some("test-client".to_string())
    );
}

#[test]
fn test_initialize_without_params() {
    let mut handler = ProtocolHandler::default();
    let resp = send_unwrap(
        &mut handler,
        json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize" }),
    );
    assert!(resp.get("result").is_some());
    assert!(handler.session().is_ready());
}

#[test]
fn test_requests_before_initialize_are_rejected() {
    let mut handler = ProtocolHandler::default();

    for (i, method) in ["ping", "tools/list", "tools/call", "shutdown", "does/not/exist"]
        .iter()
        .enumerate()
    {
        let resp = send_unwrap(
            &mut handler,
            mcp_request(i as i64, method, json!({ "name": "echo", "arguments": { "text": "x" } })),
        );
        assert!(resp.get("result").is_none(), "{method} must not succeed: {resp}");
        assert_eq!(resp["error"]["code"], error_codes::INVALID_REQUEST);
        assert_eq!(
            resp["error"]["message"],
            "Invalid request: Server has not been initialized"
        );
        assert_eq!(resp["id"], i as i64);
    }

    assert_eq!(handler.session().state(), SessionState::Uninitialized);
}

#[test]
fn test_second_initialize_is_not_a_handshake() {
    let mut handler = ready_handler();
    let client_before = handler.session().client().cloned();

    let resp = send_unwrap(
        &mut handler,
        mcp_request(
            5,
            "initialize",
            json!({ "clientInfo": { "name": "other", "version": "9" } }),
        ),
    );
    assert_eq!(resp["error"]["code"], error_codes::METHOD_NOT_FOUND);
    assert_eq!(resp["id"], 5);

    // The handshake side effects did not run again.
    assert_eq!(handler.session().client().cloned(), client_before);
    assert!(handler.session().is_ready());
}

// ═══════════════════════════════════════════════════════
// METHODS
// ═══════════════════════════════════════════════════════

#[test]
fn test_ping() {
    let mut handler = ready_handler();
    let resp = send_unwrap(&mut handler, mcp_request(1, "ping", Value::Null));
    assert_eq!(resp["result"], json!({ "result": "pong" }));
}

#[test]
fn test_tools_list_contains_echo() {
    let mut handler = ready_handler();
    let resp = send_unwrap(&mut handler, mcp_request(2, "tools/list", json!({})));

    let tools = resp["result"]["tools"].as_array().expect("tools array");
    let echo = tools
        .iter()
        .find(|t| t["name"] == "echo")
        .expect("echo listed");
    assert_eq!(
        echo["description"],
        "Return the same text that the caller provides."
    );
    assert_eq!(echo["inputSchema"]["type"], "object");
    assert_eq!(echo["inputSchema"]["properties"]["text"]["type"], "string");
    assert_eq!(echo["inputSchema"]["required"], json!(["text"]));
    assert!(resp["result"].get("nextCursor").is_none());
}

#[test]
fn test_tools_call_echo() {
    let mut handler = ready_handler();
    let resp = send_unwrap(
        &mut handler,
        mcp_request(
            3,
            "tools/call",
            json!({ "name": "echo", "arguments": { "text": "hello" } }),
        ),
    );
    assert_eq!(
        resp["result"],
        json!({ "content": [{ "type": "text", "text": "hello" }] })
    );
}

#[test]
fn test_tools_call_echo_lenient_arguments() {
    let mut handler = ready_handler();

    for params in [
        json!({ "name": "echo" }),
        json!({ "name": "echo", "arguments": null }),
        json!({ "name": "echo", "arguments": {} }),
        json!({ "name": "echo", "arguments": { "text": 12 } }),
    ] {
        let resp = send_unwrap(&mut handler, mcp_request(4, "tools/call", params.clone()));
        assert_eq!(
            resp["result"]["content"][0]["text"], "",
            "params {params} gave {resp}"
        );
    }
}

#[test]
fn test_tools_call_unknown_tool_is_internal_error() {
    let mut handler = ready_handler();
    let resp = send_unwrap(
        &mut handler,
        mcp_request(6, "tools/call", json!({ "name": "nope", "arguments": {} })),
    );
    assert!(resp.get("result").is_none());
    assert_eq!(resp["error"]["code"], error_codes::INTERNAL_ERROR);
    assert!(resp["error"]["message"].as_str().unwrap().contains("nope"));
}

#[test]
fn test_tools_call_missing_params() {
    let mut handler = ready_handler();

    let absent = send_unwrap(
        &mut handler,
        json!({ "jsonrpc": "2.0", "id": 7, "method": "tools/call" }),
    );
    assert_eq!(absent["error"]["code"], error_codes::INVALID_REQUEST);
    assert_eq!(
        absent["error"]["message"],
        "Invalid request: Missing params for tools/call"
    );

    let null = send_unwrap(&mut handler, mcp_request(8, "tools/call", Value::Null));
    assert_eq!(null["error"]["code"], error_codes::INVALID_REQUEST);
}

#[test]
fn test_tools_call_bad_params_shape() {
    let mut handler = ready_handler();

    for params in [
        json!({}),
        json!({ "name": 5 }),
        json!({ "name": "echo", "arguments": "text" }),
        json!("echo"),
    ] {
        let resp = send_unwrap(&mut handler, mcp_request(9, "tools/call", params.clone()));
        assert_eq!(
            resp["error"]["code"],
            error_codes::INTERNAL_ERROR,
            "params {params} gave {resp}"
        );
    }
}

#[test]
fn test_shutdown_acknowledges_and_session_continues() {
    let mut handler = ready_handler();
    let resp = send_unwrap(&mut handler, mcp_request(10, "shutdown", Value::Null));
    assert_eq!(resp["result"], json!({}));

    let after = send_unwrap(&mut handler, mcp_request(11, "ping", Value::Null));
    assert!(after.get("result").is_some());
}

#[test]
fn test_unknown_method() {
    let mut handler = ready_handler();
    let resp = send_unwrap(&mut handler, mcp_request(12, "resources/list", json!({})));
    assert_eq!(resp["error"]["code"], error_codes::METHOD_NOT_FOUND);
    assert_eq!(resp["error"]["message"], "Method not found: resources/list");
}

#[test]
fn test_registered_method_is_dispatched() {
    fn version(_: &ProtocolHandler, _: Option<Value>) -> McpResult<Value> {
        Ok(json!({ "version": SERVER_VERSION }))
    }

    let mut handler = ready_handler();
    handler.register_method("server/version", version);
    let resp = send_unwrap(&mut handler, mcp_request(13, "server/version", Value::Null));
    assert_eq!(resp["result"]["version"], SERVER_VERSION);
}

#[test]
fn test_registered_notification_is_dispatched() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SEEN: AtomicUsize = AtomicUsize::new(0);
    fn progress(_: &ProtocolHandler, params: Option<Value>) {
        if params.is_some() {
            SEEN.fetch_add(1, Ordering::SeqCst);
        }
    }

    let mut handler = ready_handler();
    handler.register_notification("notifications/progress", progress);
    let resp = send(
        &mut handler,
        json!({ "jsonrpc": "2.0", "method": "notifications/progress", "params": { "progress": 1 } }),
    );
    assert!(resp.is_none());
    assert_eq!(SEEN.load(Ordering::SeqCst), 1);
}

// ═══════════════════════════════════════════════════════
// ENVELOPES
// ═══════════════════════════════════════════════════════

#[test]
fn test_ids_are_echoed_verbatim() {
    let mut handler = ready_handler();

    let ids = [
        json!("abc-1"),
        json!(42),
        json!(-7),
        json!(3.25),
        json!(true),
        json!(false),
        Value::Null,
    ];
    for id in ids {
        let resp = send_unwrap(
            &mut handler,
            json!({ "jsonrpc": "2.0", "id": id, "method": "ping" }),
        );
        assert_eq!(resp["id"], id);
        assert!(resp.as_object().unwrap().contains_key("id"));
    }
}

#[test]
fn test_large_integer_id_is_echoed_digit_for_digit() {
    let mut handler = ready_handler();

    let resp = handler
        .handle_payload(br#"{"jsonrpc":"2.0","id":18446744073709551616,"method":"ping"}"#)
        .expect("response");
    assert_eq!(serde_json::to_string(&resp["id"]).unwrap(), "18446744073709551616");
    assert!(resp.get("result").is_some());

    let wire = serde_json::to_string(&resp).unwrap();
    assert!(wire.contains(r#""id":18446744073709551616"#));
}

#[test]
fn test_structured_id_is_a_parse_error() {
    let mut handler = ready_handler();
    let resp = handler
        .handle_payload(br#"{"jsonrpc":"2.0","id":{"n":1},"method":"ping"}"#)
        .expect("response");
    assert_eq!(resp["error"]["code"], error_codes::PARSE_ERROR);
    assert_eq!(resp["id"], Value::Null);
}

#[test]
fn test_parse_error_has_null_id_and_session_survives() {
    let mut handler = ready_handler();

    let resp = handler.handle_payload(br#"{"broken":"#).expect("parse error response");
    assert_eq!(resp["error"]["code"], error_codes::PARSE_ERROR);
    assert_eq!(resp["id"], Value::Null);
    assert!(resp.as_object().unwrap().contains_key("id"));

    let ok = send_unwrap(&mut handler, mcp_request(14, "ping", Value::Null));
    assert!(ok.get("result").is_some());
}

#[test]
fn test_non_object_payloads_are_parse_errors() {
    let mut handler = ProtocolHandler::default();
    let payloads: [&[u8]; 4] = [b"[]", b"\"hi\"", b"", b"\xff\xfe"];
    for payload in payloads {
        let resp = handler.handle_payload(payload).expect("response");
        assert_eq!(resp["error"]["code"], error_codes::PARSE_ERROR);
    }
}

#[test]
fn test_notifications_never_respond() {
    let mut handler = ProtocolHandler::default();

    // Before initialize.
    assert!(send(
        &mut handler,
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })
    )
    .is_none());

    let mut handler = ready_handler();
    for method in [
        "notifications/initialized",
        "notifications/cancelled",
        "notifications/unknown",
        "tools/call",
    ] {
        let resp = send(
            &mut handler,
            json!({ "jsonrpc": "2.0", "method": method, "params": { "requestId": 1 } }),
        );
        assert!(resp.is_none(), "{method} notification produced {resp:?}");
    }
}

#[test]
fn test_foreign_version_dropped_silently() {
    let mut handler = ready_handler();
    assert!(send(&mut handler, json!({ "jsonrpc": "1.0", "id": 1, "method": "ping" })).is_none());
    assert!(send(&mut handler, json!({ "id": 1, "method": "ping" })).is_none());
}

#[test]
fn test_responses_and_malformed_shapes_ignored() {
    let mut handler = ready_handler();
    assert!(send(&mut handler, json!({ "jsonrpc": "2.0", "id": 1, "result": {} })).is_none());
    assert!(send(
        &mut handler,
        json!({ "jsonrpc": "2.0", "id": 1, "error": { "code": 1, "message": "x" } })
    )
    .is_none());
    assert!(send(&mut handler, json!({ "jsonrpc": "2.0", "id": 1 })).is_none());
    assert!(send(&mut handler, json!({ "jsonrpc": "2.0" })).is_none());
}

#[test]
fn test_every_response_has_exactly_one_outcome() {
    let mut handler = ProtocolHandler::default();
    let messages = vec![
        mcp_request(1, "ping", Value::Null),
        init_request(),
        mcp_request(2, "ping", Value::Null),
        mcp_request(3, "tools/call", json!({ "name": "missing" })),
        mcp_request(4, "nothing", Value::Null),
    ];

    for msg in messages {
        let resp = send_unwrap(&mut handler, msg);
        let has_result = resp.get("result").is_some();
        let has_error = resp.get("error").is_some();
        assert!(has_result ^ has_error, "bad response {resp}");
        if has_error {
            assert!(resp["error"]["code"].is_i64());
            assert!(resp["error"]["message"].is_string());
        }
    }
}

use std::io::{self, Stdout, Write};

use serde::Serialize;

#[derive(Serialize)]
struct JsonRpcResponse<'a> {
    jsonrpc: &'a str,
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcErrorBody>,
}

#[derive(Serialize)]
struct JsonRpcErrorBody {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct JsonRpcNotification<'a> {
    jsonrpc: &'a str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<serde_json::Value>,
}

/// Newline-delimited JSON-RPC writer. Production engines write to stdout;
/// tests hand in a `Vec<u8>`.
pub struct NdjsonTransport<W: Write = Stdout> {
    out: W,
}

impl NdjsonTransport<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> NdjsonTransport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_response(&mut self, id: u64, result: serde_json::Value) {
        self.write_line(&JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        });
    }

    pub fn write_error(
        &mut self,
        id: u64,
        code: i32,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) {
        self.write_line(&JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcErrorBody {
                code,
                message: message.into(),
                data,
            }),
        });
    }

    pub fn write_notification(&mut self, method: &str, params: serde_json::Value) {
        self.write_line(&JsonRpcNotification {
            jsonrpc: "2.0",
            method,
            params: Some(params),
        });
    }

    /// Forward drained engine events as notifications, one line each.
    pub fn write_events<E: Serialize>(&mut self, method: &str, events: Vec<E>) {
        for event in events {
            match serde_json::to_value(&event) {
                Ok(params) => self.write_notification(method, params),
                Err(e) => tracing::error!("Failed to serialize event: {}", e),
            }
        }
    }

    fn write_line(&mut self, value: &impl Serialize) {
        if let Err(e) = serde_json::to_writer(&mut self.out, value) {
            tracing::error!("Failed to serialize: {}", e);
            return;
        }
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(transport: NdjsonTransport<Vec<u8>>) -> Vec<serde_json::Value> {
        let buf = transport.into_inner();
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn response_and_error_are_one_line_each() {
        let mut t = NdjsonTransport::new(Vec::new());
        t.write_response(1, serde_json::json!({"ok": true}));
        t.write_error(2, -32601, "nope", None);

        let out = lines(t);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["result"]["ok"], true);
        assert!(out[0].get("error").is_none());
        assert_eq!(out[1]["error"]["code"], -32601);
        assert!(out[1]["error"].get("data").is_none());
    }

    #[test]
    fn events_become_notifications() {
        let mut t = NdjsonTransport::new(Vec::new());
        t.write_events("vfs/event", vec![serde_json::json!({"type": "mkdir"})]);

        let out = lines(t);
        assert_eq!(out[0]["method"], "vfs/event");
        assert!(out[0].get("id").is_none());
        assert_eq!(out[0]["params"]["type"], "mkdir");
    }
}

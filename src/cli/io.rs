//! JSON output for the CLI
//!
//! - One JSON object per invocation on stdout
//! - `{"status":"ok","data":...}` or `{"status":"error","code":...,"message":...}`

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::CliResult;

/// Wraps command output in a success envelope.
pub fn ok_envelope(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

/// Wraps an error in a failure envelope.
pub fn error_envelope(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_line<W: Write>(writer: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&mut io::stdout(), &ok_envelope(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&mut io::stdout(), &error_envelope(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopes_are_single_line() {
        let mut buffer = Vec::new();
        write_line(&mut buffer, &ok_envelope(json!({"keys": 3}))).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "{\"data\":{\"keys\":3},\"status\":\"ok\"}\n");

        let error = error_envelope("PREF_CLI_UNKNOWN_KEY", "no such key");
        assert_eq!(error["status"], "error");
        assert_eq!(error["code"], "PREF_CLI_UNKNOWN_KEY");
    }
}

use std::io::Write;

use serde_json::Value;

use crate::error::CliError;

/// Writes one JSON document to stdout.
pub fn render(value: &Value, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{payload}")?;
    Ok(())
}

//! Output formatting for human and JSON modes.

use nosql::{Bytes, Entry, Error};
use serde_json::json;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Result of one command.
#[derive(Debug)]
pub enum Output {
    Ok,
    Value(Bytes),
    Swap { value: Bytes, swapped: bool },
    Entries(Vec<Entry>),
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Render an output; empty string means print nothing.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => match output {
            Output::Ok => "OK".to_string(),
            Output::Value(v) => text(v),
            Output::Swap { value, swapped } => {
                format!("{} ({})", text(value), if *swapped { "swapped" } else { "not swapped" })
            }
            Output::Entries(entries) => {
                let mut lines: Vec<String> = entries
                    .iter()
                    .map(|e| format!("{}\t{}", text(&e.key), text(&e.value)))
                    .collect();
                lines.sort();
                lines.join("\n")
            }
        },
        OutputMode::Json => {
            let value = match output {
                Output::Ok => json!({ "ok": true }),
                Output::Value(v) => json!({ "value": text(v) }),
                Output::Swap { value, swapped } => json!({
                    "value": text(value),
                    "swapped": swapped,
                }),
                Output::Entries(entries) => {
                    let mut items: Vec<_> = entries
                        .iter()
                        .map(|e| (text(&e.key), text(&e.value)))
                        .collect();
                    items.sort();
                    json!(items
                        .into_iter()
                        .map(|(key, value)| json!({ "key": key, "value": value }))
                        .collect::<Vec<_>>())
                }
            };
            value.to_string()
        }
    }
}

/// Render an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format!("(error) {}", err),
        OutputMode::Json => json!({
            "error": err.to_string(),
            "kind": format!("{:?}", err.kind()),
        })
        .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human() {
        assert_eq!(format_output(&Output::Ok, OutputMode::Human), "OK");
        assert_eq!(
            format_output(
                &Output::Swap {
                    value: Bytes::from_static(b"v1"),
                    swapped: false
                },
                OutputMode::Human
            ),
            "v1 (not swapped)"
        );
    }

    #[test]
    fn test_entries_sorted() {
        let entries = vec![
            Entry::new("t", "b", "2"),
            Entry::new("t", "a", "1"),
        ];
        let output = Output::Entries(entries);
        assert_eq!(format_output(&output, OutputMode::Human), "a\t1\nb\t2");
        assert_eq!(
            format_output(&output, OutputMode::Json),
            r#"[{"key":"a","value":"1"},{"key":"b","value":"2"}]"#
        );
    }

    #[test]
    fn test_json_error() {
        let err = Error::KeyNotFound("k".into());
        let rendered: serde_json::Value =
            serde_json::from_str(&format_error(&err, OutputMode::Json)).unwrap();
        assert_eq!(rendered["error"], "key not found: k");
        assert_eq!(rendered["kind"], "Storage");
    }
}

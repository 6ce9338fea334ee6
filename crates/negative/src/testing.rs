//! Shared test fixtures

use std::io;
use std::sync::{Arc, Mutex};

use negative_dom::Document;

/// div#app.shell.main > ul#first (li A, li B) + ul#second (li.x C)
pub(crate) fn fixture() -> Document {
    Document::from_json(&serde_json::json!({
        "root": [{
            "tag": "div",
            "attributes": { "id": "app", "class": "shell main" },
            "children": [
                {
                    "tag": "ul",
                    "attributes": { "id": "first" },
                    "children": [
                        { "tag": "li", "children": ["A"] },
                        { "tag": "li", "children": ["B"] }
                    ]
                },
                {
                    "tag": "ul",
                    "attributes": { "id": "second" },
                    "children": [
                        { "tag": "li", "attributes": { "class": "x" }, "children": ["C"] }
                    ]
                }
            ]
        }]
    }))
    .unwrap()
}

#[derive(Clone, Default)]
struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return what it logged
pub(crate) fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let captured = CapturedWriter::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    (result, logs)
}

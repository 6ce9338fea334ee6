use crate::host::Host;

/// Run `callback` once the document is parsed: immediately when it already
/// is, otherwise on the host's content-loaded signal.
pub fn dom_ready<H: Host>(host: &H, callback: impl FnOnce() + 'static) {
    if host.is_loading() {
        tracing::debug!("document still loading, deferring callback");
        host.on_content_loaded(Box::new(callback));
    } else {
        callback();
    }
}

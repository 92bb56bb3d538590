use tracing::{info, warn};

/// Text shared for a blessing: the message followed by the signature
pub fn share_text(text: &str, signature: &str) -> String {
    format!("{}\n\n- {}", text, signature)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Dismissed,
}

/// Place the share text on the system clipboard.
///
/// The share surface has no failure contract, so a clipboard error is
/// logged and reported as `Dismissed`.
pub fn share_to_clipboard(title: &str, text: &str) -> ShareOutcome {
    let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
    match result {
        Ok(()) => {
            info!(title, "blessing copied to clipboard");
            ShareOutcome::Shared
        }
        Err(e) => {
            warn!(title, error = %e, "clipboard unavailable, share dismissed");
            ShareOutcome::Dismissed
        }
    }
}

//! Host seam for browser-style tab management and page scripting.

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::InjectError;

/// Opaque tab identifier.
///
/// References are weak by design: a tab is looked up by id at time of use
/// and may have been closed or navigated away by the user at any moment.
/// Implementations report a stale id as "not found", never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub u64);

/// Result of probing one selector candidate in a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Text was set, the element focused, and change + commit
    /// notifications fired.
    Injected,
    /// Matching element exists but is not currently visible; skipped.
    NotVisible,
    /// No element matched the selector.
    NotFound,
}

/// Capabilities of the host's tab layer.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Find an existing tab whose URL starts with `url_prefix`.
    async fn find_tab(&self, url_prefix: &str) -> Result<Option<TabId>, InjectError>;

    /// Bring an existing tab to the front. Fails when the tab is gone.
    async fn activate(&self, tab: TabId) -> Result<(), InjectError>;

    /// Open a new tab at `url`. Returns as soon as the tab exists; loading
    /// completion is signalled separately via [`TabHost::loaded`].
    async fn open(&self, url: &str) -> Result<TabId, InjectError>;

    /// One-shot "page fully loaded" subscription.
    ///
    /// The receiver resolves at most once and the subscription tears itself
    /// down with the sender, so a later navigation of the same tab cannot
    /// re-fire it. A dropped sender (tab closed mid-load) surfaces as a
    /// receive error.
    async fn loaded(&self, tab: TabId) -> Result<oneshot::Receiver<()>, InjectError>;

    /// Put `text` into the first element matching `selector` in the tab:
    /// set its value, focus it, and fire both the "value changed" and
    /// "committed" notifications.
    async fn fill_selector(
        &self,
        tab: TabId,
        selector: &str,
        text: &str,
    ) -> Result<ProbeOutcome, InjectError>;
}

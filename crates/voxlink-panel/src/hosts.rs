//! Host adapters for environments without page scripting.
//!
//! The terminal binary has no page or tab host to script, so delivery
//! always degrades to the clipboard fallback. Real hosts (a browser
//! extension bridge, an OS-level injector) implement the same traits.

use async_trait::async_trait;
use tokio::sync::oneshot;

use voxlink_inject::{
    FocusedElement, InjectError, PageHost, ProbeOutcome, TabHost, TabId,
};

/// Page host that never has a focused element.
pub struct HeadlessPageHost;

#[async_trait]
impl PageHost for HeadlessPageHost {
    async fn focused_element(&self) -> Result<Option<FocusedElement>, InjectError> {
        Ok(None)
    }

    async fn commit_field(
        &self,
        _field: &voxlink_inject::FieldBuffer,
    ) -> Result<(), InjectError> {
        Err(InjectError::Page("no page host attached".to_string()))
    }

    async fn insert_rich(&self, _text: &str) -> Result<(), InjectError> {
        Err(InjectError::Page("no page host attached".to_string()))
    }
}

/// Tab host that cannot open or script tabs.
pub struct HeadlessTabHost;

#[async_trait]
impl TabHost for HeadlessTabHost {
    async fn find_tab(&self, _url_prefix: &str) -> Result<Option<TabId>, InjectError> {
        Ok(None)
    }

    async fn activate(&self, _tab: TabId) -> Result<(), InjectError> {
        Err(InjectError::Tabs("no tab host attached".to_string()))
    }

    async fn open(&self, _url: &str) -> Result<TabId, InjectError> {
        Err(InjectError::Tabs("no tab host attached".to_string()))
    }

    async fn loaded(&self, _tab: TabId) -> Result<oneshot::Receiver<()>, InjectError> {
        Err(InjectError::Tabs("no tab host attached".to_string()))
    }

    async fn fill_selector(
        &self,
        _tab: TabId,
        _selector: &str,
        _text: &str,
    ) -> Result<ProbeOutcome, InjectError> {
        Err(InjectError::Tabs("no tab host attached".to_string()))
    }
}

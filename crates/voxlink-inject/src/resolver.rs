//! Strategy selection for delivering a transcript to a text surface.

use std::sync::Arc;

use crate::clipboard::Clipboard;
use crate::error::InjectError;
use crate::page::{FocusedElement, PageHost};
use crate::providers;
use crate::surface::TextSurface;
use crate::tabs::{ProbeOutcome, TabHost, TabId};

/// Where the user wants the text to go.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryTarget {
    /// Whatever is focused in the page the user is looking at.
    LocalActiveField,
    /// A named external chat surface, opened or reused on demand.
    ExternalSurface { provider: String },
}

/// The insertion strategy that ultimately delivered the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Spliced into a plain field at the cursor.
    FieldSplice,
    /// Platform rich-text insertion command.
    RichInsert,
    /// Selector probing inside a provider tab.
    SelectorProbe,
}

/// How a delivery ended. There is no error case: the resolver is total.
#[derive(Debug, Clone, PartialEq)]
pub enum InjectionOutcome {
    Delivered { strategy: Strategy },
    /// No writable surface found; the text went to the clipboard and the
    /// user was told to paste manually.
    ClipboardFallback { reason: String },
}

/// Ephemeral record of one delivery call. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionAttempt {
    /// Human-readable target descriptor, for logs and toasts.
    pub target: String,
    pub outcome: InjectionOutcome,
}

impl InjectionAttempt {
    pub fn delivered(&self) -> bool {
        matches!(self.outcome, InjectionOutcome::Delivered { .. })
    }
}

/// Works through delivery strategies in order and degrades gracefully.
pub struct InjectionResolver {
    page: Arc<dyn PageHost>,
    tabs: Arc<dyn TabHost>,
    clipboard: Arc<dyn Clipboard>,
}

impl InjectionResolver {
    pub fn new(
        page: Arc<dyn PageHost>,
        tabs: Arc<dyn TabHost>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            page,
            tabs,
            clipboard,
        }
    }

    /// Deliver `text` to `target`.
    ///
    /// `custom_url` supplies the settings-store URL for the `custom`
    /// provider. Always returns an attempt record; never an error.
    pub async fn deliver(
        &self,
        text: &str,
        target: &DeliveryTarget,
        custom_url: Option<&str>,
    ) -> InjectionAttempt {
        let attempt = match target {
            DeliveryTarget::LocalActiveField => self.deliver_local(text).await,
            DeliveryTarget::ExternalSurface { provider } => {
                self.deliver_external(text, provider, custom_url).await
            }
        };
        tracing::info!(target = %attempt.target, outcome = ?attempt.outcome, "Delivery finished");
        attempt
    }

    async fn deliver_local(&self, text: &str) -> InjectionAttempt {
        let target = "active field".to_string();

        let focused = match self.page.focused_element().await {
            Ok(focused) => focused,
            Err(e) => {
                tracing::warn!(error = %e, "Focused-element lookup failed");
                return self.fallback(target, text, "page not reachable");
            }
        };

        match focused {
            Some(FocusedElement::Field(mut field)) => {
                field.insert(text);
                match self.page.commit_field(&field).await {
                    Ok(()) => InjectionAttempt {
                        target,
                        outcome: InjectionOutcome::Delivered {
                            strategy: Strategy::FieldSplice,
                        },
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "Field write-back failed");
                        self.fallback(target, text, "field write-back failed")
                    }
                }
            }
            Some(FocusedElement::Rich) => match self.page.insert_rich(text).await {
                Ok(()) => InjectionAttempt {
                    target,
                    outcome: InjectionOutcome::Delivered {
                        strategy: Strategy::RichInsert,
                    },
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Rich insertion failed");
                    self.fallback(target, text, "rich insertion failed")
                }
            },
            Some(FocusedElement::NonText) | None => {
                self.fallback(target, text, "no writable element focused")
            }
        }
    }

    async fn deliver_external(
        &self,
        text: &str,
        provider: &str,
        custom_url: Option<&str>,
    ) -> InjectionAttempt {
        let Some(destination) = providers::resolve(provider, custom_url) else {
            return self.fallback(
                format!("provider {}", provider),
                text,
                "unknown provider or missing custom URL",
            );
        };
        let target = format!("{} ({})", destination.id, destination.url);

        let tab = match self.resolve_tab(&destination.url).await {
            Ok(tab) => tab,
            Err(e) => {
                tracing::warn!(error = %e, provider = %destination.id, "No usable tab");
                return self.fallback(target, text, "tab could not be opened");
            }
        };

        for selector in &destination.selectors {
            match self.tabs.fill_selector(tab, selector, text).await {
                Ok(ProbeOutcome::Injected) => {
                    tracing::debug!(selector = %selector, "Selector probe succeeded");
                    return InjectionAttempt {
                        target,
                        outcome: InjectionOutcome::Delivered {
                            strategy: Strategy::SelectorProbe,
                        },
                    };
                }
                Ok(ProbeOutcome::NotVisible) => {
                    tracing::debug!(selector = %selector, "Candidate present but not visible");
                }
                Ok(ProbeOutcome::NotFound) => {}
                Err(e) => {
                    tracing::warn!(selector = %selector, error = %e, "Selector probe failed");
                }
            }
        }

        self.fallback(target, text, "no visible input matched any candidate")
    }

    /// Reuse an existing provider tab, or open a fresh one and wait for its
    /// one-shot load signal.
    async fn resolve_tab(&self, url: &str) -> Result<TabId, InjectError> {
        if let Some(tab) = self.tabs.find_tab(url).await? {
            // A stale tab (closed since lookup) just means we open anew.
            if self.tabs.activate(tab).await.is_ok() {
                tracing::debug!(tab = ?tab, "Reusing existing provider tab");
                return Ok(tab);
            }
            tracing::debug!(tab = ?tab, "Existing tab stale, opening a new one");
        }

        let tab = self.tabs.open(url).await?;
        let loaded = self.tabs.loaded(tab).await?;
        loaded
            .await
            .map_err(|_| InjectError::Tabs("tab closed before it finished loading".to_string()))?;
        Ok(tab)
    }

    /// Universal fallback: the transcript is never lost.
    fn fallback(&self, target: String, text: &str, reason: &str) -> InjectionAttempt {
        if let Err(e) = self.clipboard.copy(text) {
            // Still a fallback outcome; there is nothing better left to do.
            tracing::warn!(error = %e, "Clipboard fallback copy failed");
        }
        InjectionAttempt {
            target,
            outcome: InjectionOutcome::ClipboardFallback {
                reason: reason.to_string(),
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

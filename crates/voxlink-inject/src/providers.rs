//! Named external surfaces and their selector candidates.
//!
//! Each provider maps to a base URL and an ordered list of
//! provider-specific selectors tried before the generic fallbacks. The
//! `custom` provider has no fixed URL; it resolves from the settings store.

/// Provider id reserved for a user-configured URL.
pub const CUSTOM_PROVIDER_ID: &str = "custom";

/// Generic candidates probed after the provider-specific ones.
pub const GENERIC_SELECTORS: &[&str] = &[
    "textarea",
    "[contenteditable=\"true\"]",
    "input[type=\"text\"]",
];

struct Provider {
    id: &'static str,
    url: &'static str,
    selectors: &'static [&'static str],
}

const PROVIDERS: &[Provider] = &[
    Provider {
        id: "chatgpt",
        url: "https://chatgpt.com/",
        selectors: &["#prompt-textarea", "div.ProseMirror[contenteditable=\"true\"]"],
    },
    Provider {
        id: "claude",
        url: "https://claude.ai/new",
        selectors: &["div.ProseMirror[contenteditable=\"true\"]", "fieldset textarea"],
    },
    Provider {
        id: "gemini",
        url: "https://gemini.google.com/app",
        selectors: &["div.ql-editor[contenteditable=\"true\"]"],
    },
    Provider {
        id: "grok",
        url: "https://grok.com/",
        selectors: &["textarea[aria-label]"],
    },
    Provider {
        id: "perplexity",
        url: "https://www.perplexity.ai/",
        selectors: &["textarea[placeholder]", "div[contenteditable=\"true\"]"],
    },
];

/// A resolved destination: base URL plus the full ordered candidate list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderTarget {
    pub id: String,
    pub url: String,
    pub selectors: Vec<String>,
}

/// Resolve a provider id to its destination.
///
/// `custom` takes its URL from `custom_url` (settings store) and probes
/// only the generic selectors. Returns `None` for an unknown id or a
/// custom target without a configured URL.
pub fn resolve(id: &str, custom_url: Option<&str>) -> Option<ProviderTarget> {
    if id == CUSTOM_PROVIDER_ID {
        let url = custom_url?.trim();
        if url.is_empty() {
            return None;
        }
        return Some(ProviderTarget {
            id: id.to_string(),
            url: url.to_string(),
            selectors: GENERIC_SELECTORS.iter().map(|s| s.to_string()).collect(),
        });
    }

    let provider = PROVIDERS.iter().find(|p| p.id == id)?;
    let selectors = provider
        .selectors
        .iter()
        .chain(GENERIC_SELECTORS)
        .map(|s| s.to_string())
        .collect();
    Some(ProviderTarget {
        id: provider.id.to_string(),
        url: provider.url.to_string(),
        selectors,
    })
}

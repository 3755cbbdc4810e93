//! Outbound share messages.
//!
//! Messaging apps only make `http(s)` URLs tappable, so every message carries
//! the web fallback first and the custom-scheme link second.

use medconf_common::AlertPresenter;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::links::LinkResolver;
use crate::platform::{Clipboard, ShareSheet, ShareSheetResult};

#[derive(Debug, Clone, Default)]
pub struct ShareLinkBuilder {
    links: LinkResolver,
}

impl ShareLinkBuilder {
    pub fn new(links: LinkResolver) -> Self {
        Self { links }
    }

    /// Builds the human-readable share text for one entity.
    ///
    /// `display_fields` are `(label, value)` pairs rendered in order as
    /// `label: value`; pairs with a blank value are skipped.
    pub fn build(
        &self,
        entity_type: &str,
        entity_id: &str,
        display_fields: &[(&str, &str)],
    ) -> String {
        let mut lines: Vec<String> = display_fields
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(label, value)| format!("{}: {}", label, value.trim()))
            .collect();

        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(self.links.web_url(entity_type, entity_id));
        lines.push(format!(
            "Open in the app: {}",
            self.links.app_url(entity_type, entity_id)
        ));

        lines.join("\n")
    }

    pub fn links(&self) -> &LinkResolver {
        &self.links
    }
}

/// How a share attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The user closed the share sheet; not an error.
    Cancelled,
    /// The share sheet failed and the message was copied instead.
    CopiedToClipboard,
    /// Neither the share sheet nor the clipboard worked; the user was told.
    Failed,
}

/// Shares through the OS sheet, falling back to the clipboard.
pub struct ShareService {
    builder: ShareLinkBuilder,
    sheet: Arc<dyn ShareSheet>,
    clipboard: Arc<dyn Clipboard>,
    alerts: Arc<dyn AlertPresenter>,
}

impl ShareService {
    pub fn new(
        builder: ShareLinkBuilder,
        sheet: Arc<dyn ShareSheet>,
        clipboard: Arc<dyn Clipboard>,
        alerts: Arc<dyn AlertPresenter>,
    ) -> Self {
        Self {
            builder,
            sheet,
            clipboard,
            alerts,
        }
    }

    pub async fn share(
        &self,
        entity_type: &str,
        entity_id: &str,
        display_fields: &[(&str, &str)],
    ) -> ShareOutcome {
        let message = self.builder.build(entity_type, entity_id, display_fields);

        match self.sheet.share(&message).await {
            Ok(ShareSheetResult::Shared) => {
                info!("Shared {} {}", entity_type, entity_id);
                ShareOutcome::Shared
            }
            Ok(ShareSheetResult::Dismissed) => ShareOutcome::Cancelled,
            Err(err) => {
                warn!("Share sheet failed, copying to clipboard instead: {}", err);
                self.copy_fallback(&message).await
            }
        }
    }

    async fn copy_fallback(&self, message: &str) -> ShareOutcome {
        match self.clipboard.set_text(message).await {
            Ok(()) => {
                self.alerts
                    .notify("Link copied", "The share link was copied to your clipboard.")
                    .await;
                ShareOutcome::CopiedToClipboard
            }
            Err(err) => {
                error!("Clipboard fallback failed: {}", err);
                self.alerts
                    .notify("Unable to share", "Sharing is not available right now.")
                    .await;
                ShareOutcome::Failed
            }
        }
    }
}

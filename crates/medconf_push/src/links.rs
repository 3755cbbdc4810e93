//! Deep-link format: parsing inbound URLs and building outbound ones.
//!
//! Two URL families share one shape:
//!
//! - custom scheme: `{scheme}://{entityType}/{entityId}`
//! - web fallback:  `https://{web_host}/{entityType}/{entityId}`
//!
//! Both resolve to the same [`NotificationIntent`] the push normalizer
//! produces, so the router does not care where an intent came from.

use medconf_config::DeepLinkConfig;
use tracing::{debug, warn};
use url::Url;

use crate::intent::{IntentKind, NotificationIntent};

/// Entity type that maps to the event detail screen.
pub const EVENT_ENTITY: &str = "event";

#[derive(Debug, Clone)]
pub struct LinkResolver {
    scheme: String,
    web_host: String,
}

impl LinkResolver {
    pub fn new(scheme: impl Into<String>, web_host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into().to_ascii_lowercase(),
            web_host: web_host.into().to_ascii_lowercase(),
        }
    }

    pub fn from_config(config: &DeepLinkConfig) -> Self {
        Self::new(&config.scheme, &config.web_host)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn web_host(&self) -> &str {
        &self.web_host
    }

    /// Parses `raw_url` into an intent.
    ///
    /// `None` means "not our link": the caller must take no action. A URL of
    /// ours with an unrecognised entity type is [`IntentKind::UnknownLink`].
    pub fn resolve(&self, raw_url: &str) -> Option<NotificationIntent> {
        let url = match Url::parse(raw_url.trim()) {
            Ok(url) => url,
            Err(err) => {
                debug!("Ignoring unparsable link {:?}: {}", raw_url, err);
                return None;
            }
        };

        let segments = self.segments(&url)?;
        let mut segments = segments.into_iter();
        let entity_type = segments.next();
        let entity_id = segments.next();

        let mut intent = match entity_type.as_deref() {
            Some(EVENT_ENTITY) => NotificationIntent::new(IntentKind::NewEvent)
                .with_action(Some("view".to_string()))
                .with_entity_id(entity_id),
            _ => NotificationIntent::new(IntentKind::UnknownLink).with_entity_id(entity_id),
        };

        if let Some(entity_type) = entity_type {
            intent = intent.with_attribute("entityType", entity_type);
        }
        for (key, value) in url.query_pairs() {
            intent = intent.with_attribute(key.into_owned(), value.into_owned());
        }

        debug!("Resolved link {} to {}", url, intent.kind());
        Some(intent)
    }

    /// Path segments of a URL from one of our families, `None` otherwise.
    fn segments(&self, url: &Url) -> Option<Vec<String>> {
        let path_segments = || -> Vec<String> {
            url.path_segments()
                .map(|segments| {
                    segments
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        if url.scheme() == self.scheme {
            // `app://event/42` parses with `event` as the host.
            let mut segments: Vec<String> = url
                .host_str()
                .filter(|h| !h.is_empty())
                .map(|h| vec![h.to_string()])
                .unwrap_or_default();
            segments.extend(path_segments());
            Some(segments)
        } else if url.scheme() == "https" && url.host_str() == Some(self.web_host.as_str()) {
            Some(path_segments())
        } else {
            None
        }
    }

    /// `{scheme}://{entity_type}/{entity_id}`
    pub fn app_url(&self, entity_type: &str, entity_id: &str) -> String {
        let built = Url::parse(&format!("{}://{}", self.scheme, entity_type))
            .ok()
            .and_then(|mut url| {
                url.path_segments_mut().ok()?.clear().push(entity_id);
                Some(url.to_string())
            });
        built.unwrap_or_else(|| {
            warn!("Could not build app link for {}/{}", entity_type, entity_id);
            format!("{}://{}/{}", self.scheme, entity_type, entity_id)
        })
    }

    /// `https://{web_host}/{entity_type}/{entity_id}`
    pub fn web_url(&self, entity_type: &str, entity_id: &str) -> String {
        let built = Url::parse(&format!("https://{}/", self.web_host))
            .ok()
            .and_then(|mut url| {
                url.path_segments_mut()
                    .ok()?
                    .clear()
                    .push(entity_type)
                    .push(entity_id);
                Some(url.to_string())
            });
        built.unwrap_or_else(|| {
            warn!("Could not build web link for {}/{}", entity_type, entity_id);
            format!("https://{}/{}/{}", self.web_host, entity_type, entity_id)
        })
    }
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::from_config(&DeepLinkConfig::default())
    }
}

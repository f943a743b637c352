use super::identity::SteamId;
use super::pages::MemberPage;
use super::pages::PageError;
use super::pages::Profile;
use crate::cache::ResolutionError;
use crate::cache::ResolveSource;
use crate::gate::RosterError;
use crate::gate::RosterSource;
use crate::FETCH_ATTEMPTS;
use crate::FETCH_TIMEOUT;
use crate::USER_AGENT;
use std::collections::HashSet;
use std::sync::Arc;

/// Steam community base URL.
const COMMUNITY: &str = "https://steamcommunity.com";

/// One page fetch by URL. Errors carry a transport-level message.
#[async_trait::async_trait]
trait PageSource: Send + Sync {
    async fn page(&self, url: &str) -> Result<String, String>;
}

/// Production fetch: one shared connection pool with a pinned
/// User-Agent and a hard per-request timeout.
struct Http {
    client: reqwest::Client,
}

#[async_trait::async_trait]
impl PageSource for Http {
    /// Vets the response before handing the body over: HTTP status
    /// first, then content type, then the text.
    async fn page(&self, url: &str) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("status {}", status));
        }
        let kind = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !kind.starts_with("text/html") && !kind.starts_with("text/xml") {
            return Err(format!("content type {:?}", kind));
        }
        response.text().await.map_err(|e| e.to_string())
    }
}

/// Steam community web client.
///
/// Profile resolution and roster walks drive a swappable page fetch;
/// the production fetch vets HTTP status and content type before any
/// body reaches a parser.
#[derive(Clone)]
pub struct SteamWeb {
    pages: Arc<dyn PageSource>,
}

impl SteamWeb {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("construct http client");
        Self {
            pages: Arc::new(Http { client }),
        }
    }

    /// Resolve a vanity name through its profile page.
    ///
    /// Transport hiccups and unparseable pages are retried up to the
    /// attempt limit; a parsed page settles the matter either way, and
    /// Steam's own error page means the identity does not exist.
    pub async fn profile(&self, vanity: &str) -> Result<Profile, ResolutionError> {
        let url = format!("{}/id/{}", COMMUNITY, vanity);
        let mut last = String::new();
        for attempt in 1..=FETCH_ATTEMPTS {
            match self.pages.page(&url).await {
                Err(why) => {
                    log::warn!("profile {} attempt {}: {}", vanity, attempt, why);
                    last = why;
                }
                Ok(html) => match Profile::try_from(html.as_str()) {
                    Ok(profile) => return Ok(profile),
                    Err(PageError::ErrorPage(msg)) => return Err(ResolutionError::NotFound(msg)),
                    Err(PageError::Unexpected(what)) => {
                        log::warn!("profile {} attempt {}: {}", vanity, attempt, what);
                        last = what.to_string();
                    }
                },
            }
        }
        Err(ResolutionError::RemoteUnavailable(last))
    }

    /// Fetch the complete member list of a group.
    ///
    /// Walks every page of the member-list XML document. The set is
    /// all-or-nothing: any page failure fails the whole fetch, and a
    /// partial roster is never returned.
    pub async fn roster(&self, group: &str) -> Result<HashSet<SteamId>, RosterError> {
        let mut members = HashSet::new();
        let mut page = 1;
        loop {
            let url = format!("{}/groups/{}/memberslistxml/?xml=1&p={}", COMMUNITY, group, page);
            let xml = self.pages.page(&url).await.map_err(RosterError::Unavailable)?;
            let parsed = MemberPage::try_from(xml.as_str())
                .map_err(|e| RosterError::Unavailable(e.to_string()))?;
            if let (1, Some(name)) = (page, parsed.name.as_deref()) {
                log::debug!("group {} is {}", group, name);
            }
            log::debug!(
                "group {} page {}/{}: {} members",
                group,
                parsed.page,
                parsed.total,
                parsed.members.len()
            );
            members.extend(parsed.members.iter().copied());
            // the request counter bounds the walk at totalPages even when
            // a page misreports its own currentPage
            if page >= parsed.total {
                return Ok(members);
            }
            page += 1;
        }
    }
}

impl Default for SteamWeb {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ResolveSource for SteamWeb {
    async fn fetch(&self, vanity: &str) -> Result<Profile, ResolutionError> {
        self.profile(vanity).await
    }
}

#[async_trait::async_trait]
impl RosterSource for SteamWeb {
    async fn fetch(&self, group: &str) -> Result<HashSet<SteamId>, RosterError> {
        self.roster(group).await
    }
}

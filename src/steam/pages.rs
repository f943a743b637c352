//! Steam community page scraping.
//!
//! Steam offers no public API for the pieces this service needs, so the
//! structure coupling lives here and nowhere else: the profile page's
//! embedded `g_rgProfileData` JSON blob, the shared error page, and the
//! paginated member-list XML document.

use super::identity::SteamId;
use serde::Deserialize;

/// Script marker preceding the profile JSON blob.
const PROFILE_MARKER: &str = "g_rgProfileData = ";
/// Heading Steam renders on its shared error page.
const ERROR_MARKER: &str = "<h2>Error</h2>";

/// Errors from reading a Steam page.
#[derive(Debug, Clone)]
pub enum PageError {
    /// Steam rendered its error page; the payload is its own message.
    ErrorPage(String),
    /// The page is missing a structure the scrape depends on.
    Unexpected(&'static str),
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ErrorPage(msg) => write!(f, "steam error page: {}", msg),
            Self::Unexpected(what) => write!(f, "unexpected page structure: {}", what),
        }
    }
}

impl std::error::Error for PageError {}

/// Identity fields embedded in a profile page.
#[derive(Debug, Clone)]
pub struct Profile {
    /// Canonical profile URL as Steam reports it.
    pub url: String,
    /// Current persona name.
    pub name: String,
    /// Canonical account id.
    pub id: SteamId,
}

/// Raw shape of the `g_rgProfileData` blob. Steam includes more fields;
/// these three are the ones a profile page must carry to count as one.
#[derive(Deserialize)]
struct ProfileData {
    url: String,
    personaname: String,
    steamid: String,
}

impl TryFrom<&str> for Profile {
    type Error = PageError;
    fn try_from(html: &str) -> Result<Self, Self::Error> {
        if let Some(msg) = error_message(html) {
            return Err(PageError::ErrorPage(msg));
        }
        let blob = profile_blob(html).ok_or(PageError::Unexpected("profile data blob"))?;
        let data = serde_json::from_str::<ProfileData>(blob)
            .map_err(|_| PageError::Unexpected("profile data fields"))?;
        let id = data
            .steamid
            .parse::<SteamId>()
            .map_err(|_| PageError::Unexpected("profile steam id"))?;
        Ok(Self {
            url: data.url,
            name: data.personaname,
            id,
        })
    }
}

/// One page of a group member list, from the XML document at
/// `/groups/<id>/memberslistxml/?xml=1&p=<n>`.
#[derive(Debug, Clone)]
pub struct MemberPage {
    /// Group display name when the page carries one.
    pub name: Option<String>,
    /// Members listed on this page.
    pub members: Vec<SteamId>,
    /// Position in the page walk, starting at 1.
    pub page: usize,
    /// Total pages in the walk.
    pub total: usize,
}

impl TryFrom<&str> for MemberPage {
    type Error = PageError;
    fn try_from(xml: &str) -> Result<Self, Self::Error> {
        if let Some(msg) = error_message(xml) {
            return Err(PageError::ErrorPage(msg));
        }
        let members = elements(xml, "steamID64")
            .into_iter()
            .map(|text| text.trim().parse::<SteamId>())
            .collect::<Result<Vec<SteamId>, _>>()
            .map_err(|_| PageError::Unexpected("member steam id"))?;
        // a page listing nobody reads as a scrape failure, not an empty roster
        if members.is_empty() {
            return Err(PageError::Unexpected("no members listed"));
        }
        let page = number(xml, "currentPage").ok_or(PageError::Unexpected("current page"))?;
        let total = number(xml, "totalPages").ok_or(PageError::Unexpected("total pages"))?;
        let name = element(xml, "groupName").map(|text| cdata(text).to_string());
        Ok(Self {
            name,
            members,
            page,
            total,
        })
    }
}

/// The error-page message, when the page is one. Steam renders failures
/// as a styled page with the message in the first `<h3>`.
pub fn error_message(page: &str) -> Option<String> {
    if page.contains(ERROR_MARKER) {
        Some(
            between(page, "<h3>", "</h3>")
                .unwrap_or("no message given")
                .trim()
                .to_string(),
        )
    } else {
        None
    }
}

/// The profile JSON blob: from the script marker, the slice between the
/// first `{` and the closing `};` of the assignment.
fn profile_blob(html: &str) -> Option<&str> {
    let script = &html[html.find(PROFILE_MARKER)?..];
    let start = script.find('{')?;
    let end = script.find("};")?;
    script.get(start..end + 1)
}

/// Slice the text between two markers.
fn between<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = text.find(open)? + open.len();
    let end = text[start..].find(close)? + start;
    Some(&text[start..end])
}

/// Text of the first `<name>…</name>` element.
fn element<'a>(xml: &'a str, name: &str) -> Option<&'a str> {
    between(xml, &format!("<{}>", name), &format!("</{}>", name))
}

/// Text of every `<name>…</name>` element, in document order.
fn elements<'a>(xml: &'a str, name: &str) -> Vec<&'a str> {
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);
    let mut found = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find(&open) {
        let start = start + open.len();
        match rest[start..].find(&close) {
            None => break,
            Some(end) => {
                found.push(&rest[start..start + end]);
                rest = &rest[start + end + close.len()..];
            }
        }
    }
    found
}

/// Numeric element text.
fn number(xml: &str, name: &str) -> Option<usize> {
    element(xml, name).and_then(|text| text.trim().parse::<usize>().ok())
}

/// Element text with any CDATA wrapper removed.
fn cdata(text: &str) -> &str {
    text.trim()
        .strip_prefix("<![CDATA[")
        .and_then(|inner| inner.strip_suffix("]]>"))
        .unwrap_or_else(|| text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = concat!(
        "<html><head><title>Steam Community :: Vas</title></head><body>\n",
        "<script type=\"text/javascript\">\n",
        "g_rgProfileData = {\"url\":\"https:\\/\\/steamcommunity.com\\/id\\/VasVadum\\/\",",
        "\"steamid\":\"76561198023716890\",\"personaname\":\"Vas\",\"summary\":\"\"};\n",
        "</script></body></html>"
    );

    const ERROR: &str = concat!(
        "<html><body><div class=\"sectionText\">\n",
        "<h2>Error</h2>\n",
        "<h3>No group could be retrieved for the given URL.</h3>\n",
        "</div></body></html>"
    );

    const MEMBERS: &str = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
        "<memberList>\n",
        "<groupID64>103582791433799413</groupID64>\n",
        "<groupDetails>\n",
        "<groupName><![CDATA[Land of Dragons Ark Server]]></groupName>\n",
        "<memberCount>3</memberCount>\n",
        "</groupDetails>\n",
        "<memberCount>3</memberCount>\n",
        "<totalPages>2</totalPages>\n",
        "<currentPage>1</currentPage>\n",
        "<startingMember>0</startingMember>\n",
        "<members>\n",
        "<steamID64>76561198023716890</steamID64>\n",
        "<steamID64>76561197960265729</steamID64>\n",
        "<steamID64>76561197960265730</steamID64>\n",
        "</members>\n",
        "</memberList>"
    );

    #[test]
    fn profile_fields() {
        let profile = Profile::try_from(PROFILE).unwrap();
        assert!(profile.name == "Vas");
        assert!(profile.id == "76561198023716890".parse().unwrap());
        assert!(profile.url == "https://steamcommunity.com/id/VasVadum/");
    }

    #[test]
    fn profile_requires_blob() {
        let page = "<html><body>nothing here</body></html>";
        assert!(matches!(
            Profile::try_from(page),
            Err(PageError::Unexpected("profile data blob"))
        ));
    }

    #[test]
    fn profile_requires_fields() {
        let page = "<script>g_rgProfileData = {\"url\":\"x\"};</script>";
        assert!(matches!(
            Profile::try_from(page),
            Err(PageError::Unexpected("profile data fields"))
        ));
    }

    #[test]
    fn profile_error_page() {
        match Profile::try_from(ERROR) {
            Err(PageError::ErrorPage(msg)) => {
                assert!(msg == "No group could be retrieved for the given URL.")
            }
            other => panic!("expected error page, got {:?}", other),
        }
    }

    #[test]
    fn error_page_without_detail() {
        let page = "<html><h2>Error</h2></html>";
        assert!(error_message(page) == Some("no message given".to_string()));
    }

    #[test]
    fn ordinary_page_is_not_an_error() {
        assert!(error_message(PROFILE) == None);
    }

    #[test]
    fn member_page_fields() {
        let page = MemberPage::try_from(MEMBERS).unwrap();
        assert!(page.members.len() == 3);
        assert!(page.members[0] == "76561198023716890".parse().unwrap());
        assert!(page.page == 1);
        assert!(page.total == 2);
        assert!(page.name == Some("Land of Dragons Ark Server".to_string()));
    }

    #[test]
    fn member_page_requires_members() {
        let page = "<memberList><totalPages>1</totalPages><currentPage>1</currentPage></memberList>";
        assert!(matches!(
            MemberPage::try_from(page),
            Err(PageError::Unexpected("no members listed"))
        ));
    }

    #[test]
    fn member_page_rejects_junk_ids() {
        let page = concat!(
            "<memberList><totalPages>1</totalPages><currentPage>1</currentPage>",
            "<members><steamID64>gibberish</steamID64></members></memberList>"
        );
        assert!(matches!(
            MemberPage::try_from(page),
            Err(PageError::Unexpected("member steam id"))
        ));
    }

    #[test]
    fn member_page_error_page() {
        assert!(matches!(
            MemberPage::try_from(ERROR),
            Err(PageError::ErrorPage(_))
        ));
    }

    #[test]
    fn cdata_unwrapped() {
        assert!(cdata("<![CDATA[Land of Dragons]]>") == "Land of Dragons");
        assert!(cdata("plain") == "plain");
    }
}

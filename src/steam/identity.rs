use crate::STEAM_ID_BASE;
use crate::STEAM_ID_SPAN;

/// Canonical 64-bit Steam account identifier.
///
/// Construction is range-checked: public individual accounts live in
/// `STEAM_ID_BASE..STEAM_ID_BASE + STEAM_ID_SPAN`, anything outside is
/// rejected as malformed before it can reach the cache or the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SteamId(u64);

impl SteamId {
    pub fn inner(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for SteamId {
    type Error = NormalizationError;
    fn try_from(n: u64) -> Result<Self, Self::Error> {
        if (STEAM_ID_BASE..STEAM_ID_BASE + STEAM_ID_SPAN).contains(&n) {
            Ok(Self(n))
        } else {
            Err(NormalizationError::Malformed)
        }
    }
}

impl std::str::FromStr for SteamId {
    type Err = NormalizationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map_err(|_| NormalizationError::Malformed)
            .and_then(Self::try_from)
    }
}

impl std::fmt::Display for SteamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized form of a client-supplied Steam identifier.
///
/// Clients submit raw ids, full profile URLs, or bare vanity names.
/// Normalization reduces all of them to either the canonical id or a
/// vanity lookup key; an `/id/<vanity>` URL and the bare vanity name
/// collapse to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Id(SteamId),
    Vanity(String),
}

impl IdentityKey {
    /// Extract the key from a profile URL. `/profiles/<id>` carries the
    /// canonical id, `/id/<vanity>` carries a vanity name; every other
    /// path shape is malformed regardless of host.
    fn from_url(s: &str) -> Result<Self, NormalizationError> {
        let url = url::Url::parse(s).map_err(|_| NormalizationError::Malformed)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NormalizationError::Malformed);
        }
        let path = url
            .path_segments()
            .ok_or(NormalizationError::Malformed)?
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<&str>>();
        match path.as_slice() {
            ["profiles", id] => id.parse::<SteamId>().map(Self::Id),
            ["id", vanity] if vanity.chars().all(Self::vanity_char) => {
                Ok(Self::Vanity(vanity.to_string()))
            }
            _ => Err(NormalizationError::Malformed),
        }
    }

    /// Characters Steam permits in a claimed vanity name.
    fn vanity_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '-'
    }
}

impl TryFrom<&str> for IdentityKey {
    type Error = NormalizationError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.trim();
        if s.is_empty() {
            Err(NormalizationError::Empty)
        } else if s.chars().all(|c| c.is_ascii_digit()) {
            s.parse::<SteamId>().map(Self::Id)
        } else if s.contains("://") {
            Self::from_url(s)
        } else if s.chars().all(Self::vanity_char) {
            Ok(Self::Vanity(s.to_string()))
        } else {
            Err(NormalizationError::Malformed)
        }
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Vanity(name) => write!(f, "{}", name),
        }
    }
}

/// Errors from normalizing a raw identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationError {
    Empty,
    Malformed,
}

impl std::fmt::Display for NormalizationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty steam identifier"),
            Self::Malformed => write!(f, "malformed steam identifier"),
        }
    }
}

impl std::error::Error for NormalizationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_in_range() {
        let key = IdentityKey::try_from("76561198023716890").unwrap();
        assert!(key == IdentityKey::Id(SteamId(76561198023716890)));
    }

    #[test]
    fn numeric_below_range() {
        assert!(IdentityKey::try_from("123") == Err(NormalizationError::Malformed));
    }

    #[test]
    fn numeric_above_range() {
        let above = (STEAM_ID_BASE + STEAM_ID_SPAN).to_string();
        assert!(IdentityKey::try_from(above.as_str()) == Err(NormalizationError::Malformed));
    }

    #[test]
    fn empty_input() {
        assert!(IdentityKey::try_from("") == Err(NormalizationError::Empty));
        assert!(IdentityKey::try_from("   ") == Err(NormalizationError::Empty));
    }

    #[test]
    fn bare_vanity() {
        let key = IdentityKey::try_from("VasVadum").unwrap();
        assert!(key == IdentityKey::Vanity("VasVadum".to_string()));
    }

    #[test]
    fn vanity_url() {
        let key = IdentityKey::try_from("https://steamcommunity.com/id/VasVadum").unwrap();
        assert!(key == IdentityKey::Vanity("VasVadum".to_string()));
    }

    #[test]
    fn vanity_url_trailing_slash() {
        let key = IdentityKey::try_from("https://steamcommunity.com/id/VasVadum/").unwrap();
        assert!(key == IdentityKey::Vanity("VasVadum".to_string()));
    }

    #[test]
    fn vanity_url_and_bare_share_key() {
        let bare = IdentityKey::try_from("VasVadum").unwrap();
        let url = IdentityKey::try_from("https://steamcommunity.com/id/VasVadum").unwrap();
        assert!(bare == url);
    }

    #[test]
    fn profile_url() {
        let key = IdentityKey::try_from("https://steamcommunity.com/profiles/76561198023716890").unwrap();
        assert!(key == IdentityKey::Id(SteamId(76561198023716890)));
    }

    #[test]
    fn profile_url_bad_id() {
        let url = "https://steamcommunity.com/profiles/notanumber";
        assert!(IdentityKey::try_from(url) == Err(NormalizationError::Malformed));
    }

    #[test]
    fn unrecognized_url_path() {
        let url = "https://example.com/foo";
        assert!(IdentityKey::try_from(url) == Err(NormalizationError::Malformed));
    }

    #[test]
    fn unrecognized_scheme() {
        let url = "ftp://steamcommunity.com/id/VasVadum";
        assert!(IdentityKey::try_from(url) == Err(NormalizationError::Malformed));
    }

    #[test]
    fn junk_input() {
        assert!(IdentityKey::try_from("not a vanity") == Err(NormalizationError::Malformed));
    }

    #[test]
    fn surrounding_whitespace() {
        let key = IdentityKey::try_from("  76561198023716890\n").unwrap();
        assert!(key == IdentityKey::Id(SteamId(76561198023716890)));
    }
}

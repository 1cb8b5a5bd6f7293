/// An `[attr*="needle"]` rule: the attribute value contains `needle`.
///
/// Rules render to CSS for the browser and match plain attribute lists for
/// hosts without a selector engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerRule {
    pub attr: &'static str,
    pub needle: &'static str,
}

impl MarkerRule {
    pub const fn new(attr: &'static str, needle: &'static str) -> Self {
        Self { attr, needle }
    }

    pub fn selector(&self) -> String {
        format!("[{}*=\"{}\"]", self.attr, self.needle)
    }

    pub fn matches<'a, I>(&self, attrs: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        attrs
            .into_iter()
            .any(|(name, value)| name == self.attr && value.contains(self.needle))
    }
}

/// Feed, browse, video-grid and search-result cards.
pub const CARD_MARKERS: &[MarkerRule] = &[
    MarkerRule::new("data-e2e", "feed-video"),
    MarkerRule::new("data-e2e", "browse-video"),
    MarkerRule::new("data-e2e", "video-card"),
    MarkerRule::new("data-e2e", "search-card"),
];

/// Badges the feed nests inside a card while the creator is streaming.
pub const LIVE_MARKERS: &[MarkerRule] = &[
    MarkerRule::new("data-e2e", "live-tag"),
    MarkerRule::new("data-e2e", "live-badge"),
    MarkerRule::new("data-e2e", "live-avatar"),
    MarkerRule::new("class", "LiveTag"),
];

/// Comma-joined selector list matching any of `rules`.
pub fn selector_list(rules: &[MarkerRule]) -> String {
    rules
        .iter()
        .map(MarkerRule::selector)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn matches_any<'a>(rules: &[MarkerRule], attrs: &'a [(String, String)]) -> bool {
    rules.iter().any(|rule| {
        rule.matches(
            attrs
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn card_selector_list() {
        assert_eq!(
            selector_list(CARD_MARKERS),
            r#"[data-e2e*="feed-video"],[data-e2e*="browse-video"],[data-e2e*="video-card"],[data-e2e*="search-card"]"#
        );
    }

    #[test]
    fn substring_match_on_named_attribute() {
        assert!(matches_any(
            CARD_MARKERS,
            &attrs(&[("data-e2e", "recommend-list-item-container feed-video")])
        ));
        assert!(matches_any(CARD_MARKERS, &attrs(&[("data-e2e", "search-card-desc")])));
        assert!(!matches_any(CARD_MARKERS, &attrs(&[("class", "feed-video")])));
        assert!(!matches_any(CARD_MARKERS, &attrs(&[])));
    }

    #[test]
    fn live_badge_by_class() {
        assert!(matches_any(
            LIVE_MARKERS,
            &attrs(&[("class", "css-1x2 DivLiveTag e1q")])
        ));
        assert!(!matches_any(LIVE_MARKERS, &attrs(&[("class", "liveness")])));
    }
}

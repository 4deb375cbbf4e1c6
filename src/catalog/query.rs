//! Search, filter and page-windowing over a resolved channel collection
//!
//! Everything here is a pure function of `(collection, query)`. All supplied
//! predicates are AND-ed and each is a case-insensitive substring test.

use crate::config::CuratedViewConfig;
use crate::models::{Channel, ChannelFilters, ChannelPage};

/// Filters lowered once so per-channel matching does not re-allocate
#[derive(Debug, Clone, Default)]
struct PreparedFilters {
    search: Option<String>,
    country: Option<String>,
    category: Option<String>,
    language: Option<String>,
}

impl PreparedFilters {
    fn new(filters: &ChannelFilters) -> Self {
        Self {
            search: prepare(filters.search_query.as_deref()),
            country: prepare(filters.country.as_deref()),
            category: prepare(filters.category.as_deref()),
            language: prepare(filters.language.as_deref()),
        }
    }

    fn matches(&self, channel: &Channel) -> bool {
        if let Some(term) = &self.search {
            let hit = contains(&channel.name, term)
                || contains(&channel.group, term)
                || contains(&channel.country, term)
                || contains(&channel.category, term);
            if !hit {
                return false;
            }
        }
        if let Some(country) = &self.country {
            if !contains(&channel.country, country) {
                return false;
            }
        }
        // category and group are synonyms upstream
        if let Some(category) = &self.category {
            if !contains(&channel.category, category) && !contains(&channel.group, category) {
                return false;
            }
        }
        if let Some(language) = &self.language {
            if !contains(&channel.language, language) {
                return false;
            }
        }
        true
    }
}

/// Every filter value is trimmed; a blank value is no filter at all
fn prepare(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

/// `needle` must already be lowercase
fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// The built-in discovery view shown before the user picks any filter
#[derive(Debug, Clone)]
pub struct CuratedView {
    country_markers: Vec<String>,
    name_markers: Vec<String>,
    topic_markers: Vec<String>,
}

impl CuratedView {
    pub fn new(config: &CuratedViewConfig) -> Self {
        let lower = |values: &[String]| -> Vec<String> {
            values
                .iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect()
        };
        Self {
            country_markers: lower(&config.country_markers),
            name_markers: lower(&config.name_markers),
            topic_markers: lower(&config.topic_markers),
        }
    }

    /// Locale match on country or name, or topic match on category, group or name
    pub fn matches(&self, channel: &Channel) -> bool {
        let country = channel.country.to_lowercase();
        let name = channel.name.to_lowercase();
        let category = channel.category.to_lowercase();
        let group = channel.group.to_lowercase();

        self.country_markers.iter().any(|m| country.contains(m.as_str()))
            || self.name_markers.iter().any(|m| name.contains(m.as_str()))
            || self.topic_markers.iter().any(|m| {
                category.contains(m.as_str())
                    || group.contains(m.as_str())
                    || name.contains(m.as_str())
            })
    }
}

impl Default for CuratedView {
    fn default() -> Self {
        Self::new(&CuratedViewConfig::default())
    }
}

/// Stateless query functions over a channel slice
pub struct CatalogQueryEngine;

impl CatalogQueryEngine {
    /// Channels matching every supplied filter, in collection order
    pub fn filter(channels: &[Channel], filters: &ChannelFilters) -> Vec<Channel> {
        let prepared = PreparedFilters::new(filters);
        channels
            .iter()
            .filter(|c| prepared.matches(c))
            .cloned()
            .collect()
    }

    /// Channels in the curated discovery view, in collection order
    pub fn curated(channels: &[Channel], view: &CuratedView) -> Vec<Channel> {
        channels.iter().filter(|c| view.matches(c)).cloned().collect()
    }

    /// Filter then window
    pub fn query(
        channels: &[Channel],
        filters: &ChannelFilters,
        page: usize,
        page_size: usize,
    ) -> ChannelPage {
        Self::paginate(Self::filter(channels, filters), page, page_size)
    }

    /// Curated view then window, with the same paging rules as [`Self::query`]
    pub fn query_curated(
        channels: &[Channel],
        view: &CuratedView,
        page: usize,
        page_size: usize,
    ) -> ChannelPage {
        Self::paginate(Self::curated(channels, view), page, page_size)
    }

    /// Window `[(page-1)*page_size, page*page_size)` of `matches`.
    ///
    /// Pages are 1-indexed. An out-of-range page (including page 0) yields no
    /// items but still reports the totals; a zero page size yields no pages.
    pub fn paginate(matches: Vec<Channel>, page: usize, page_size: usize) -> ChannelPage {
        let total_count = matches.len();
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(page_size)
        };

        let items = match page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(page_size))
        {
            Some(start) if page_size > 0 && start < total_count => matches
                .into_iter()
                .skip(start)
                .take(page_size)
                .collect(),
            _ => Vec::new(),
        };

        ChannelPage {
            items,
            page,
            total_pages,
            total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn channel(id: &str, name: &str, country: &str, category: &str) -> Channel {
        Channel {
            id: id.to_string(),
            name: name.to_string(),
            logo_url: None,
            group: category.to_string(),
            category: category.to_string(),
            country: country.to_string(),
            language: "eng".to_string(),
            playback_url: format!("http://cdn/{id}.m3u8"),
            quality: None,
            referrer: None,
            user_agent: None,
            tvg_id: Some(id.to_string()),
            tvg_name: Some(name.to_string()),
        }
    }

    fn numbered(count: usize) -> Vec<Channel> {
        (0..count)
            .map(|i| channel(&format!("c{i}"), &format!("Channel {i}"), "US", "news"))
            .collect()
    }

    #[rstest]
    #[case(1, 20)]
    #[case(2, 20)]
    #[case(3, 5)]
    #[case(4, 0)]
    #[case(0, 0)]
    fn pages_of_forty_five(#[case] page: usize, #[case] expected_items: usize) {
        let result = CatalogQueryEngine::query(&numbered(45), &ChannelFilters::new(), page, 20);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.total_count, 45);
        assert_eq!(result.page, page);
        assert_eq!(result.items.len(), expected_items);
    }

    #[test]
    fn third_page_starts_at_offset_forty() {
        let result = CatalogQueryEngine::query(&numbered(45), &ChannelFilters::new(), 3, 20);
        assert_eq!(result.items[0].id, "c40");
        assert_eq!(result.items[4].id, "c44");
    }

    #[test]
    fn zero_page_size_has_no_pages() {
        let result = CatalogQueryEngine::query(&numbered(3), &ChannelFilters::new(), 1, 0);
        assert_eq!(result.total_pages, 0);
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 3);
    }

    #[test]
    fn search_matches_name_substring_case_insensitively() {
        let channels = vec![
            channel("espn", "ESPN Sports", "US", "general"),
            channel("news1", "News 1", "UK", "news"),
        ];
        let result = CatalogQueryEngine::filter(&channels, &ChannelFilters::new().search("sport"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "ESPN Sports");
    }

    #[test]
    fn search_covers_group_country_and_category() {
        let channels = vec![
            channel("a", "Alpha", "Bangladesh", "news"),
            channel("b", "Beta", "US", "Documentary"),
        ];
        assert_eq!(
            CatalogQueryEngine::filter(&channels, &ChannelFilters::new().search("BANGLA")).len(),
            1
        );
        assert_eq!(
            CatalogQueryEngine::filter(&channels, &ChannelFilters::new().search("docu"))[0].id,
            "b"
        );
    }

    #[test]
    fn blank_search_is_ignored() {
        let channels = numbered(4);
        let result = CatalogQueryEngine::filter(&channels, &ChannelFilters::new().search("   "));
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn filters_are_anded() {
        let channels = vec![
            channel("a", "A Sports", "US", "sports"),
            channel("b", "B Sports", "UK", "sports"),
            channel("c", "C News", "US", "news"),
        ];
        let filters = ChannelFilters::new().country("us").category("SPORT");
        let result = CatalogQueryEngine::filter(&channels, &filters);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "a");
    }

    #[test]
    fn padded_filter_values_are_trimmed() {
        let channels = vec![
            channel("a", "A Sports", "US", "sports"),
            channel("b", "B News", "UK", "news"),
        ];
        let filters = ChannelFilters::new().country(" us ").category("\tsport ");
        let result = CatalogQueryEngine::filter(&channels, &filters);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "a");

        let blank = ChannelFilters::new().country("   ");
        assert_eq!(CatalogQueryEngine::filter(&channels, &blank).len(), 2);
    }

    #[test]
    fn category_filter_also_matches_group() {
        let mut odd = channel("odd", "Odd", "US", "general");
        odd.group = "Kids".to_string();
        let result = CatalogQueryEngine::filter(&[odd], &ChannelFilters::new().category("kid"));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn language_filter_is_substring() {
        let mut ben = channel("ben", "Ben", "BD", "news");
        ben.language = "ben".to_string();
        let channels = vec![ben, channel("eng", "Eng", "US", "news")];
        let result = CatalogQueryEngine::filter(&channels, &ChannelFilters::new().language("BE"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "ben");
    }

    #[test]
    fn curated_view_matches_locale_or_topic() {
        let channels = vec![
            channel("bd", "Somoy", "BD", "news"),
            channel("bangla", "Bangla Vision", "Unknown", "entertainment"),
            channel("sport", "Star", "IN", "Sports"),
            channel("named", "Eurosport 1", "FR", "general"),
            channel("other", "Weather Now", "US", "weather"),
        ];
        let ids: Vec<String> = CatalogQueryEngine::curated(&channels, &CuratedView::default())
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["bd", "bangla", "sport", "named"]);
    }

    #[test]
    fn curated_view_pages_like_the_general_path() {
        let channels: Vec<Channel> = (0..25)
            .map(|i| channel(&format!("s{i}"), &format!("Sport {i}"), "US", "general"))
            .collect();
        let page2 = CatalogQueryEngine::query_curated(&channels, &CuratedView::default(), 2, 20);
        assert_eq!(page2.total_pages, 2);
        assert_eq!(page2.total_count, 25);
        assert_eq!(page2.items.len(), 5);

        let page9 = CatalogQueryEngine::query_curated(&channels, &CuratedView::default(), 9, 20);
        assert!(page9.items.is_empty());
    }
}

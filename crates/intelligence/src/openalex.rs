//! OpenAlex bibliographic client
//!
//! `OpenAlexClient` implements [`MetadataSource`] and [`TopicWorkSource`]
//! over the OpenAlex `/works` endpoint. Response parsing is
//! separate from transport so it can be tested offline.

use crate::llm_client::get_json;
use chrono::{NaiveDate, Utc};
use litrank_core::{
    Error, MetadataSource, Result, TopicAssignment, TopicId, TopicWorkSource, Work, WorkId,
};
use litrank_engine::OpenAlexConfig;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Maximum ids in one `openalex:` filter
pub const IDS_PER_REQUEST: usize = 100;

/// OpenAlex's maximum page size
const MAX_PER_PAGE: usize = 200;

/// Client for the OpenAlex REST API
#[derive(Debug, Clone)]
pub struct OpenAlexClient {
    works_url: String,
    mailto: Option<String>,
    per_page: usize,
    timeout: Duration,
}

impl OpenAlexClient {
    /// Create a client for `base_url` (e.g. "https://api.openalex.org")
    pub fn new(base_url: &str, mailto: Option<&str>, timeout_ms: u64) -> Self {
        OpenAlexClient {
            works_url: format!("{}/works", base_url.trim_end_matches('/')),
            mailto: mailto.map(|s| s.to_string()),
            per_page: MAX_PER_PAGE,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Create from the `[openalex]` section
    pub fn from_config(config: &OpenAlexConfig) -> Self {
        Self::new(&config.base_url, config.mailto.as_deref(), config.timeout_ms)
            .with_per_page(config.per_page)
    }

    /// Builder: page size, clamped to `1..=200`
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    fn get_page(&self, filter: String, sort: Option<&str>, cursor: &str) -> Result<Value> {
        let mut params = vec![
            ("filter", filter),
            ("per-page", self.per_page.to_string()),
            ("cursor", cursor.to_string()),
        ];
        if let Some(sort) = sort {
            params.push(("sort", sort.to_string()));
        }
        if let Some(mailto) = &self.mailto {
            params.push(("mailto", mailto.clone()));
        }
        get_json(&self.works_url, &params, self.timeout).map_err(|e| e.tag(Error::Hydration))
    }

    /// Fetch every page for `filter`, stopping after `limit` works
    fn paginate(&self, filter: String, sort: Option<&str>, limit: Option<usize>) -> Result<Vec<Work>> {
        let mut works = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = "*".to_string();

        loop {
            let page = self.get_page(filter.clone(), sort, &cursor)?;
            let (batch, next) = parse_works_page(&page)?;
            let fetched = batch.len();
            for work in batch {
                // OpenAlex occasionally repeats a work across pages
                if seen.insert(work.id()) {
                    works.push(work);
                }
                if limit.is_some_and(|l| works.len() >= l) {
                    return Ok(works);
                }
            }
            match next {
                Some(next) if fetched > 0 => cursor = next,
                _ => return Ok(works),
            }
        }
    }
}

impl TopicWorkSource for OpenAlexClient {
    /// Queried up to today's date
    fn works_by_topics(
        &self,
        topics: &[TopicId],
        published_after: NaiveDate,
        require_abstract: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Work>> {
        if topics.is_empty() || limit == Some(0) {
            return Ok(Vec::new());
        }
        let filter = topic_filter(
            topics,
            published_after,
            Utc::now().date_naive(),
            require_abstract,
        );
        tracing::info!(
            target: "litrank::openalex",
            topics = topics.len(),
            %published_after,
            limit = ?limit,
            "Querying works by topic"
        );
        let works = self.paginate(filter, Some("publication_date:desc"), limit)?;
        tracing::debug!(target: "litrank::openalex", fetched = works.len(), "Topic query complete");
        Ok(works)
    }
}

impl MetadataSource for OpenAlexClient {
    fn fetch_works(&self, ids: &[WorkId]) -> Result<Vec<Work>> {
        let mut works = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IDS_PER_REQUEST) {
            works.extend(self.paginate(id_filter(chunk), None, None)?);
        }
        tracing::debug!(
            target: "litrank::openalex",
            requested = ids.len(),
            fetched = works.len(),
            "Fetched works by id"
        );
        Ok(works)
    }
}

// ============================================================================
// Filters
// ============================================================================

/// `openalex:W1|W2|...`
pub fn id_filter(ids: &[WorkId]) -> String {
    let joined: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("openalex:{}", joined.join("|"))
}

/// Primary-topic, date-range and optional abstract filter
pub fn topic_filter(
    topics: &[TopicId],
    from: NaiveDate,
    to: NaiveDate,
    require_abstract: bool,
) -> String {
    let joined: Vec<String> = topics.iter().map(|t| t.to_string()).collect();
    let mut filter = format!(
        "primary_topic.id:{},from_publication_date:{},to_publication_date:{}",
        joined.join("|"),
        from.format("%Y-%m-%d"),
        to.format("%Y-%m-%d"),
    );
    if require_abstract {
        filter.push_str(",has_abstract:true");
    }
    filter
}

// ============================================================================
// Parsing
// ============================================================================

fn parse_date(value: Option<&Value>) -> Option<NaiveDate> {
    value
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok())
}

/// Rebuild abstract text from OpenAlex's `abstract_inverted_index`
pub fn reconstruct_abstract(index: &Value) -> Option<String> {
    let map = index.as_object()?;
    let mut positioned: BTreeMap<u64, &str> = BTreeMap::new();
    for (word, positions) in map {
        for pos in positions.as_array().into_iter().flatten() {
            if let Some(p) = pos.as_u64() {
                positioned.insert(p, word.as_str());
            }
        }
    }
    if positioned.is_empty() {
        return None;
    }
    Some(positioned.into_values().collect::<Vec<_>>().join(" "))
}

/// Parse one work object
///
/// # Errors
/// Returns `Error::Hydration` if the id or publication date is missing.
pub fn parse_work(json: &Value) -> Result<Work> {
    let id = json
        .pointer("/ids/openalex")
        .or_else(|| json.get("id"))
        .and_then(Value::as_str)
        .and_then(WorkId::parse)
        .ok_or_else(|| Error::Hydration("work without a parseable id".to_string()))?;
    let publication_date = parse_date(json.get("publication_date"))
        .ok_or_else(|| Error::Hydration(format!("work {} has no publication date", id)))?;
    let title = json
        .get("title")
        .or_else(|| json.get("display_name"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let authors = json
        .get("authorships")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|a| a.pointer("/author/display_name").and_then(Value::as_str))
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut work = Work::new(id, title, publication_date).with_authors(authors);
    if let Some(text) = json.get("abstract_inverted_index").and_then(reconstruct_abstract) {
        work = work.with_abstract(text);
    }
    if let Some(created) = parse_date(json.get("created_date")) {
        work = work.with_created_date(created);
    }
    if let Some(count) = json.get("cited_by_count").and_then(Value::as_u64) {
        work = work.with_cited_by_count(u32::try_from(count).unwrap_or(u32::MAX));
    }
    for topic in json.get("topics").and_then(Value::as_array).into_iter().flatten() {
        let Some(topic_id) = topic.get("id").and_then(Value::as_str).and_then(TopicId::parse) else {
            continue;
        };
        let name = topic.get("display_name").and_then(Value::as_str).unwrap_or_default();
        let score = topic.get("score").and_then(Value::as_f64).unwrap_or(0.0) as f32;
        work = work.with_topic(topic_id, TopicAssignment::new(name, score));
    }
    Ok(work)
}

/// Parse a `/works` page into works and the next cursor
///
/// Malformed works are skipped and logged.
pub fn parse_works_page(json: &Value) -> Result<(Vec<Work>, Option<String>)> {
    let results = json
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Hydration("response has no 'results' array".to_string()))?;
    let mut works = Vec::with_capacity(results.len());
    for item in results {
        match parse_work(item) {
            Ok(work) => works.push(work),
            Err(e) => {
                tracing::warn!(target: "litrank::openalex", error = %e, "Skipping malformed work");
            }
        }
    }
    let next = json
        .pointer("/meta/next_cursor")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok((works, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "id": "https://openalex.org/W2741809807",
            "ids": {"openalex": "https://openalex.org/W2741809807"},
            "title": "Coral reef resilience",
            "publication_date": "2024-03-05",
            "created_date": "2024-03-07",
            "cited_by_count": 12,
            "authorships": [
                {"author": {"display_name": "Ana"}},
                {"author": {"display_name": "Ben"}},
                {"author": {"display_name": "Chen"}},
                {"author": {"display_name": "Dara"}}
            ],
            "abstract_inverted_index": {"reefs": [1], "Coral": [0], "recover": [2], "slowly": [3]},
            "topics": [
                {"id": "https://openalex.org/T10017", "display_name": "Coral Reef Ecology", "score": 0.98},
                {"id": "https://openalex.org/T11200", "display_name": "Climate Impacts", "score": 0.41}
            ]
        })
    }

    #[test]
    fn test_parse_work() {
        let work = parse_work(&sample()).unwrap();
        assert_eq!(work.id(), WorkId::new(2741809807));
        assert_eq!(work.title(), "Coral reef resilience");
        assert_eq!(work.authors(), &["Ana", "Ben", "Chen"]);
        assert_eq!(work.abstract_text(), Some("Coral reefs recover slowly"));
        assert_eq!(work.publication_date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(work.created_date(), NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(work.cited_by_count(), 12);
        let topic = &work.topics()[&TopicId::new(10017)];
        assert_eq!(topic.name, "Coral Reef Ecology");
        assert!((topic.score - 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_parse_work_without_abstract() {
        let mut json = sample();
        json["abstract_inverted_index"] = Value::Null;
        assert!(parse_work(&json).unwrap().abstract_text().is_none());
    }

    #[test]
    fn test_parse_work_requires_id_and_date() {
        let mut no_date = sample();
        no_date["publication_date"] = Value::Null;
        assert!(matches!(parse_work(&no_date), Err(Error::Hydration(_))));
        assert!(parse_work(&json!({"publication_date": "2024-01-01"})).is_err());
    }

    #[test]
    fn test_reconstruct_abstract_repeated_words() {
        let index = json!({"the": [0, 2], "cat": [1], "hat": [3]});
        assert_eq!(reconstruct_abstract(&index).unwrap(), "the cat the hat");
        assert!(reconstruct_abstract(&json!({})).is_none());
    }

    #[test]
    fn test_parse_page_skips_malformed() {
        let page = json!({
            "meta": {"next_cursor": "abc"},
            "results": [sample(), {"title": "no id"}]
        });
        let (works, next) = parse_works_page(&page).unwrap();
        assert_eq!(works.len(), 1);
        assert_eq!(next.as_deref(), Some("abc"));
    }

    #[test]
    fn test_filters() {
        assert_eq!(
            id_filter(&[WorkId::new(1), WorkId::new(22)]),
            "openalex:W1|W22"
        );
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(
            topic_filter(&[TopicId::new(10017), TopicId::new(5)], from, to, true),
            "primary_topic.id:T10017|T5,from_publication_date:2024-01-01,to_publication_date:2024-06-30,has_abstract:true"
        );
        assert!(!topic_filter(&[TopicId::new(5)], from, to, false).contains("has_abstract"));
    }

    #[test]
    fn test_from_config() {
        let client = OpenAlexClient::from_config(&OpenAlexConfig::default());
        assert_eq!(client.works_url, "https://api.openalex.org/works");
        assert_eq!(client.per_page, 200);
    }

    #[test]
    fn test_empty_requests_make_no_calls() {
        let client = OpenAlexClient::new("http://127.0.0.1:9", None, 10);
        assert!(client.fetch_works(&[]).unwrap().is_empty());
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(client.works_by_topics(&[], d, true, None).unwrap().is_empty());
    }
}

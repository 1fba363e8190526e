//! Forum tracker client and search-results extractor.
//!
//! The tracker serves its results page in windows-1251 with irregular,
//! attribute-keyed markup. Extraction is a single depth-first walk driven by
//! a declarative rule table: a `<tr>` whose id embeds the topic id starts a
//! new record, and every later element matching a rule writes one field of
//! the current record.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use scraper::{ElementRef, Html};

use crate::{
    config::Config,
    domain::TopicRecord,
    errors::Error,
    ports::DescriptorSource,
    Result,
};

/// Row-boundary marker: `<tr id="trs-tr-<topicId>">`.
const ROW_MARKER: &str = "trs-tr-";

/// Fixed search form parameters: order by seeders, descending.
const SEARCH_ORDER: &str = "7";
const SEARCH_SORT: &str = "2";

pub struct TrackerClient {
    http: reqwest::Client,
    forum_url: String,
}

impl TrackerClient {
    /// The session cookie authenticates every request; the tracker serves a
    /// login page to anonymous clients.
    pub fn new(cfg: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let cookie = format!("bb_session={}", cfg.bb_session);
        let value = HeaderValue::from_str(&cookie)
            .map_err(|_| Error::Config("BB_SESSION contains invalid header characters".to_string()))?;
        headers.insert(COOKIE, value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            forum_url: cfg.forum_url.clone(),
        })
    }

    /// Submit one search and extract the topic records, in page order.
    ///
    /// Transport, decoding and parse failures fail the whole call; partial
    /// results are never returned.
    pub async fn search(&self, query: &str) -> Result<Vec<TopicRecord>> {
        let form = [("nm", query), ("o", SEARCH_ORDER), ("s", SEARCH_SORT)];
        let resp = self
            .http
            .post(format!("{}/tracker.php", self.forum_url))
            .form(&form)
            .send()
            .await?
            .error_for_status()?;
        let body = resp.bytes().await?;
        let text = decode_body(&body)?;
        let topics = extract_topics(&text);
        tracing::info!(query, results = topics.len(), "tracker search done");
        Ok(topics)
    }
}

#[async_trait]
impl DescriptorSource for TrackerClient {
    /// Raw descriptor bytes for a topic; empty when the forum has none yet.
    async fn download(&self, topic_id: &str) -> Result<Vec<u8>> {
        let resp = self
            .http
            .get(format!("{}/dl.php", self.forum_url))
            .query(&[("t", topic_id)])
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}

fn decode_body(body: &[u8]) -> Result<String> {
    let (text, _, had_errors) = encoding_rs::WINDOWS_1251.decode(body);
    if had_errors {
        return Err(Error::Decode(
            "response body is not valid windows-1251".to_string(),
        ));
    }
    Ok(text.into_owned())
}

/// One field-extraction rule: tag + attribute predicate -> setter.
///
/// A rule only ever looks inside the matched element's own subtree. An empty
/// `needle` matches on attribute presence alone.
struct FieldRule {
    tag: &'static str,
    attr: &'static str,
    needle: &'static str,
    set: fn(&mut TopicRecord, &ElementRef),
}

const FIELD_RULES: &[FieldRule] = &[
    FieldRule { tag: "td", attr: "class", needle: "f-name-col", set: set_forum },
    FieldRule { tag: "td", attr: "class", needle: "t-title-col", set: set_title },
    FieldRule { tag: "td", attr: "class", needle: "u-name-col", set: set_author },
    FieldRule { tag: "td", attr: "class", needle: "tor-size", set: set_size },
    FieldRule { tag: "td", attr: "class", needle: "row4 leechmed bold", set: set_leechers },
    FieldRule { tag: "td", attr: "class", needle: "row4 small number-format", set: set_downloads },
    FieldRule { tag: "td", attr: "data-ts_text", needle: "", set: set_created_at },
    // Leaf-adjacent values: immediate text, not concatenated subtree text.
    FieldRule { tag: "b", attr: "class", needle: "seedmed", set: set_seeders },
    FieldRule { tag: "span", attr: "class", needle: "tor-icon tor-", set: set_verified },
];

fn set_forum(t: &mut TopicRecord, el: &ElementRef) {
    t.forum = subtree_text(el);
}

fn set_title(t: &mut TopicRecord, el: &ElementRef) {
    t.title_sections = text_fragments(el);
    t.title = t.title_sections.join(" ");
}

fn set_author(t: &mut TopicRecord, el: &ElementRef) {
    t.author = subtree_text(el);
}

fn set_size(t: &mut TopicRecord, el: &ElementRef) {
    // The size cell ends with a download arrow glyph.
    t.size = subtree_text(el).replace(" \u{2193}", "");
}

fn set_leechers(t: &mut TopicRecord, el: &ElementRef) {
    t.leechers = subtree_text(el);
}

fn set_downloads(t: &mut TopicRecord, el: &ElementRef) {
    t.downloads = subtree_text(el);
}

fn set_created_at(t: &mut TopicRecord, el: &ElementRef) {
    t.created_at = subtree_text(el);
}

fn set_seeders(t: &mut TopicRecord, el: &ElementRef) {
    t.seeders = immediate_text(el);
}

fn set_verified(t: &mut TopicRecord, el: &ElementRef) {
    t.verified = immediate_text(el);
}

/// Walk the document once, depth-first, in document order.
///
/// Rows with no identifier marker are ignored; a missing optional field is
/// left at its zero value. Never panics on malformed markup.
pub fn extract_topics(html: &str) -> Vec<TopicRecord> {
    let doc = Html::parse_document(html);
    let mut topics: Vec<TopicRecord> = Vec::new();

    for node in doc.root_element().descendants() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let tag = el.value().name();

        if tag == "tr" {
            if let Some(id) = el
                .value()
                .attr("id")
                .and_then(|v| v.split_once(ROW_MARKER))
                .map(|(_, id)| id)
                .filter(|id| !id.is_empty())
            {
                topics.push(TopicRecord {
                    id: id.to_string(),
                    ..Default::default()
                });
            }
            continue;
        }

        // Field rules apply to the record opened by the last row marker.
        let Some(current) = topics.last_mut() else {
            continue;
        };
        for rule in FIELD_RULES {
            if rule.tag != tag {
                continue;
            }
            let matched = match el.value().attr(rule.attr) {
                Some(value) => rule.needle.is_empty() || value.contains(rule.needle),
                None => false,
            };
            if matched {
                (rule.set)(current, &el);
            }
        }
    }

    topics
}

/// Visible text fragments of a subtree: tabs and newlines stripped per
/// fragment, empty and single-space fragments dropped.
fn text_fragments(el: &ElementRef) -> Vec<String> {
    el.text()
        .map(|t| t.replace(['\t', '\n'], ""))
        .filter(|t| !t.is_empty() && t.as_str() != " ")
        .collect()
}

fn subtree_text(el: &ElementRef) -> String {
    text_fragments(el).join(" ")
}

/// First text child of the element itself, ignoring nested elements.
fn immediate_text(el: &ElementRef) -> String {
    el.children()
        .find_map(|child| child.value().as_text().map(|t| t.text.to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r##"<html><body>
<table id="tor-tbl">
<tr class="hl-tr">
  <th>Forum</th><th class="t-title-col">Title</th>
</tr>
<tr id="trs-tr-100" class="tCenter hl-tr">
  <td class="row1 t-ico">&nbsp;</td>
  <td class="row1 f-name-col"><div class="f-name"><a href="#">Movies</a></div></td>
  <td class="row4 med tLeft t-title-col tt"><div class="t-title"><span class="tor-icon tor-approved">&#8730;</span> <a id="tt-100" href="#">Big Buck
	Bunny</a> [1080p]</div></td>
  <td class="row1 u-name-col"><div class="u-name"><a href="#">uploader</a></div></td>
  <td class="row4 small nowrap tor-size" data-ts_text="1503238553"><a class="small tr-dl" href="#">1.4&nbsp;GB &#8595;</a></td>
  <td class="row4 nowrap" title="Seeders"><b class="seedmed">12</b></td>
  <td class="row4 leechmed bold" title="Leechers">3</td>
  <td class="row4 small number-format">345</td>
  <td class="row4 small nowrap" data-ts_text="1600000000"><p>2020-09-13 14:26</p></td>
</tr>
<tr id="trs-tr-200" class="tCenter hl-tr">
  <td class="row1 f-name-col">Shows</td>
  <td class="row4 med tLeft t-title-col"><a id="tt-200" href="#">Second Topic</a></td>
  <td class="row4 small nowrap tor-size" data-ts_text="700"><a href="#">700&nbsp;MB &#8595;</a></td>
</tr>
</table>
</body></html>"##;

    #[test]
    fn one_record_per_row_marker_in_document_order() {
        let topics = extract_topics(RESULTS_PAGE);
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].id, "100");
        assert_eq!(topics[1].id, "200");
    }

    #[test]
    fn fields_are_assigned_by_rule() {
        let topics = extract_topics(RESULTS_PAGE);
        let t = &topics[0];
        assert_eq!(t.forum, "Movies");
        assert_eq!(t.author, "uploader");
        assert_eq!(t.size, "1.4\u{a0}GB");
        assert_eq!(t.seeders, "12");
        assert_eq!(t.leechers, "3");
        assert_eq!(t.downloads, "345");
        // Both the size and date cells carry data-ts_text; the later cell
        // wins, so created_at holds the date text.
        assert_eq!(t.created_at, "2020-09-13 14:26");
        assert_eq!(t.verified, "\u{221a}");
    }

    #[test]
    fn title_is_normalized_subtree_text() {
        let topics = extract_topics(RESULTS_PAGE);
        let t = &topics[0];
        // Tabs/newlines stripped per fragment, blank fragments dropped,
        // space-joined; the verification glyph sits inside the title cell.
        assert_eq!(t.title, "\u{221a} Big BuckBunny  [1080p]");
        assert!(t.title_sections.contains(&"Big BuckBunny".to_string()));
    }

    #[test]
    fn missing_optional_fields_stay_empty() {
        let topics = extract_topics(RESULTS_PAGE);
        let t = &topics[1];
        assert_eq!(t.forum, "Shows");
        assert_eq!(t.seeders, "");
        assert_eq!(t.verified, "");
        assert_eq!(t.author, "");
    }

    #[test]
    fn cells_before_any_row_marker_are_ignored() {
        let page = r#"<table>
            <tr><td class="f-name-col">stray</td></tr>
            <tr id="trs-tr-7"><td class="f-name-col">Real</td></tr>
        </table>"#;
        let topics = extract_topics(page);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].forum, "Real");
    }

    #[test]
    fn marker_without_topic_id_is_not_emitted() {
        let topics = extract_topics(r#"<tr id="trs-tr-"><td class="f-name-col">x</td></tr>"#);
        assert!(topics.is_empty());
    }

    #[test]
    fn decodes_windows_1251_bodies() {
        // "Тест" in windows-1251.
        let body = [0xD2, 0xE5, 0xF1, 0xF2];
        assert_eq!(decode_body(&body).unwrap(), "\u{422}\u{435}\u{441}\u{442}");
    }
}

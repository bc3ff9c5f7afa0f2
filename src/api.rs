use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::blocking::Client;
use std::collections::BTreeMap;

use crate::model::{FeedElement, FeedEntry};

pub trait FeedFetcher {
    /// Fetch the raw feed document at `url`
    fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFeedClient {
    client: Client,
}

impl HttpFeedClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("listrender/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

impl FeedFetcher for HttpFeedClient {
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .context("Failed to fetch feed")?
            .error_for_status()
            .context("Feed request was rejected")?;

        response.text().context("Failed to read feed body")
    }
}

struct OpenItem {
    depth: usize,
    index: usize,
    child: Option<FeedElement>,
}

/// Parse every `<item>` element, at any depth, into a `FeedEntry`
///
/// Each entry keeps the item's direct child elements in document order. An
/// element's text is the concatenation of all text beneath it.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries: Vec<FeedEntry> = Vec::new();
    let mut open: Vec<OpenItem> = Vec::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event().context("Failed to parse feed")? {
            Event::Eof => break,
            Event::Start(start) => {
                depth += 1;
                let element = element_from(&start)?;

                for item in open.iter_mut().filter(|i| i.depth + 1 == depth) {
                    item.child = Some(element.clone());
                }
                if element.name == "item" {
                    open.push(OpenItem {
                        depth,
                        index: entries.len(),
                        child: None,
                    });
                    entries.push(FeedEntry::default());
                }
            }
            Event::Empty(empty) => {
                let element = element_from(&empty)?;

                for item in open.iter().filter(|i| i.depth == depth) {
                    entries[item.index].elements.push(element.clone());
                }
                if element.name == "item" {
                    entries.push(FeedEntry::default());
                }
            }
            Event::Text(text) => {
                let content = text.unescape().context("Failed to decode feed text")?;
                append_text(&mut open, &content);
            }
            Event::CData(cdata) => {
                let content = String::from_utf8_lossy(&cdata).to_string();
                append_text(&mut open, &content);
            }
            Event::End(_) => {
                for item in open.iter_mut().filter(|i| i.depth + 1 == depth) {
                    if let Some(child) = item.child.take() {
                        entries[item.index].elements.push(child);
                    }
                }
                if open.last().is_some_and(|i| i.depth == depth) {
                    open.pop();
                }
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    Ok(entries)
}

fn element_from(start: &BytesStart<'_>) -> Result<FeedElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
    let mut attributes = BTreeMap::new();
    for attr in start.attributes() {
        let attr = attr.context("Malformed attribute in feed")?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().context("Failed to decode attribute")?.to_string();
        attributes.insert(key, value);
    }

    Ok(FeedElement {
        name,
        text: String::new(),
        attributes,
    })
}

fn append_text(open: &mut [OpenItem], content: &str) {
    for item in open.iter_mut() {
        if let Some(child) = item.child.as_mut() {
            child.text.push_str(content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Channel</title>
    <item>
      <title>First &amp; best</title>
      <link>https://example.com/1</link>
      <enclosure url="https://example.com/1.mp3" length="10" type="audio/mpeg"/>
    </item>
    <item>
      <title><![CDATA[Second <b>bold</b>]]></title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_items_in_order() {
        let entries = parse_feed(RSS).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].element("title").unwrap().text, "First & best");
        assert_eq!(entries[0].element("link").unwrap().text, "https://example.com/1");
        assert_eq!(entries[1].element("title").unwrap().text, "Second <b>bold</b>");
        assert!(entries[1].element("link").is_none());
    }

    #[test]
    fn test_parse_channel_title_not_captured() {
        let entries = parse_feed(RSS).unwrap();
        assert!(entries.iter().all(|e| e.element("title").unwrap().text != "Channel"));
    }

    #[test]
    fn test_parse_enclosure_attributes() {
        let entries = parse_feed(RSS).unwrap();
        let enclosure = entries[0].element("enclosure").unwrap();
        assert_eq!(
            enclosure.attributes.get("url").map(String::as_str),
            Some("https://example.com/1.mp3")
        );
        assert_eq!(enclosure.text, "");
    }

    #[test]
    fn test_parse_nested_child_text_is_concatenated() {
        let xml = "<feed><item><description>a<em>b</em>c</description></item></feed>";
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries[0].element("description").unwrap().text, "abc");
        // Grandchildren are not direct elements
        assert!(entries[0].element("em").is_none());
    }

    #[test]
    fn test_parse_items_at_any_depth() {
        let xml = "<root><item><title>A</title></item><group><item><title>B</title></item></group></root>";
        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].element("title").unwrap().text, "B");
    }

    #[test]
    fn test_parse_no_items() {
        assert!(parse_feed("<rss><channel/></rss>").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_fails() {
        assert!(parse_feed("<rss><item><title>x</item></rss>").is_err());
    }
}

//! Decoding of management API responses.
//!
//! Listings come back as an Atom `feed` of `entry` elements; single resources
//! (such as `$namespaceinfo`) as a lone `entry`. Each entry's `content` holds
//! one description element whose leaf children carry the entity properties:
//!
//! ```xml
//! <entry>
//!   <title type="text">orders</title>
//!   <content type="application/xml">
//!     <QueueDescription>
//!       <LockDuration>PT1M</LockDuration>
//!       <MaxDeliveryCount>10</MaxDeliveryCount>
//!     </QueueDescription>
//!   </content>
//! </entry>
//! ```
//!
//! Elements are matched by local name; namespace prefixes are ignored.

use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::records::{
    CorrelationRecord, FilterRecord, NamespaceProperties, QueueRecord, RuleRecord,
    SubscriptionRecord, TopicRecord,
};
use crate::utils::{ExportError, Result};

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(ExportError::malformed)?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(ExportError::malformed)?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn is_nil(&self) -> bool {
        self.attribute("nil") == Some("true")
    }

    /// Text of a leaf child. Missing, nil and empty elements are all absent.
    fn text_of(&self, name: &str) -> Option<String> {
        self.child(name)
            .filter(|c| !c.is_nil() && !c.text.is_empty())
            .map(|c| c.text.clone())
    }

    fn parse_of<T: FromStr>(&self, name: &str) -> Result<Option<T>> {
        self.text_of(name)
            .map(|text| {
                text.parse::<T>().map_err(|_| {
                    ExportError::malformed(format!("{}/{name}: unexpected value '{text}'", self.name))
                })
            })
            .transpose()
    }
}

fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Element::default()];
    loop {
        match reader.read_event().map_err(ExportError::malformed)? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ExportError::malformed("unbalanced closing tag"))?;
                attach(&mut stack, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(ExportError::malformed)?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data);
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(mut document), true) if !document.children.is_empty() => {
            Ok(document.children.remove(0))
        }
        (_, true) => Err(ExportError::malformed("empty document")),
        _ => Err(ExportError::malformed("unclosed element")),
    }
}

fn attach(stack: &mut [Element], element: Element) -> Result<()> {
    stack
        .last_mut()
        .ok_or_else(|| ExportError::malformed("unbalanced closing tag"))?
        .children
        .push(element);
    Ok(())
}

/// An entry's title and the description element inside its content.
struct Entry<'a> {
    title: String,
    description: &'a Element,
}

fn entries(root: &Element) -> Result<Vec<Entry<'_>>> {
    let elements: Vec<&Element> = match root.name.as_str() {
        "feed" => root.children_named("entry").collect(),
        "entry" => vec![root],
        other => {
            return Err(ExportError::malformed(format!(
                "expected an Atom feed or entry, found <{other}>"
            )));
        }
    };

    elements
        .into_iter()
        .map(|entry| {
            let title = entry.text_of("title").unwrap_or_default();
            let description = entry
                .child("content")
                .and_then(|content| content.children.first())
                .ok_or_else(|| ExportError::malformed(format!("entry '{title}' has no content")))?;
            Ok(Entry { title, description })
        })
        .collect()
}

fn decode_feed<T>(xml: &str, decode: impl Fn(Entry<'_>) -> Result<T>) -> Result<Vec<T>> {
    let root = parse_document(xml)?;
    entries(&root)?.into_iter().map(decode).collect()
}

pub fn decode_namespace(xml: &str) -> Result<NamespaceProperties> {
    let root = parse_document(xml)?;
    let entry = entries(&root)?
        .into_iter()
        .next()
        .ok_or_else(|| ExportError::malformed("namespace info has no entry"))?;

    let name = entry
        .description
        .text_of("Name")
        .or_else(|| (!entry.title.is_empty()).then(|| entry.title.clone()))
        .ok_or_else(|| ExportError::malformed("namespace info has no name"))?;

    Ok(NamespaceProperties { name })
}

pub fn decode_queues(xml: &str) -> Result<Vec<QueueRecord>> {
    decode_feed(xml, |entry| {
        let d = entry.description;
        Ok(QueueRecord {
            name: entry.title,
            dead_lettering_on_message_expiration: d.parse_of("DeadLetteringOnMessageExpiration")?,
            default_message_time_to_live: d.text_of("DefaultMessageTimeToLive"),
            duplicate_detection_history_time_window: d.text_of("DuplicateDetectionHistoryTimeWindow"),
            forward_dead_lettered_messages_to: d.text_of("ForwardDeadLetteredMessagesTo"),
            forward_to: d.text_of("ForwardTo"),
            lock_duration: d.text_of("LockDuration"),
            max_delivery_count: d.parse_of("MaxDeliveryCount")?,
            requires_duplicate_detection: d.parse_of("RequiresDuplicateDetection")?,
            requires_session: d.parse_of("RequiresSession")?,
        })
    })
}

pub fn decode_topics(xml: &str) -> Result<Vec<TopicRecord>> {
    decode_feed(xml, |entry| {
        let d = entry.description;
        Ok(TopicRecord {
            name: entry.title,
            default_message_time_to_live: d.text_of("DefaultMessageTimeToLive"),
            duplicate_detection_history_time_window: d.text_of("DuplicateDetectionHistoryTimeWindow"),
            requires_duplicate_detection: d.parse_of("RequiresDuplicateDetection")?,
        })
    })
}

pub fn decode_subscriptions(xml: &str) -> Result<Vec<SubscriptionRecord>> {
    decode_feed(xml, |entry| {
        let d = entry.description;
        Ok(SubscriptionRecord {
            name: entry.title,
            dead_lettering_on_message_expiration: d.parse_of("DeadLetteringOnMessageExpiration")?,
            default_message_time_to_live: d.text_of("DefaultMessageTimeToLive"),
            forward_dead_lettered_messages_to: d.text_of("ForwardDeadLetteredMessagesTo"),
            forward_to: d.text_of("ForwardTo"),
            lock_duration: d.text_of("LockDuration"),
            max_delivery_count: d.parse_of("MaxDeliveryCount")?,
            requires_session: d.parse_of("RequiresSession")?,
        })
    })
}

pub fn decode_rules(xml: &str) -> Result<Vec<RuleRecord>> {
    decode_feed(xml, |entry| {
        let d = entry.description;
        let name = if entry.title.is_empty() {
            d.text_of("Name").unwrap_or_default()
        } else {
            entry.title
        };
        let filter = d.child("Filter").filter(|f| !f.is_nil()).map(decode_filter);
        Ok(RuleRecord { name, filter })
    })
}

fn decode_filter(filter: &Element) -> FilterRecord {
    match filter.attribute("type").unwrap_or_default() {
        "SqlFilter" => FilterRecord::Sql {
            expression: filter.text_of("SqlExpression").unwrap_or_default(),
        },
        "CorrelationFilter" => FilterRecord::Correlation(CorrelationRecord {
            content_type: filter.text_of("ContentType"),
            correlation_id: filter.text_of("CorrelationId"),
            label: filter.text_of("Label"),
            reply_to: filter.text_of("ReplyTo"),
            reply_to_session_id: filter.text_of("ReplyToSessionId"),
            session_id: filter.text_of("SessionId"),
            to: filter.text_of("To"),
        }),
        "TrueFilter" => FilterRecord::True,
        "FalseFilter" => FilterRecord::False,
        other => FilterRecord::Unknown(other.to_string()),
    }
}

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;

use super::*;
use crate::directory::{
    CorrelationRecord, DirectoryService, FilterRecord, NamespaceProperties, Pages, QueueRecord,
    RuleRecord, SubscriptionRecord, TopicRecord,
};
use crate::model::{Namespace, Queue, RuleFilter, Topic};
use crate::utils::ExportError;

/// In-memory directory. Listings are stored page by page; a listing marked as
/// failing yields its pages and then an error.
#[derive(Debug, Default, Clone)]
struct FakeDirectory {
    name: String,
    fail_namespace: bool,
    queues: Vec<Vec<QueueRecord>>,
    topics: Vec<Vec<TopicRecord>>,
    subscriptions: HashMap<String, Vec<Vec<SubscriptionRecord>>>,
    rules: HashMap<(String, String), Vec<Vec<RuleRecord>>>,
    failing_rules: Option<(String, String)>,
}

impl FakeDirectory {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

fn pages<T: Clone + Send + 'static>(pages: &[Vec<T>], fail: bool) -> Pages<'static, T> {
    let mut items: Vec<crate::utils::Result<Vec<T>>> = pages.iter().cloned().map(Ok).collect();
    if fail {
        items.push(Err(ExportError::Status {
            url: "fake://listing".to_string(),
            status: 503,
            body: "unavailable".to_string(),
        }));
    }
    stream::iter(items).boxed()
}

#[async_trait]
impl DirectoryService for FakeDirectory {
    async fn namespace_properties(&self) -> crate::utils::Result<NamespaceProperties> {
        if self.fail_namespace {
            return Err(ExportError::Status {
                url: "fake://$namespaceinfo".to_string(),
                status: 401,
                body: "unauthorized".to_string(),
            });
        }
        Ok(NamespaceProperties {
            name: self.name.clone(),
        })
    }

    fn list_queues(&self) -> Pages<'_, QueueRecord> {
        pages(&self.queues, false)
    }

    fn list_topics(&self) -> Pages<'_, TopicRecord> {
        pages(&self.topics, false)
    }

    fn list_subscriptions(&self, topic: &str) -> Pages<'_, SubscriptionRecord> {
        pages(self.subscriptions.get(topic).map(Vec::as_slice).unwrap_or_default(), false)
    }

    fn list_rules(&self, topic: &str, subscription: &str) -> Pages<'_, RuleRecord> {
        let key = (topic.to_string(), subscription.to_string());
        let fail = self.failing_rules.as_ref() == Some(&key);
        pages(self.rules.get(&key).map(Vec::as_slice).unwrap_or_default(), fail)
    }
}

/// Hands out directories by connection string and records each connect.
#[derive(Default)]
struct FakeConnector {
    directories: HashMap<String, FakeDirectory>,
    connected: Mutex<Vec<String>>,
}

impl Connector for FakeConnector {
    type Directory = FakeDirectory;

    fn connect(&self, connection: &str) -> crate::utils::Result<FakeDirectory> {
        self.connected.lock().unwrap().push(connection.to_string());
        self.directories
            .get(connection)
            .cloned()
            .ok_or_else(|| ExportError::ConnectionString(connection.to_string()))
    }
}

fn queue(name: &str) -> QueueRecord {
    QueueRecord {
        name: name.to_string(),
        ..Default::default()
    }
}

fn topic(name: &str) -> TopicRecord {
    TopicRecord {
        name: name.to_string(),
        ..Default::default()
    }
}

fn subscription(name: &str) -> SubscriptionRecord {
    SubscriptionRecord {
        name: name.to_string(),
        ..Default::default()
    }
}

fn sql_rule(name: &str, expression: &str) -> RuleRecord {
    RuleRecord {
        name: name.to_string(),
        filter: Some(FilterRecord::Sql {
            expression: expression.to_string(),
        }),
    }
}

fn no_filter() -> EntityFilter {
    EntityFilter::default()
}

/// Two topics with three subscriptions each, one rule per subscription.
fn orders_namespace() -> FakeDirectory {
    let mut directory = FakeDirectory::named("orders-ns");
    directory.queues = vec![vec![queue("orders"), queue("billing")], vec![queue("orders-retry")]];
    directory.topics = vec![vec![topic("order-events")], vec![topic("audit")]];

    for t in ["order-events", "audit"] {
        directory.subscriptions.insert(
            t.to_string(),
            vec![
                vec![subscription("first"), subscription("second")],
                vec![subscription("third")],
            ],
        );
        for s in ["first", "second", "third"] {
            directory.rules.insert(
                (t.to_string(), s.to_string()),
                vec![vec![sql_rule(&format!("{t}-{s}"), "1=1")]],
            );
        }
    }

    directory
}

fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<&str> {
    items.iter().map(name).collect()
}

#[tokio::test]
async fn test_walk_keeps_page_order() {
    let namespace = walk_namespace(&orders_namespace(), &no_filter()).await.unwrap();

    assert_eq!(namespace.name, "orders-ns");
    assert_eq!(
        names(&namespace.queues, |q| q.name.as_str()),
        ["orders", "billing", "orders-retry"]
    );
    assert_eq!(names(&namespace.topics, |t| t.name.as_str()), ["order-events", "audit"]);

    let audit = &namespace.topics[1];
    assert_eq!(
        names(&audit.subscriptions, |s| s.name.as_str()),
        ["first", "second", "third"]
    );
    assert_eq!(audit.subscriptions[2].rules[0].name, "audit-third");
}

#[tokio::test]
async fn test_walk_normalizes_queue_properties() {
    let mut directory = FakeDirectory::named("ns");
    directory.queues = vec![vec![QueueRecord {
        name: "orders".to_string(),
        dead_lettering_on_message_expiration: Some(true),
        default_message_time_to_live: Some("P10675199DT2H48M5.4775807S".to_string()),
        duplicate_detection_history_time_window: Some("PT10M".to_string()),
        forward_dead_lettered_messages_to: Some(
            "https://ns.servicebus.windows.net/dead-letters".to_string(),
        ),
        forward_to: Some("https://ns.servicebus.windows.net/archive".to_string()),
        lock_duration: Some("PT5M".to_string()),
        max_delivery_count: Some(10),
        requires_duplicate_detection: Some(true),
        requires_session: None,
    }]];

    let namespace = walk_namespace(&directory, &no_filter()).await.unwrap();
    let properties = &namespace.queues[0].properties;

    assert_eq!(properties.dead_lettering_on_message_expiration, Some(true));
    assert_eq!(properties.default_message_time_to_live.as_deref(), Some("PT1H"));
    assert_eq!(
        properties.duplicate_detection_history_time_window.as_deref(),
        Some("PT5M")
    );
    assert_eq!(
        properties.forward_dead_lettered_messages_to.as_deref(),
        Some("dead-letters")
    );
    assert_eq!(properties.forward_to.as_deref(), Some("archive"));
    assert_eq!(properties.lock_duration.as_deref(), Some("PT5M"));
    assert_eq!(properties.max_delivery_count, Some(10));
    assert_eq!(properties.requires_duplicate_detection, Some(true));
    assert_eq!(properties.requires_session, None);
}

#[tokio::test]
async fn test_walk_preserves_absent_and_short_durations() {
    let mut directory = FakeDirectory::named("ns");
    directory.topics = vec![vec![TopicRecord {
        name: "events".to_string(),
        default_message_time_to_live: Some("PT30M".to_string()),
        duplicate_detection_history_time_window: None,
        requires_duplicate_detection: Some(false),
    }]];
    directory.subscriptions.insert(
        "events".to_string(),
        vec![vec![SubscriptionRecord {
            name: "sub".to_string(),
            default_message_time_to_live: Some("P1D".to_string()),
            forward_to: Some("https://ns.servicebus.windows.net/other/sub".to_string()),
            ..Default::default()
        }]],
    );

    let namespace = walk_namespace(&directory, &no_filter()).await.unwrap();
    let topic = &namespace.topics[0];
    assert_eq!(
        topic.properties.default_message_time_to_live.as_deref(),
        Some("PT30M")
    );
    assert_eq!(topic.properties.duplicate_detection_history_time_window, None);

    let sub = &topic.subscriptions[0];
    assert_eq!(sub.properties.default_message_time_to_live.as_deref(), Some("PT1H"));
    assert_eq!(sub.properties.forward_to.as_deref(), Some("other/sub"));
    assert!(sub.rules.is_empty());
}

#[tokio::test]
async fn test_walk_maps_rule_filters() {
    let mut directory = FakeDirectory::named("ns");
    directory.topics = vec![vec![topic("events")]];
    directory
        .subscriptions
        .insert("events".to_string(), vec![vec![subscription("sub")]]);
    directory.rules.insert(
        ("events".to_string(), "sub".to_string()),
        vec![vec![
            sql_rule("sql", "priority > 5"),
            RuleRecord {
                name: "correlation".to_string(),
                filter: Some(FilterRecord::Correlation(CorrelationRecord {
                    label: Some("created".to_string()),
                    correlation_id: Some("PT2H".to_string()),
                    to: Some("https://ns.servicebus.windows.net/q".to_string()),
                    ..Default::default()
                })),
            },
            RuleRecord {
                name: "$Default".to_string(),
                filter: Some(FilterRecord::True),
            },
            RuleRecord {
                name: "bare".to_string(),
                filter: None,
            },
        ]],
    );

    let namespace = walk_namespace(&directory, &no_filter()).await.unwrap();
    let rules = &namespace.topics[0].subscriptions[0].rules;
    assert_eq!(rules.len(), 4);

    match &rules[0].properties.filter {
        Some(RuleFilter::Sql { filter }) => assert_eq!(filter.sql_expression, "priority > 5"),
        other => panic!("expected sql filter, got {other:?}"),
    }

    // Correlation fields are copied verbatim, never capped or normalized.
    match &rules[1].properties.filter {
        Some(RuleFilter::Correlation { filter }) => {
            assert_eq!(filter.label.as_deref(), Some("created"));
            assert_eq!(filter.correlation_id.as_deref(), Some("PT2H"));
            assert_eq!(
                filter.to.as_deref(),
                Some("https://ns.servicebus.windows.net/q")
            );
            assert_eq!(filter.session_id, None);
        }
        other => panic!("expected correlation filter, got {other:?}"),
    }

    assert_eq!(rules[2].properties.filter, None);
    assert_eq!(rules[3].properties.filter, None);
}

#[tokio::test]
async fn test_filter_applies_to_queues_and_topics_only() {
    let mut directory = orders_namespace();
    // Subscription names that the filter would reject must still be kept.
    directory.subscriptions.insert(
        "order-events".to_string(),
        vec![vec![subscription("zzz"), subscription("yyy")]],
    );

    let filter = EntityFilter::new(["^order"]).unwrap();
    let namespace = walk_namespace(&directory, &filter).await.unwrap();

    assert_eq!(
        names(&namespace.queues, |q| q.name.as_str()),
        ["orders", "orders-retry"]
    );
    assert_eq!(names(&namespace.topics, |t| t.name.as_str()), ["order-events"]);
    assert_eq!(
        names(&namespace.topics[0].subscriptions, |s| s.name.as_str()),
        ["zzz", "yyy"]
    );
}

#[tokio::test]
async fn test_excluded_topic_listings_are_never_consulted() {
    let mut directory = orders_namespace();
    // A failure under the excluded topic must not surface.
    directory.failing_rules = Some(("audit".to_string(), "first".to_string()));

    let filter = EntityFilter::new(["order"]).unwrap();
    let namespace = walk_namespace(&directory, &filter).await.unwrap();
    assert_eq!(names(&namespace.topics, |t| t.name.as_str()), ["order-events"]);
}

#[tokio::test]
async fn test_rule_listing_failure_aborts_walk() {
    let mut directory = orders_namespace();
    directory.failing_rules = Some(("audit".to_string(), "third".to_string()));

    let err = walk_namespace(&directory, &no_filter()).await.unwrap_err();
    assert!(matches!(err, ExportError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_namespace_failure_aborts_walk() {
    let mut directory = orders_namespace();
    directory.fail_namespace = true;

    let err = walk_namespace(&directory, &no_filter()).await.unwrap_err();
    assert!(matches!(err, ExportError::Status { status: 401, .. }));
}

#[tokio::test]
async fn test_malformed_duration_aborts_walk() {
    let mut directory = FakeDirectory::named("ns");
    directory.queues = vec![vec![QueueRecord {
        name: "orders".to_string(),
        default_message_time_to_live: Some("forever".to_string()),
        ..Default::default()
    }]];

    let err = walk_namespace(&directory, &no_filter()).await.unwrap_err();
    assert!(matches!(err, ExportError::Duration(v) if v == "forever"));
}

#[tokio::test]
async fn test_malformed_forward_reference_aborts_walk() {
    let mut directory = FakeDirectory::named("ns");
    directory.queues = vec![vec![QueueRecord {
        name: "orders".to_string(),
        forward_to: Some("https://ns.servicebus.windows.net/a/b/c".to_string()),
        ..Default::default()
    }]];

    let err = walk_namespace(&directory, &no_filter()).await.unwrap_err();
    assert!(matches!(err, ExportError::ForwardReference(_)));
}

fn namespace(name: &str, queues: &[&str], topics: &[&str]) -> Namespace {
    Namespace {
        name: name.to_string(),
        queues: queues
            .iter()
            .map(|q| Queue {
                name: q.to_string(),
                ..Default::default()
            })
            .collect(),
        topics: topics
            .iter()
            .map(|t| Topic {
                name: t.to_string(),
                ..Default::default()
            })
            .collect(),
    }
}

#[test]
fn test_aggregate_without_group_is_identity() {
    let namespaces = vec![
        namespace("one", &["q1"], &["t1"]),
        namespace("two", &["q2"], &["t2"]),
    ];
    assert_eq!(aggregate(namespaces.clone(), ""), namespaces);
}

#[test]
fn test_aggregate_concatenates_under_group() {
    let first = namespace("one", &["q1", "shared"], &["t1"]);
    let second = namespace("two", &["shared"], &["t2", "t3"]);

    let grouped = aggregate(vec![first.clone(), second.clone()], "emulator");
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].name, "emulator");

    let expected_queues: Vec<_> = first.queues.iter().chain(&second.queues).cloned().collect();
    let expected_topics: Vec<_> = first.topics.iter().chain(&second.topics).cloned().collect();
    assert_eq!(grouped[0].queues, expected_queues);
    assert_eq!(grouped[0].topics, expected_topics);
}

#[test]
fn test_aggregate_group_over_nothing_is_empty_namespace() {
    let grouped = aggregate(vec![], "emulator");
    assert_eq!(grouped, vec![namespace("emulator", &[], &[])]);
}

#[test]
fn test_assemble_adds_console_logging() {
    let config = assemble(vec![namespace("one", &[], &[])]);
    assert_eq!(config.user_config.logging.kind, "console");
    assert_eq!(config.user_config.namespaces.len(), 1);
}

fn connector() -> FakeConnector {
    let mut second = FakeDirectory::named("second-ns");
    second.queues = vec![vec![queue("payments")]];
    second.topics = vec![vec![topic("payment-events")]];

    let mut connector = FakeConnector::default();
    connector
        .directories
        .insert("cs-1".to_string(), orders_namespace());
    connector.directories.insert("cs-2".to_string(), second);
    connector
}

#[tokio::test]
async fn test_generate_config_one_namespace_per_connection() {
    let connector = connector();
    let connections = vec!["cs-1".to_string(), "cs-2".to_string()];

    let config = generate_config(&connector, &connections, &no_filter(), "")
        .await
        .unwrap();

    let namespaces = &config.user_config.namespaces;
    assert_eq!(names(namespaces, |n| n.name.as_str()), ["orders-ns", "second-ns"]);
    assert_eq!(*connector.connected.lock().unwrap(), connections);
}

#[tokio::test]
async fn test_generate_config_groups_namespaces() {
    let connector = connector();
    let connections = vec!["cs-1".to_string(), "cs-2".to_string()];

    let config = generate_config(&connector, &connections, &no_filter(), "local")
        .await
        .unwrap();

    let namespaces = &config.user_config.namespaces;
    assert_eq!(namespaces.len(), 1);
    assert_eq!(namespaces[0].name, "local");
    assert_eq!(
        names(&namespaces[0].queues, |q| q.name.as_str()),
        ["orders", "billing", "orders-retry", "payments"]
    );
    assert_eq!(
        names(&namespaces[0].topics, |t| t.name.as_str()),
        ["order-events", "audit", "payment-events"]
    );
}

#[tokio::test]
async fn test_generate_config_stops_at_first_failure() {
    let mut connector = connector();
    connector
        .directories
        .get_mut("cs-1")
        .unwrap()
        .failing_rules = Some(("audit".to_string(), "third".to_string()));
    let connections = vec!["cs-1".to_string(), "cs-2".to_string()];

    let result = generate_config(&connector, &connections, &no_filter(), "local").await;

    assert!(result.is_err());
    // The second connection is never opened.
    assert_eq!(*connector.connected.lock().unwrap(), ["cs-1".to_string()]);
}

#[tokio::test]
async fn test_generate_config_with_no_connections() {
    let connector = FakeConnector::default();
    let config = generate_config(&connector, &[], &no_filter(), "")
        .await
        .unwrap();
    assert!(config.user_config.namespaces.is_empty());
}

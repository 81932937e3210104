use futures::TryStreamExt;
use tracing::{debug, info};

use crate::directory::{
    DirectoryService, FilterRecord, QueueRecord, RuleRecord, SubscriptionRecord, TopicRecord, drain,
};
use crate::model::{
    CorrelationFilter, Namespace, Queue, QueueProperties, Rule, RuleFilter, RuleProperties,
    SqlFilter, Subscription, SubscriptionProperties, Topic, TopicProperties,
};
use crate::normalize::{
    EntityFilter, MAX_DUPLICATE_DETECTION, MAX_TIME_TO_LIVE, cap_duration,
    normalize_forward_reference,
};
use crate::utils::Result;

/// Walks one namespace: queues, then topics with their subscriptions and
/// rules.
///
/// `filter` applies to queue and topic names only. Every subscription of an
/// included topic is exported, and every rule of those subscriptions.
pub async fn walk_namespace<D>(directory: &D, filter: &EntityFilter) -> Result<Namespace>
where
    D: DirectoryService + ?Sized,
{
    let properties = directory.namespace_properties().await?;
    debug!(namespace = %properties.name, "walking namespace");

    let queues = collect_queues(directory, filter).await?;
    let topics = collect_topics(directory, filter).await?;

    info!(
        namespace = %properties.name,
        queues = queues.len(),
        topics = topics.len(),
        "exported namespace"
    );

    Ok(Namespace {
        name: properties.name,
        queues,
        topics,
    })
}

async fn collect_queues<D>(directory: &D, filter: &EntityFilter) -> Result<Vec<Queue>>
where
    D: DirectoryService + ?Sized,
{
    let mut pages = directory.list_queues();
    let mut queues = Vec::new();

    while let Some(page) = pages.try_next().await? {
        for record in page {
            if !filter.matches(&record.name) {
                debug!(queue = %record.name, "queue excluded by filter");
                continue;
            }
            queues.push(map_queue(record)?);
        }
    }

    Ok(queues)
}

async fn collect_topics<D>(directory: &D, filter: &EntityFilter) -> Result<Vec<Topic>>
where
    D: DirectoryService + ?Sized,
{
    let mut pages = directory.list_topics();
    let mut topics = Vec::new();

    while let Some(page) = pages.try_next().await? {
        for record in page {
            if !filter.matches(&record.name) {
                debug!(topic = %record.name, "topic excluded by filter");
                continue;
            }
            let subscriptions = collect_subscriptions(directory, &record.name).await?;
            topics.push(map_topic(record, subscriptions)?);
        }
    }

    Ok(topics)
}

async fn collect_subscriptions<D>(directory: &D, topic: &str) -> Result<Vec<Subscription>>
where
    D: DirectoryService + ?Sized,
{
    let records = drain(directory.list_subscriptions(topic)).await?;
    let mut subscriptions = Vec::with_capacity(records.len());

    for record in records {
        let rules = drain(directory.list_rules(topic, &record.name))
            .await?
            .into_iter()
            .map(map_rule)
            .collect();
        subscriptions.push(map_subscription(record, rules)?);
    }

    Ok(subscriptions)
}

fn map_queue(record: QueueRecord) -> Result<Queue> {
    Ok(Queue {
        name: record.name,
        properties: QueueProperties {
            dead_lettering_on_message_expiration: record.dead_lettering_on_message_expiration,
            default_message_time_to_live: cap_duration(
                record.default_message_time_to_live,
                MAX_TIME_TO_LIVE,
            )?,
            duplicate_detection_history_time_window: cap_duration(
                record.duplicate_detection_history_time_window,
                MAX_DUPLICATE_DETECTION,
            )?,
            forward_dead_lettered_messages_to: normalize_forward_reference(
                record.forward_dead_lettered_messages_to,
            )?,
            forward_to: normalize_forward_reference(record.forward_to)?,
            lock_duration: record.lock_duration,
            max_delivery_count: record.max_delivery_count,
            requires_duplicate_detection: record.requires_duplicate_detection,
            requires_session: record.requires_session,
        },
    })
}

fn map_topic(record: TopicRecord, subscriptions: Vec<Subscription>) -> Result<Topic> {
    Ok(Topic {
        name: record.name,
        properties: TopicProperties {
            default_message_time_to_live: cap_duration(
                record.default_message_time_to_live,
                MAX_TIME_TO_LIVE,
            )?,
            duplicate_detection_history_time_window: cap_duration(
                record.duplicate_detection_history_time_window,
                MAX_DUPLICATE_DETECTION,
            )?,
            requires_duplicate_detection: record.requires_duplicate_detection,
        },
        subscriptions,
    })
}

fn map_subscription(record: SubscriptionRecord, rules: Vec<Rule>) -> Result<Subscription> {
    Ok(Subscription {
        name: record.name,
        properties: SubscriptionProperties {
            dead_lettering_on_message_expiration: record.dead_lettering_on_message_expiration,
            default_message_time_to_live: cap_duration(
                record.default_message_time_to_live,
                MAX_TIME_TO_LIVE,
            )?,
            lock_duration: record.lock_duration,
            max_delivery_count: record.max_delivery_count,
            forward_dead_lettered_messages_to: normalize_forward_reference(
                record.forward_dead_lettered_messages_to,
            )?,
            forward_to: normalize_forward_reference(record.forward_to)?,
            requires_session: record.requires_session,
        },
        rules,
    })
}

fn map_rule(record: RuleRecord) -> Rule {
    let filter = match record.filter {
        Some(FilterRecord::Sql { expression }) => Some(RuleFilter::Sql {
            filter: SqlFilter {
                sql_expression: expression,
            },
        }),
        Some(FilterRecord::Correlation(c)) => Some(RuleFilter::Correlation {
            filter: CorrelationFilter {
                content_type: c.content_type,
                correlation_id: c.correlation_id,
                label: c.label,
                reply_to: c.reply_to,
                reply_to_session_id: c.reply_to_session_id,
                session_id: c.session_id,
                to: c.to,
            },
        }),
        Some(other) => {
            debug!(rule = %record.name, filter = ?other, "rule filter has no emulator equivalent");
            None
        }
        None => None,
    };

    Rule {
        name: record.name,
        properties: RuleProperties { filter },
    }
}

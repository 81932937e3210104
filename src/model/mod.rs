//! The `model` module defines the configuration document loaded by the
//! messaging emulator at startup.
//!
//! Field names serialize in PascalCase to match the emulator's `Config.json`.
//! Every property is optional: an absent value means the emulator applies its
//! own default, which is not the same as an explicit zero or `false`.

use serde::Serialize;

/// Root of the emulator configuration file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    pub user_config: UserConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserConfig {
    pub namespaces: Vec<Namespace>,
    pub logging: Logging,
}

/// Emulator log sink. The exporter always writes the console sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Logging {
    #[serde(rename = "Type")]
    pub kind: String,
}

impl Logging {
    pub fn console() -> Self {
        Self {
            kind: "console".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Namespace {
    pub name: String,
    pub queues: Vec<Queue>,
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Queue {
    pub name: String,
    pub properties: QueueProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dead_lettering_on_message_expiration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_message_time_to_live: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_detection_history_time_window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_dead_lettered_messages_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delivery_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_duplicate_detection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_session: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Topic {
    pub name: String,
    pub properties: TopicProperties,
    pub subscriptions: Vec<Subscription>,
}

/// Topic properties are always written, absent ones as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicProperties {
    pub default_message_time_to_live: Option<String>,
    pub duplicate_detection_history_time_window: Option<String>,
    pub requires_duplicate_detection: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subscription {
    pub name: String,
    pub properties: SubscriptionProperties,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dead_lettering_on_message_expiration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_message_time_to_live: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delivery_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_dead_lettered_messages_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_session: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Rule {
    pub name: String,
    pub properties: RuleProperties,
}

/// A rule's filter. `None` is a rule whose filter the emulator cannot express
/// (true/false filters, unknown kinds); it serializes as an empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleProperties {
    #[serde(flatten)]
    pub filter: Option<RuleFilter>,
}

impl From<RuleFilter> for RuleProperties {
    fn from(filter: RuleFilter) -> Self {
        Self {
            filter: Some(filter),
        }
    }
}

/// Filter payload, tagged by `FilterType` (`"Sql"` or `"Correlation"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "FilterType")]
pub enum RuleFilter {
    Sql {
        #[serde(rename = "SqlFilter")]
        filter: SqlFilter,
    },
    Correlation {
        #[serde(rename = "CorrelationFilter")]
        filter: CorrelationFilter,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SqlFilter {
    pub sql_expression: String,
}

/// Correlation filter fields. `Label` and `ReplyTo` are always written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CorrelationFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub label: Option<String>,
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

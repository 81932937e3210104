//! Entity records as reported by the management API.
//!
//! Values are kept raw: durations are the service's ISO-8601 strings and
//! forwarding targets may be full URLs. Normalization happens in the export.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamespaceProperties {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueRecord {
    pub name: String,
    pub dead_lettering_on_message_expiration: Option<bool>,
    pub default_message_time_to_live: Option<String>,
    pub duplicate_detection_history_time_window: Option<String>,
    pub forward_dead_lettered_messages_to: Option<String>,
    pub forward_to: Option<String>,
    pub lock_duration: Option<String>,
    pub max_delivery_count: Option<i32>,
    pub requires_duplicate_detection: Option<bool>,
    pub requires_session: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicRecord {
    pub name: String,
    pub default_message_time_to_live: Option<String>,
    pub duplicate_detection_history_time_window: Option<String>,
    pub requires_duplicate_detection: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionRecord {
    pub name: String,
    pub dead_lettering_on_message_expiration: Option<bool>,
    pub default_message_time_to_live: Option<String>,
    pub forward_dead_lettered_messages_to: Option<String>,
    pub forward_to: Option<String>,
    pub lock_duration: Option<String>,
    pub max_delivery_count: Option<i32>,
    pub requires_session: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleRecord {
    pub name: String,
    pub filter: Option<FilterRecord>,
}

/// Filter variants the service can attach to a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterRecord {
    Sql { expression: String },
    Correlation(CorrelationRecord),
    True,
    False,
    /// Any other `i:type`, kept by name for logging.
    Unknown(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationRecord {
    pub content_type: Option<String>,
    pub correlation_id: Option<String>,
    pub label: Option<String>,
    pub reply_to: Option<String>,
    pub reply_to_session_id: Option<String>,
    pub session_id: Option<String>,
    pub to: Option<String>,
}

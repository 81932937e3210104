use crate::model::{Config, Logging, Namespace, UserConfig};

/// Folds namespaces under `group`.
///
/// An empty group leaves the list as is. Otherwise the result is a single
/// namespace named `group` holding every queue and topic, in connection order
/// then listing order. Duplicate names across sources are kept.
pub fn aggregate(namespaces: Vec<Namespace>, group: &str) -> Vec<Namespace> {
    if group.is_empty() {
        return namespaces;
    }

    let mut grouped = Namespace {
        name: group.to_string(),
        ..Default::default()
    };
    for namespace in namespaces {
        grouped.queues.extend(namespace.queues);
        grouped.topics.extend(namespace.topics);
    }

    vec![grouped]
}

/// Wraps namespaces into the emulator's root document with console logging.
pub fn assemble(namespaces: Vec<Namespace>) -> Config {
    Config {
        user_config: UserConfig {
            namespaces,
            logging: Logging::console(),
        },
    }
}

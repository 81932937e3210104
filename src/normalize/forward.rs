use url::Url;

use crate::utils::{ExportError, Result};

/// Reduces a forwarding target to the entity path the emulator expects.
///
/// The management API reports `ForwardTo` and `ForwardDeadLetteredMessagesTo`
/// either as a bare entity path or as a full URL such as
/// `https://ns.servicebus.windows.net/topic/subscription`. URLs keep only their
/// path: one segment is a queue or topic, two are `topic/subscription`.
/// Segments are percent-decoded; a decoded segment containing `/` is rejected
/// so the result never gains segments. Values without a scheme are returned
/// untouched, so applying this twice is the same as applying it once.
pub fn normalize_forward_reference(value: Option<String>) -> Result<Option<String>> {
    value.map(relative_reference).transpose()
}

fn relative_reference(value: String) -> Result<String> {
    if !has_scheme(&value) {
        return Ok(value);
    }

    let url = Url::parse(&value).map_err(|_| ExportError::ForwardReference(value.clone()))?;
    let segments = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(decode_segment)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    if segments.iter().any(|s| s.contains('/')) {
        return Err(ExportError::ForwardReference(value));
    }

    match segments.as_slice() {
        [entity] => Ok(entity.clone()),
        [topic, subscription] => Ok(format!("{topic}/{subscription}")),
        _ => Err(ExportError::ForwardReference(value)),
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// `scheme://` where scheme is `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn has_scheme(value: &str) -> bool {
    let Some((scheme, _)) = value.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

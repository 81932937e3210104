use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use crate::utils::{ExportError, Result};

type HmacSha256 = Hmac<Sha256>;

/// How requests against the namespace are authorized.
#[derive(Clone, PartialEq)]
pub enum Credential {
    SharedKey { name: String, key: String },
    /// A pre-signed `SharedAccessSignature ...` token, sent as is.
    Signature(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SharedKey { name, .. } => f
                .debug_struct("SharedKey")
                .field("name", name)
                .field("key", &"<redacted>")
                .finish(),
            Self::Signature(_) => f.debug_tuple("Signature").field(&"<redacted>").finish(),
        }
    }
}

/// Parsed namespace connection string, e.g.
/// `Endpoint=sb://ns.servicebus.windows.net/;SharedAccessKeyName=...;SharedAccessKey=...`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionString {
    /// Host, with port when one was given.
    pub host: String,
    pub credential: Credential,
    /// Development emulators are reached over plain http.
    pub use_development_emulator: bool,
}

impl ConnectionString {
    pub fn base_url(&self) -> String {
        let scheme = if self.use_development_emulator {
            "http"
        } else {
            "https"
        };
        format!("{scheme}://{}/", self.host)
    }

    /// Value for the `Authorization` header, valid until `expiry` (Unix seconds).
    pub fn authorization(&self, expiry: i64) -> Result<String> {
        match &self.credential {
            Credential::SharedKey { name, key } => {
                sign_token(&self.base_url().to_lowercase(), name, key, expiry)
            }
            Credential::Signature(signature) => Ok(signature.clone()),
        }
    }
}

impl FromStr for ConnectionString {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: &str| ExportError::ConnectionString(message.to_string());

        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;
        let mut signature = None;
        let mut use_development_emulator = false;

        for pair in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid("expected Key=Value pairs separated by ';'"))?;
            let value = value.trim().to_string();

            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value),
                "sharedaccesskeyname" => key_name = Some(value),
                "sharedaccesskey" => key = Some(value),
                "sharedaccesssignature" => signature = Some(value),
                "usedevelopmentemulator" => {
                    use_development_emulator = value.eq_ignore_ascii_case("true")
                }
                _ => {}
            }
        }

        let endpoint = endpoint.ok_or_else(|| invalid("missing Endpoint"))?;
        let url = Url::parse(&endpoint).map_err(|e| invalid(&format!("bad Endpoint: {e}")))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("Endpoint has no host"))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let credential = match (key_name, key, signature) {
            (Some(name), Some(key), _) => Credential::SharedKey { name, key },
            (_, _, Some(signature)) => Credential::Signature(signature),
            _ => {
                return Err(invalid(
                    "need SharedAccessKeyName and SharedAccessKey, or SharedAccessSignature",
                ));
            }
        };

        Ok(Self {
            host,
            credential,
            use_development_emulator,
        })
    }
}

/// Builds a shared access signature for `resource_uri`:
/// `sig = base64(hmac_sha256(key, enc(uri) + "\n" + expiry))`.
pub fn sign_token(resource_uri: &str, key_name: &str, key: &str, expiry: i64) -> Result<String> {
    let encoded_uri = urlencoding::encode(resource_uri);
    let string_to_sign = format!("{encoded_uri}\n{expiry}");

    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| ExportError::ConnectionString(format!("unusable SharedAccessKey: {e}")))?;
    mac.update(string_to_sign.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    Ok(format!(
        "SharedAccessSignature sr={encoded_uri}&sig={}&se={expiry}&skn={}",
        urlencoding::encode(&signature),
        urlencoding::encode(key_name),
    ))
}

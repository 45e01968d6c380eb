//! URI → descriptor, enforcing the trust boundary.
//!
//! Flow:
//! 1. No query (or an empty one): all defaults plus a fresh key.
//! 2. Cosmetic fields are read as-is, whatever the URI's origin.
//! 3. Trust = caller assertion OR embedded token equals ours.
//! 4. Trusted: sensitive fields are read from the URI.
//!    Untrusted: `SensitiveFields::DEFAULT` replaces the whole group.

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::codec::{TerminalUriCodec, param};
use crate::config::UntrustedJsonPolicy;
use crate::descriptor::{
    CosmeticFields, EnvironmentVariables, InstantiatedDescriptor, SensitiveFields,
    TerminalLocation, new_key,
};
use crate::error::CodecError;

/// Why a decoded descriptor's sensitive fields are what they are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustOutcome {
    /// The URI had no query; everything is default.
    NoQuery,
    /// The caller vouched for the URI's origin.
    Asserted,
    /// The embedded token matched this codec's token.
    TokenMatched,
    /// Neither; sensitive fields were replaced by defaults.
    Untrusted,
}

impl TrustOutcome {
    pub fn is_trusted(self) -> bool {
        matches!(self, Self::Asserted | Self::TokenMatched)
    }
}

impl TerminalUriCodec {
    /// Decode a terminal URI.
    ///
    /// `trusted` is the caller asserting the URI originated internally,
    /// which skips the token check. Returns an error only when a structured
    /// field that is going to be read holds malformed JSON.
    pub fn decode(&self, uri: &str, trusted: bool) -> Result<InstantiatedDescriptor, CodecError> {
        self.decode_with_outcome(uri, trusted).map(|(d, _)| d)
    }

    /// Like [`decode`](Self::decode), also reporting the trust decision.
    pub fn decode_with_outcome(
        &self,
        uri: &str,
        trusted: bool,
    ) -> Result<(InstantiatedDescriptor, TrustOutcome), CodecError> {
        let params = match extract_query(uri) {
            Some(query) if !query.is_empty() => QueryParams::parse(&query),
            _ => {
                tracing::debug!("terminal URI has no query, using defaults");
                return Ok((InstantiatedDescriptor::defaults(), TrustOutcome::NoQuery));
            }
        };

        let cosmetic = self.read_cosmetic(&params);

        let outcome = if trusted {
            TrustOutcome::Asserted
        } else if params
            .get(param::TRUST_TOKEN)
            .is_some_and(|t| self.token.matches(t))
        {
            TrustOutcome::TokenMatched
        } else {
            TrustOutcome::Untrusted
        };

        let sensitive = if outcome.is_trusted() {
            read_sensitive(&params)?
        } else {
            if self.config.untrusted_json == UntrustedJsonPolicy::Validate {
                read_sensitive(&params)?;
            }
            let dropped: Vec<&str> = param::SENSITIVE
                .into_iter()
                .filter(|name| params.get(name).is_some_and(|v| !v.is_empty()))
                .collect();
            if !dropped.is_empty() {
                tracing::warn!(
                    key = %cosmetic.key,
                    ?dropped,
                    "untrusted terminal URI: ignoring sensitive fields"
                );
            }
            SensitiveFields::DEFAULT
        };

        Ok((InstantiatedDescriptor { cosmetic, sensitive }, outcome))
    }

    fn read_cosmetic(&self, params: &QueryParams) -> CosmeticFields {
        let key = match params.get(param::KEY).filter(|k| !k.is_empty()) {
            Some(k) => k.to_string(),
            None if self.config.generate_missing_key => new_key(),
            None => String::new(),
        };
        let default_location = match params.get(param::DEFAULT_LOCATION) {
            None | Some("") => TerminalLocation::default(),
            Some(raw) => TerminalLocation::from_query_value(raw).unwrap_or_else(|| {
                tracing::debug!(value = raw, "unknown defaultLocation, using panel");
                TerminalLocation::default()
            }),
        };
        CosmeticFields {
            title: params.text(param::TITLE),
            key,
            remain_on_clean_exit: params.get(param::REMAIN_ON_CLEAN_EXIT) == Some("true"),
            default_location,
            icon: params.text(param::ICON),
        }
    }
}

fn read_sensitive(params: &QueryParams) -> Result<SensitiveFields, CodecError> {
    let command = params
        .json::<serde_json::Value>(param::COMMAND)?
        .filter(|c| !c.is_null());
    let environment_variables = params
        .json::<Vec<(String, String)>>(param::ENVIRONMENT_VARIABLES)?
        .map(|pairs| pairs.into_iter().collect::<EnvironmentVariables>())
        .unwrap_or_default();
    Ok(SensitiveFields {
        cwd: params.text(param::CWD),
        command,
        environment_variables,
        preserved_commands: params
            .json::<Vec<String>>(param::PRESERVED_COMMANDS)?
            .unwrap_or_default(),
        initial_input: params.text(param::INITIAL_INPUT),
    })
}

/// Query text of `uri`, read defensively.
///
/// Well-formed URIs go through the URL parser. Anything else falls back to
/// the text after the first `?`, without any fragment.
fn extract_query(uri: &str) -> Option<String> {
    match Url::parse(uri) {
        Ok(url) => url.query().map(str::to_owned),
        Err(e) => {
            tracing::debug!(error = %e, "terminal URI did not parse, splitting query by hand");
            let (_, rest) = uri.split_once('?')?;
            let query = rest.split_once('#').map_or(rest, |(q, _)| q);
            Some(query.to_owned())
        }
    }
}

/// Decoded query pairs. Lookups return the first occurrence of a name.
struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn parse(query: &str) -> Self {
        Self(url::form_urlencoded::parse(query.as_bytes()).into_owned().collect())
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn text(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    /// Parse a JSON-valued parameter. Absent or empty values are `None`.
    fn json<T: DeserializeOwned>(&self, name: &'static str) -> Result<Option<T>, CodecError> {
        match self.get(name) {
            None | Some("") => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| CodecError::malformed(name, e)),
        }
    }
}

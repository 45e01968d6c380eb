//! The codec value shared by the encoder and decoder.
//!
//! A `TerminalUriCodec` binds one trust token to one URI namespace. Build it
//! once at startup (usually via [`TerminalUriCodec::for_process`]) and pass it
//! to whatever needs to mint or read terminal URIs. It holds no mutable
//! state, so it can be shared freely across threads.

use std::sync::OnceLock;
use url::Url;

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::trust::TrustToken;

/// Query parameter names on the wire.
pub(crate) mod param {
    pub(crate) const CWD: &str = "cwd";
    pub(crate) const COMMAND: &str = "command";
    pub(crate) const TITLE: &str = "title";
    pub(crate) const KEY: &str = "key";
    pub(crate) const REMAIN_ON_CLEAN_EXIT: &str = "remainOnCleanExit";
    pub(crate) const DEFAULT_LOCATION: &str = "defaultLocation";
    pub(crate) const ICON: &str = "icon";
    pub(crate) const ENVIRONMENT_VARIABLES: &str = "environmentVariables";
    pub(crate) const PRESERVED_COMMANDS: &str = "preservedCommands";
    pub(crate) const INITIAL_INPUT: &str = "initialInput";
    pub(crate) const TRUST_TOKEN: &str = "trustToken";

    /// Parameters whose values can influence the spawned process.
    pub(crate) const SENSITIVE: [&str; 5] = [
        CWD,
        COMMAND,
        ENVIRONMENT_VARIABLES,
        PRESERVED_COMMANDS,
        INITIAL_INPUT,
    ];
}

#[derive(Clone, Debug)]
pub struct TerminalUriCodec {
    pub(crate) token: TrustToken,
    pub(crate) config: CodecConfig,
    /// `scheme://host` with no path, query or fragment
    pub(crate) base: Url,
}

impl TerminalUriCodec {
    pub fn new(token: TrustToken, config: CodecConfig) -> Result<Self, CodecError> {
        let base = parse_base(&config)?;
        Ok(Self {
            token,
            config,
            base,
        })
    }

    /// Codec bound to this process's trust token.
    pub fn for_process(config: CodecConfig) -> Result<Self, CodecError> {
        Self::new(TrustToken::process()?.clone(), config)
    }

    /// Process token with the default namespace. Built on first use.
    pub fn process_default() -> Result<&'static TerminalUriCodec, CodecError> {
        static CODEC: OnceLock<TerminalUriCodec> = OnceLock::new();
        if let Some(codec) = CODEC.get() {
            return Ok(codec);
        }
        let codec = Self::for_process(CodecConfig::default())?;
        Ok(CODEC.get_or_init(|| codec))
    }

    pub fn token(&self) -> &TrustToken {
        &self.token
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// The fixed prefix every encoded URI starts with.
    pub fn prefix(&self) -> &str {
        self.base.as_str()
    }

    /// Whether `uri` belongs to this codec's namespace (scheme and host).
    ///
    /// The decoder does not call this: matching the family is the caller's
    /// job before handing a URI over.
    pub fn matches(&self, uri: &str) -> bool {
        in_namespace(&self.base, uri)
    }
}

/// Whether `uri` belongs to the default terminal URI namespace.
pub fn is_terminal_uri(uri: &str) -> bool {
    static DEFAULT_BASE: OnceLock<Option<Url>> = OnceLock::new();
    DEFAULT_BASE
        .get_or_init(|| parse_base(&CodecConfig::default()).ok())
        .as_ref()
        .is_some_and(|base| in_namespace(base, uri))
}

fn in_namespace(base: &Url, uri: &str) -> bool {
    let Ok(parsed) = Url::parse(uri) else {
        return false;
    };
    parsed.scheme() == base.scheme() && parsed.host_str() == base.host_str()
}

fn parse_base(config: &CodecConfig) -> Result<Url, CodecError> {
    let prefix = format!("{}://{}", config.scheme, config.host);
    let unusable = |reason: String| CodecError::UnusablePrefix {
        prefix: prefix.clone(),
        reason,
    };

    if config.host.is_empty() {
        return Err(unusable("host is empty".to_string()));
    }
    let base = Url::parse(&prefix).map_err(|source| CodecError::InvalidPrefix {
        prefix: prefix.clone(),
        source,
    })?;
    if base.host_str().is_none_or(str::is_empty) {
        return Err(unusable("host is empty".to_string()));
    }
    if base.query().is_some() || base.fragment().is_some() {
        return Err(unusable("prefix must not carry a query or fragment".to_string()));
    }
    if !matches!(base.path(), "" | "/") {
        return Err(unusable(format!("unexpected path `{}`", base.path())));
    }
    Ok(base)
}

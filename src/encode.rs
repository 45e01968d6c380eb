use serde::Serialize;

use crate::codec::{TerminalUriCodec, param};
use crate::descriptor::{InstantiatedDescriptor, TerminalDescriptor, new_key};
use crate::error::CodecError;

impl TerminalUriCodec {
    /// Encode a (possibly partial) descriptor into a terminal URI.
    ///
    /// Missing fields are filled with their defaults, a missing or empty key
    /// is replaced by a fresh UUID, and the codec's trust token is stamped
    /// into the query. Field contents are passed through unvalidated.
    pub fn encode(&self, descriptor: &TerminalDescriptor) -> Result<String, CodecError> {
        let key = descriptor
            .key
            .as_deref()
            .filter(|k| !k.is_empty())
            .map_or_else(new_key, str::to_owned);

        // A null command is absent on the wire, as the decoder reads it.
        let command = descriptor
            .command
            .as_ref()
            .filter(|c| !c.is_null())
            .map(|c| to_json(param::COMMAND, c))
            .transpose()?;
        // [key, value] pairs, never an object.
        let environment = descriptor
            .environment_variables
            .as_ref()
            .map(|env| {
                let pairs: Vec<(&str, &str)> =
                    env.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                to_json(param::ENVIRONMENT_VARIABLES, &pairs)
            })
            .transpose()?;
        let preserved = to_json(
            param::PRESERVED_COMMANDS,
            descriptor.preserved_commands.as_deref().unwrap_or_default(),
        )?;

        let mut url = self.base.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(param::CWD, descriptor.cwd.as_deref().unwrap_or_default());
            if let Some(command) = &command {
                query.append_pair(param::COMMAND, command);
            }
            query.append_pair(param::TITLE, descriptor.title.as_deref().unwrap_or_default());
            query.append_pair(param::KEY, &key);
            query.append_pair(
                param::REMAIN_ON_CLEAN_EXIT,
                if descriptor.remain_on_clean_exit.unwrap_or(false) {
                    "true"
                } else {
                    "false"
                },
            );
            query.append_pair(
                param::DEFAULT_LOCATION,
                descriptor.default_location.unwrap_or_default().as_str(),
            );
            query.append_pair(param::ICON, descriptor.icon.as_deref().unwrap_or_default());
            if let Some(environment) = &environment {
                query.append_pair(param::ENVIRONMENT_VARIABLES, environment);
            }
            query.append_pair(param::PRESERVED_COMMANDS, &preserved);
            query.append_pair(
                param::INITIAL_INPUT,
                descriptor.initial_input.as_deref().unwrap_or_default(),
            );
            query.append_pair(param::TRUST_TOKEN, self.token.as_str());
        }

        let uri = String::from(url);
        debug_assert!(
            uri.starts_with(self.prefix()),
            "encoded terminal URI {uri} lost prefix {}",
            self.prefix()
        );
        Ok(uri)
    }

    /// Re-encode a decoded descriptor, keeping its key.
    pub fn encode_instantiated(
        &self,
        descriptor: &InstantiatedDescriptor,
    ) -> Result<String, CodecError> {
        self.encode(&TerminalDescriptor::from(descriptor))
    }
}

fn to_json<T: Serialize + ?Sized>(field: &'static str, value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(|source| CodecError::Encode { field, source })
}

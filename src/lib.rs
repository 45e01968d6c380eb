//! Trust-boundary URI codec for terminal launch descriptors.
//!
//! Terminal descriptors travel as URIs through links, saved workspace state
//! and IPC, so a URI can come from anywhere. Cosmetic fields (title, icon,
//! placement) are honored from any source. Sensitive fields (cwd, command,
//! environment, exit commands, initial input) are honored only when the URI
//! carries this process's trust token or the caller vouches for it, and then
//! only as a group.

pub mod codec;
pub mod config;
mod decode;
pub mod descriptor;
mod encode;
pub mod error;
pub mod trust;

pub use codec::{TerminalUriCodec, is_terminal_uri};
pub use config::{CodecConfig, UntrustedJsonPolicy};
pub use decode::TrustOutcome;
pub use descriptor::{
    CosmeticFields, EnvironmentVariables, InstantiatedDescriptor, SensitiveFields,
    TerminalDescriptor, TerminalLocation,
};
pub use error::CodecError;
pub use trust::TrustToken;

/// Encode with the process-wide default codec.
pub fn encode(descriptor: &TerminalDescriptor) -> Result<String, CodecError> {
    TerminalUriCodec::process_default()?.encode(descriptor)
}

/// Decode with the process-wide default codec.
pub fn decode(uri: &str, trusted: bool) -> Result<InstantiatedDescriptor, CodecError> {
    TerminalUriCodec::process_default()?.decode(uri, trusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_text() -> impl Strategy<Value = String> {
        "[ -~]{0,24}"
    }

    fn arb_location() -> impl Strategy<Value = TerminalLocation> {
        prop_oneof![Just(TerminalLocation::Panel), Just(TerminalLocation::Editor)]
    }

    fn arb_command() -> impl Strategy<Value = serde_json::Value> {
        arb_text().prop_map(|exe| serde_json::json!({ "exe": exe }))
    }

    fn arb_descriptor() -> impl Strategy<Value = TerminalDescriptor> {
        (
            (
                proptest::option::of(arb_text()),
                proptest::option::of("[a-z0-9-]{1,16}"),
                proptest::option::of(any::<bool>()),
                proptest::option::of(arb_location()),
                proptest::option::of(arb_text()),
            ),
            (
                proptest::option::of(arb_command()),
                proptest::option::of(arb_text()),
                proptest::option::of(proptest::collection::btree_map(
                    "[A-Z_=]{1,8}",
                    arb_text(),
                    0..4,
                )),
                proptest::option::of(proptest::collection::vec(arb_text(), 0..4)),
                proptest::option::of(arb_text()),
            ),
        )
            .prop_map(
                |(
                    (title, key, remain_on_clean_exit, default_location, icon),
                    (command, cwd, environment_variables, preserved_commands, initial_input),
                )| TerminalDescriptor {
                    title,
                    key,
                    remain_on_clean_exit,
                    default_location,
                    icon,
                    command,
                    cwd,
                    environment_variables,
                    preserved_commands,
                    initial_input,
                },
            )
    }

    fn codec_with_secret(secret: impl Into<String>) -> TerminalUriCodec {
        TerminalUriCodec::new(TrustToken::from_secret(secret), CodecConfig::default()).unwrap()
    }

    fn test_codec() -> TerminalUriCodec {
        codec_with_secret("prop-token")
    }

    fn expected_cosmetic(d: &TerminalDescriptor, key: &str) -> CosmeticFields {
        CosmeticFields {
            title: d.title.clone().unwrap_or_default(),
            key: key.to_string(),
            remain_on_clean_exit: d.remain_on_clean_exit.unwrap_or(false),
            default_location: d.default_location.unwrap_or_default(),
            icon: d.icon.clone().unwrap_or_default(),
        }
    }

    fn expected_sensitive(d: &TerminalDescriptor) -> SensitiveFields {
        SensitiveFields {
            cwd: d.cwd.clone().unwrap_or_default(),
            command: d.command.clone(),
            environment_variables: d.environment_variables.clone().unwrap_or_default(),
            preserved_commands: d.preserved_commands.clone().unwrap_or_default(),
            initial_input: d.initial_input.clone().unwrap_or_default(),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn trusted_round_trip_reproduces_fields(d in arb_descriptor()) {
            let codec = test_codec();
            let decoded = codec.decode(&codec.encode(&d).unwrap(), true).unwrap();
            if let Some(key) = d.key.as_deref() {
                prop_assert_eq!(&decoded.cosmetic.key, key);
            }
            let expected = expected_cosmetic(&d, &decoded.cosmetic.key);
            prop_assert_eq!(&decoded.cosmetic, &expected);
            prop_assert_eq!(&decoded.sensitive, &expected_sensitive(&d));
        }

        #[test]
        fn cosmetic_fields_pass_through_any_trust_outcome(
            d in arb_descriptor(),
            forged in "[a-z]{1,12}",
        ) {
            let ours = test_codec();
            let theirs = codec_with_secret(forged);
            let uri = theirs.encode(&d).unwrap();
            let untrusted = ours.decode(&uri, false).unwrap();
            let trusted = ours.decode(&uri, true).unwrap();
            prop_assert_eq!(&untrusted.cosmetic, &trusted.cosmetic);
            let expected = expected_cosmetic(&d, &trusted.cosmetic.key);
            prop_assert_eq!(&untrusted.cosmetic, &expected);
        }

        #[test]
        fn sensitive_group_is_all_or_nothing(
            d in arb_descriptor(),
            trusted_token in any::<bool>(),
        ) {
            let ours = test_codec();
            let encoder = if trusted_token {
                test_codec()
            } else {
                codec_with_secret("elsewhere")
            };
            let uri = encoder.encode(&d).unwrap();
            let (decoded, outcome) = ours.decode_with_outcome(&uri, false).unwrap();
            if outcome.is_trusted() {
                prop_assert!(trusted_token);
                prop_assert_eq!(&decoded.sensitive, &expected_sensitive(&d));
            } else {
                prop_assert!(!trusted_token);
                prop_assert_eq!(&decoded.sensitive, &SensitiveFields::DEFAULT);
            }
        }
    }

    #[test]
    fn free_functions_share_the_process_token() {
        let d = TerminalDescriptor {
            cwd: Some("/srv".to_string()),
            ..TerminalDescriptor::default()
        };
        let uri = encode(&d).unwrap();
        assert!(is_terminal_uri(&uri));
        assert_eq!(decode(&uri, false).unwrap().sensitive.cwd, "/srv");
    }
}

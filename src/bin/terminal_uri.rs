//! Command-line front end for the terminal URI codec.
//!
//! Each invocation is its own process with its own trust token, so a URI
//! encoded by one run decodes as untrusted in the next unless `--trusted`
//! is passed.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use terminal_uri::config::{config_path, load_json_config};
use terminal_uri::{EnvironmentVariables, TerminalDescriptor, TerminalLocation, TerminalUriCodec};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "terminal-uri", about = "Encode and decode terminal launch URIs")]
struct Cli {
    /// Codec config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "TERMINAL_URI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the URI for a descriptor
    Encode(EncodeArgs),
    /// Print the descriptor a URI decodes to
    Decode {
        uri: String,
        /// Vouch for the URI's origin, skipping the token check
        #[arg(long)]
        trusted: bool,
    },
}

#[derive(clap::Args)]
struct EncodeArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    key: Option<String>,
    #[arg(long)]
    remain_on_clean_exit: bool,
    /// panel or editor (also 1 or 2)
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    icon: Option<String>,
    /// Launch command as JSON, e.g. '{"exe":"bash","args":["-l"]}'
    #[arg(long)]
    command: Option<String>,
    #[arg(long)]
    cwd: Option<PathBuf>,
    /// KEY=VALUE, repeatable
    #[arg(long = "env")]
    env: Vec<String>,
    /// Repeatable
    #[arg(long = "preserved-command")]
    preserved_commands: Vec<String>,
    #[arg(long)]
    initial_input: Option<String>,
}

impl EncodeArgs {
    fn into_descriptor(self) -> Result<TerminalDescriptor> {
        let default_location = self
            .location
            .as_deref()
            .map(|raw| {
                TerminalLocation::from_query_value(raw)
                    .with_context(|| {
                        format!("unknown location `{raw}` (expected panel, editor, 1 or 2)")
                    })
            })
            .transpose()?;
        let command = self
            .command
            .as_deref()
            .map(serde_json::from_str::<serde_json::Value>)
            .transpose()
            .context("--command is not valid JSON")?;
        let environment_variables = if self.env.is_empty() {
            None
        } else {
            let mut env = EnvironmentVariables::new();
            for entry in &self.env {
                let Some((k, v)) = entry.split_once('=') else {
                    bail!("--env expects KEY=VALUE, got `{entry}`");
                };
                env.insert(k.to_string(), v.to_string());
            }
            Some(env)
        };

        Ok(TerminalDescriptor {
            title: self.title,
            key: self.key,
            remain_on_clean_exit: Some(self.remain_on_clean_exit),
            default_location,
            icon: self.icon,
            command,
            cwd: self.cwd.map(|p| p.to_string_lossy().into_owned()),
            environment_variables,
            preserved_commands: (!self.preserved_commands.is_empty())
                .then_some(self.preserved_commands),
            initial_input: self.initial_input,
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_json_config(&cli.config.unwrap_or_else(config_path));
    let codec = TerminalUriCodec::for_process(config).context("failed to initialise codec")?;

    match cli.command {
        Command::Encode(args) => {
            let descriptor = args.into_descriptor()?;
            println!("{}", codec.encode(&descriptor)?);
        }
        Command::Decode { uri, trusted } => {
            let report = decode_report(&codec, &uri, trusted)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

/// Decoded descriptor plus the trust decision, for printing.
fn decode_report(codec: &TerminalUriCodec, uri: &str, trusted: bool) -> Result<serde_json::Value> {
    if !codec.matches(uri) {
        bail!("not a {} URI", codec.prefix());
    }
    let (descriptor, outcome) = codec
        .decode_with_outcome(uri, trusted)
        .context("failed to decode terminal URI")?;
    Ok(serde_json::json!({
        "trust": outcome,
        "descriptor": descriptor,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use terminal_uri::{CodecConfig, TrustToken};

    fn parse(args: &[&str]) -> EncodeArgs {
        let mut argv = vec!["terminal-uri", "encode"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Encode(args) => args,
            Command::Decode { .. } => panic!("expected encode"),
        }
    }

    #[test]
    fn encode_args_build_descriptor() {
        let d = parse(&[
            "--title",
            "logs",
            "--location",
            "editor",
            "--command",
            r#"{"exe":"bash"}"#,
            "--cwd",
            "/tmp",
            "--env",
            "A=1",
            "--env",
            "B=x=y",
            "--preserved-command",
            "make",
        ])
        .into_descriptor()
        .unwrap();
        assert_eq!(d.title.as_deref(), Some("logs"));
        assert_eq!(d.default_location, Some(TerminalLocation::Editor));
        assert_eq!(d.command, Some(serde_json::json!({ "exe": "bash" })));
        assert_eq!(d.cwd.as_deref(), Some("/tmp"));
        let env = d.environment_variables.unwrap();
        assert_eq!(env["A"], "1");
        assert_eq!(env["B"], "x=y");
        assert_eq!(d.preserved_commands, Some(vec!["make".to_string()]));
    }

    #[test]
    fn bad_env_entry_is_rejected() {
        assert!(parse(&["--env", "NOEQUALS"]).into_descriptor().is_err());
    }

    #[test]
    fn bad_command_json_is_rejected() {
        assert!(parse(&["--command", "{oops"]).into_descriptor().is_err());
    }

    #[test]
    fn unknown_location_is_rejected() {
        let err = parse(&["--location", "sidebar"]).into_descriptor().unwrap_err();
        assert!(err.to_string().contains("panel, editor, 1 or 2"), "got: {err}");
    }

    #[test]
    fn numeric_location_is_accepted() {
        let d = parse(&["--location", "2"]).into_descriptor().unwrap();
        assert_eq!(d.default_location, Some(TerminalLocation::Editor));
    }

    fn codec_with_secret(secret: &str) -> TerminalUriCodec {
        TerminalUriCodec::new(TrustToken::from_secret(secret), CodecConfig::default()).unwrap()
    }

    fn sample_descriptor() -> TerminalDescriptor {
        TerminalDescriptor {
            title: Some("logs".to_string()),
            cwd: Some("/srv".to_string()),
            ..TerminalDescriptor::default()
        }
    }

    #[test]
    fn decode_rejects_foreign_scheme() {
        let codec = codec_with_secret("ours");
        let err = decode_report(&codec, "https://launch?cwd=%2Fetc", true).unwrap_err();
        assert!(err.to_string().contains("not a tuic-terminal://launch URI"), "got: {err}");
    }

    #[test]
    fn decode_reports_matching_token() {
        let codec = codec_with_secret("ours");
        let uri = codec.encode(&sample_descriptor()).unwrap();
        let report = decode_report(&codec, &uri, false).unwrap();
        assert_eq!(report["trust"], "token_matched");
        assert_eq!(report["descriptor"]["cwd"], "/srv");
        assert_eq!(report["descriptor"]["title"], "logs");
    }

    #[test]
    fn decode_reports_untrusted_foreign_token() {
        let ours = codec_with_secret("ours");
        let uri = codec_with_secret("forged").encode(&sample_descriptor()).unwrap();
        let report = decode_report(&ours, &uri, false).unwrap();
        assert_eq!(report["trust"], "untrusted");
        assert_eq!(report["descriptor"]["cwd"], "");
        assert_eq!(report["descriptor"]["title"], "logs");
    }

    #[test]
    fn decode_reports_asserted_trust_for_forged_token() {
        let ours = codec_with_secret("ours");
        let uri = codec_with_secret("forged").encode(&sample_descriptor()).unwrap();
        let report = decode_report(&ours, &uri, true).unwrap();
        assert_eq!(report["trust"], "asserted");
        assert_eq!(report["descriptor"]["cwd"], "/srv");
    }
}

//! Purpose: Hold top-level CLI command dispatch for `dbus-tool`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Every argument is parsed before any message leaves the process.
//! Invariants: Output envelopes and exit code semantics match `main.rs` helpers.

use super::*;
use dbus_tool::api::{
    Message, MessageSink, message_json, parse_argument_list, parse_single_value, parse_value,
    parsed_json, signature_prefix_length, validate_signature,
};
use tracing::debug;

pub(super) fn dispatch_command(
    command: Command,
    options: BusOptions,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    let mut sink = StdoutSink;
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "dbus-tool", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Call {
            service,
            object_path,
            interface,
            method,
            args,
        } => {
            let message = Message::method_call(&service, &object_path, &interface, &method)?
                .with_args(parse_argument_list(&args)?);
            sink.deliver(&options, &message)?;
            Ok(RunOutcome::ok())
        }
        Command::Signal {
            service,
            object_path,
            interface,
            signal,
            args,
        } => {
            let message = Message::signal(&service, &object_path, &interface, &signal)?
                .with_args(parse_argument_list(&args)?);
            sink.deliver(&options, &message)?;
            Ok(RunOutcome::ok())
        }
        Command::Set {
            service,
            object_path,
            interface,
            property,
            value,
        } => {
            let value = parse_single_value(&value)?;
            let message =
                Message::property_set(&service, &object_path, &interface, &property, value)?;
            sink.deliver(&options, &message)?;
            Ok(RunOutcome::ok())
        }
        Command::Parse {
            signature,
            value,
            json,
        } => {
            let parsed = parse_value(&signature, &value)?;
            debug!(
                signature = %signature,
                consumed_signature = parsed.consumed.signature,
                consumed_text = parsed.consumed.text,
                "parsed value"
            );
            let is_tty = io::stdout().is_terminal();
            if json || !is_tty {
                emit_json(parsed_json(&signature, &value, &parsed));
            } else {
                println!(
                    "{}",
                    value_tree::render_parsed(&signature, &value, &parsed, color_mode.use_color(is_tty))
                );
            }
            Ok(RunOutcome::ok())
        }
        Command::Check {
            signature,
            dict_entry,
        } => {
            let prefix_length = signature_prefix_length(&signature, dict_entry);
            let verdict = if dict_entry && signature.starts_with('{') {
                if prefix_length == signature.len() {
                    Ok(())
                } else {
                    Err(Error::new(ErrorKind::Signature)
                        .with_message("invalid dict entry signature")
                        .with_signature_offset(prefix_length))
                }
            } else {
                validate_signature(&signature)
            };

            let mut report = Map::new();
            report.insert("signature".to_string(), json!(signature));
            report.insert("valid".to_string(), json!(verdict.is_ok()));
            report.insert("prefix_length".to_string(), json!(prefix_length));
            if let Err(err) = &verdict {
                report.insert("error".to_string(), error_json(err)["error"].clone());
            }
            emit_json(json!({ "check": report }));

            let exit_code = match verdict {
                Ok(()) => 0,
                Err(err) => to_exit_code(err.kind()),
            };
            Ok(RunOutcome::with_code(exit_code))
        }
    }
}

/// Offline sink: writes each message envelope to stdout for a transport to pick up.
struct StdoutSink;

impl MessageSink for StdoutSink {
    fn deliver(&mut self, options: &BusOptions, message: &Message) -> Result<(), Error> {
        debug!(
            member = %message.member,
            signature = %message.signature(),
            args = message.args.len(),
            "emitting message"
        );
        emit_json(message_json(options, message));
        Ok(())
    }
}

//! Line commands typed by the reviewer.

use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use review_core::{DecisionAction, FieldLabel, Msg};

use crate::platform::app::Input;

pub const HELP: &str = "\
Commands:
  files                 refresh the document list
  open <name|number>    select a document
  start                 run the extraction
  locate <field|1-3>    highlight a field value in the document (repeat for next match)
  review / back         enter or leave the review page (times the review)
  accept / reject       decide the document
  download              save the document and its debug image
  help                  show this text
  quit                  exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Msg),
    Help,
    Quit,
}

/// Parses one input line. `files` resolves document numbers. Blank lines
/// yield `Ok(None)`.
pub fn parse_command(line: &str, files: &[String]) -> Result<Option<Command>, String> {
    let line = line.trim();
    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };

    let command = match verb.to_lowercase().as_str() {
        "" => return Ok(None),
        "files" | "ls" => Command::Dispatch(Msg::RefreshFiles),
        "open" | "o" => Command::Dispatch(Msg::DocumentSelected(resolve_document(arg, files)?)),
        "start" | "s" => Command::Dispatch(Msg::StartClicked),
        "locate" | "l" => Command::Dispatch(Msg::LocateClicked(resolve_field(arg)?)),
        "review" => Command::Dispatch(Msg::ReviewPageEntered),
        "back" => Command::Dispatch(Msg::ReviewPageLeft),
        "accept" => Command::Dispatch(Msg::DecisionClicked(DecisionAction::Accept)),
        "reject" => Command::Dispatch(Msg::DecisionClicked(DecisionAction::Reject)),
        "download" => Command::Dispatch(Msg::DownloadClicked),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("Unknown command `{other}`; type `help`.")),
    };
    Ok(Some(command))
}

fn resolve_document(arg: &str, files: &[String]) -> Result<String, String> {
    if arg.is_empty() {
        return Err("Usage: open <name|number>".to_string());
    }
    match arg.parse::<usize>() {
        Ok(number) => files
            .get(number.wrapping_sub(1))
            .cloned()
            .ok_or_else(|| format!("No document number {number}.")),
        Err(_) => Ok(arg.to_string()),
    }
}

fn resolve_field(arg: &str) -> Result<FieldLabel, String> {
    if let Ok(number) = arg.parse::<usize>() {
        return FieldLabel::ALL
            .get(number.wrapping_sub(1))
            .copied()
            .ok_or_else(|| format!("No field number {number}."));
    }
    FieldLabel::from_wire(arg).ok_or_else(|| format!("Unknown field `{arg}`."))
}

/// Reads stdin lines into the app loop; end of input quits.
pub fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Quit);
    });
}

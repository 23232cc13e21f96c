//! Interactive resolve/unresolve loop over stdin.

use std::io::{self, BufRead, Write};

use redpen_core::{AnalysisKind, Session};

use crate::display;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Resolve { kind: Option<AnalysisKind>, item: usize },
    Unresolve { kind: Option<AnalysisKind>, item: usize },
    Show,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  r [rules|general] N   mark item N resolved
  u [rules|general] N   mark item N unresolved
  s                     show the overlay again
  q                     quit";

/// Parse one input line. Item numbers are one-based, as displayed.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = parts.split_first() else {
        return Ok(Command::Show);
    };

    let target = |args: &[&str]| -> Result<(Option<AnalysisKind>, usize), String> {
        let (kind, number) = match args {
            [number] => (None, *number),
            [kind, number] => (Some(kind.parse::<AnalysisKind>()?), *number),
            _ => return Err("expected an item number".to_string()),
        };
        let item: usize = number
            .parse()
            .map_err(|_| format!("not an item number: {number}"))?;
        if item == 0 {
            return Err("items are numbered from 1".to_string());
        }
        Ok((kind, item))
    };

    match verb {
        "r" | "resolve" => {
            let (kind, item) = target(args)?;
            Ok(Command::Resolve { kind, item })
        }
        "u" | "unresolve" => {
            let (kind, item) = target(args)?;
            Ok(Command::Unresolve { kind, item })
        }
        "s" | "show" => Ok(Command::Show),
        "h" | "help" | "?" => Ok(Command::Help),
        "q" | "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other}")),
    }
}

/// Apply a resolve/unresolve command to the session.
///
/// `kind` defaults to the first kind with a run. Returns a status line.
pub fn apply(session: &mut Session, command: &Command) -> Result<String, String> {
    let (kind, item, resolve) = match command {
        Command::Resolve { kind, item } => (*kind, *item, true),
        Command::Unresolve { kind, item } => (*kind, *item, false),
        _ => return Ok(String::new()),
    };

    let kind = kind
        .or_else(|| {
            AnalysisKind::ALL
                .into_iter()
                .find(|k| session.analysis(*k).is_some())
        })
        .ok_or_else(|| "no analysis to update".to_string())?;

    let id = session
        .analysis(kind)
        .ok_or_else(|| format!("no {kind} analysis"))?
        .occurrence(item - 1)
        .cloned()
        .ok_or_else(|| format!("{kind} has no item {item}"))?;

    let changed = if resolve {
        session.resolve(kind, &id)
    } else {
        session.unresolve(kind, &id)
    };

    let state = if resolve { "resolved" } else { "unresolved" };
    Ok(if changed {
        format!("{kind} item {item} {state}")
    } else {
        format!("{kind} item {item} already {state}")
    })
}

pub fn print_session(session: &Session) {
    for kind in AnalysisKind::ALL {
        if let Some(analysis) = session.analysis(kind) {
            display::print_analysis(analysis, session.store(kind));
        }
    }
}

/// Read commands until `q` or end of input, re-rendering after each change.
pub fn run(session: &mut Session) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("redpen> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };

        match parse_command(&line?) {
            Ok(Command::Quit) => return Ok(()),
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Show) => print_session(session),
            Ok(command) => match apply(session, &command) {
                Ok(status) => {
                    println!("{status}\n");
                    print_session(session);
                }
                Err(e) => println!("{e}"),
            },
            Err(e) => println!("{e} (type h for help)"),
        }
    }
}

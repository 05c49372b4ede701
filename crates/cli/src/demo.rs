//! Interactive console: each stdin line is either a new query value or a
//! `:command` standing in for a UI gesture. Snapshots are printed as they
//! are published.

use hotel_search_core::{CommitSource, DomainFilter, SearchOrchestrator, Snapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::render::{snapshot_lines, Highlight};

pub const HELP: &str = "\
Type a line to replace the query. Commands:
  :focus          open the dropdown
  :esc            dismiss the dropdown
  :enter          commit the current query
  :submit         same as the search button
  :pick N         commit suggestion N
  :region N       commit popular region N
  :hotel N        commit popular hotel N
  :domain X       switch filter (all, cn, hmt, intl)
  :clear          clear query and results
  :quit           exit";

#[derive(Debug, Clone, PartialEq)]
pub enum DemoCommand {
    Edit(String),
    Focus,
    Dismiss,
    Commit(CommitSource),
    Domain(DomainFilter),
    Clear,
    Help,
    Quit,
}

/// Rows are shown 1-based; convert to a 0-based index.
fn row_index(arg: Option<&str>, what: &str) -> Result<usize, String> {
    let arg = arg.ok_or_else(|| format!("usage: :{what} N"))?;
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("'{arg}' is not a row number")),
    }
}

pub fn parse_line(line: &str) -> Result<DemoCommand, String> {
    let Some(command) = line.strip_prefix(':') else {
        return Ok(DemoCommand::Edit(line.to_string()));
    };
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    match name {
        "focus" => Ok(DemoCommand::Focus),
        "esc" | "dismiss" => Ok(DemoCommand::Dismiss),
        "enter" => Ok(DemoCommand::Commit(CommitSource::Enter)),
        "submit" => Ok(DemoCommand::Commit(CommitSource::SubmitButton)),
        "pick" => Ok(DemoCommand::Commit(CommitSource::Suggestion(row_index(arg, "pick")?))),
        "region" => Ok(DemoCommand::Commit(CommitSource::HotRegion(row_index(arg, "region")?))),
        "hotel" => Ok(DemoCommand::Commit(CommitSource::HotHotel(row_index(arg, "hotel")?))),
        "domain" => {
            let filter = arg.ok_or("usage: :domain all|cn|hmt|intl")?;
            filter.parse::<DomainFilter>().map(DemoCommand::Domain)
        }
        "clear" => Ok(DemoCommand::Clear),
        "help" | "?" => Ok(DemoCommand::Help),
        "quit" | "q" => Ok(DemoCommand::Quit),
        other => Err(format!("unknown command ':{other}' (try :help)")),
    }
}

fn apply(orchestrator: &SearchOrchestrator, command: DemoCommand) {
    match command {
        DemoCommand::Edit(query) => orchestrator.on_query_change(&query),
        DemoCommand::Focus => orchestrator.on_focus(),
        DemoCommand::Dismiss => orchestrator.on_dismiss(),
        DemoCommand::Commit(source) => {
            if !orchestrator.on_commit(source) {
                eprintln!("nothing to commit");
            }
        }
        DemoCommand::Domain(filter) => orchestrator.on_filter_change(filter),
        DemoCommand::Clear => orchestrator.on_clear(),
        DemoCommand::Help => eprintln!("{HELP}"),
        DemoCommand::Quit => {}
    }
}

fn print_snapshot(snap: &Snapshot, json: bool, hl: Highlight) {
    if json {
        match serde_json::to_string(snap) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("Could not encode snapshot: {e}"),
        }
    } else {
        for line in snapshot_lines(snap, hl) {
            println!("{line}");
        }
        println!();
    }
}

/// Drive `orchestrator` from stdin until EOF or `:quit`.
pub async fn run(orchestrator: SearchOrchestrator, json: bool) -> std::io::Result<()> {
    let hl = if json { Highlight::Plain } else { Highlight::detect() };
    let mut snapshots = orchestrator.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !json {
        eprintln!("{HELP}\n");
    }
    orchestrator.on_focus();

    let mut last_printed: Option<Snapshot> = None;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(DemoCommand::Quit) => break,
                    Ok(command) => {
                        debug!(?command, "Demo input");
                        apply(&orchestrator, command);
                    }
                    Err(msg) => eprintln!("{msg}"),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                if last_printed.as_ref() != Some(&snap) {
                    print_snapshot(&snap, json, hl);
                    last_printed = Some(snap);
                }
            }
        }
    }

    orchestrator.shutdown();
    Ok(())
}

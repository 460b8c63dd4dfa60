//! # Browse — Interactive Session Commands
//!
//! Line-oriented commands for the `browse` subcommand. Parsing and the purely
//! local commands (sort, paging, tabs, detail lookup) live here so they can be
//! tested without a terminal or a backend; commands that need the network are
//! handed back to the caller as a [`BrowseAction`].

use crate::ranking::SortKey;
use crate::session::{DashboardSession, Tab};
use anyhow::{bail, Context, Result};

pub const HELP: &str = "\
Commands:
  tab NAME       switch tab (metrics, charts, search, projects, insights)
  sort KEY       click a column header (approved, trl-1-3, trl-4-7, trl-8-9, total)
  page N         jump to page N
  next | prev    move one page
  search TEXT    search projects by name
  detail N       show search result N
  refresh        reload all data
  help           show this list
  quit           leave
";

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Tab(Tab),
    Sort(SortKey),
    Page(usize),
    Next,
    Previous,
    Search(String),
    Detail(usize),
    Refresh,
    Help,
    Quit,
}

impl std::str::FromStr for BrowseCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((v, r)) => (v, r.trim()),
            None => (line, ""),
        };
        let needs_arg = |what: &str| -> Result<()> {
            if rest.is_empty() {
                bail!("'{}' needs {}", verb, what);
            }
            Ok(())
        };
        match verb.to_lowercase().as_str() {
            "tab" => {
                needs_arg("a tab name")?;
                Ok(BrowseCommand::Tab(rest.parse()?))
            }
            "sort" => {
                needs_arg("a column")?;
                Ok(BrowseCommand::Sort(rest.parse()?))
            }
            "page" => {
                needs_arg("a page number")?;
                let n = rest
                    .parse::<usize>()
                    .with_context(|| format!("invalid page number '{}'", rest))?;
                Ok(BrowseCommand::Page(n))
            }
            "next" | "n" => Ok(BrowseCommand::Next),
            "prev" | "previous" | "p" => Ok(BrowseCommand::Previous),
            "search" => {
                needs_arg("a name")?;
                Ok(BrowseCommand::Search(rest.to_string()))
            }
            "detail" => {
                needs_arg("a result number")?;
                let n = rest
                    .parse::<usize>()
                    .with_context(|| format!("invalid result number '{}'", rest))?;
                Ok(BrowseCommand::Detail(n))
            }
            "refresh" | "r" => Ok(BrowseCommand::Refresh),
            "help" | "?" => Ok(BrowseCommand::Help),
            "quit" | "exit" | "q" => Ok(BrowseCommand::Quit),
            "" => bail!("empty command"),
            other => bail!("unknown command '{}' (try 'help')", other),
        }
    }
}

/// What the caller still has to do after [`apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseAction {
    /// Redraw the current tab.
    Redraw,
    /// Print this text instead of redrawing.
    Print(String),
    Refresh,
    Search(String),
    Quit,
}

/// Apply a command to the session. Network commands are returned untouched.
pub fn apply(session: &mut DashboardSession, command: BrowseCommand) -> BrowseAction {
    match command {
        BrowseCommand::Tab(tab) => {
            session.set_tab(tab);
            BrowseAction::Redraw
        }
        BrowseCommand::Sort(key) => {
            session.click_header(key);
            session.set_tab(Tab::Projects);
            BrowseAction::Redraw
        }
        BrowseCommand::Page(n) => {
            session.go_to_page(n);
            session.set_tab(Tab::Projects);
            BrowseAction::Redraw
        }
        BrowseCommand::Next => {
            session.next_page();
            session.set_tab(Tab::Projects);
            BrowseAction::Redraw
        }
        BrowseCommand::Previous => {
            session.previous_page();
            session.set_tab(Tab::Projects);
            BrowseAction::Redraw
        }
        BrowseCommand::Detail(n) => {
            let hit = n.checked_sub(1).and_then(|i| session.search_results().get(i));
            match hit {
                Some(detail) => BrowseAction::Print(crate::render::render_project_detail(detail)),
                None => BrowseAction::Print(format!(
                    "No search result #{} ({} results).\n",
                    n,
                    session.search_results().len()
                )),
            }
        }
        BrowseCommand::Help => BrowseAction::Print(HELP.to_string()),
        BrowseCommand::Search(term) => {
            session.set_tab(Tab::Search);
            BrowseAction::Search(term)
        }
        BrowseCommand::Refresh => BrowseAction::Refresh,
        BrowseCommand::Quit => BrowseAction::Quit,
    }
}

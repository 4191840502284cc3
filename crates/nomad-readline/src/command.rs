//! REPL command parsing.
//!
//! List positions (`<n>`) are 1-based as shown to the user.

use anyhow::{Result, anyhow, bail};
use nomad_core::travel::MAX_TRIP_DAYS;

/// A slash command as listed by `/help` and the line editor.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    /// Argument placeholders, empty for none
    pub args: &'static str,
    pub summary: &'static str,
}

impl CommandSpec {
    const fn new(name: &'static str, args: &'static str, summary: &'static str) -> Self {
        Self {
            name,
            args,
            summary,
        }
    }

    pub fn usage(&self) -> String {
        if self.args.is_empty() {
            self.name.to_string()
        } else {
            format!("{} {}", self.name, self.args)
        }
    }

    pub fn find(name: &str) -> Option<&'static CommandSpec> {
        COMMANDS.iter().find(|spec| spec.name == name)
    }
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec::new("/new", "", "start a new chat"),
    CommandSpec::new("/chats", "", "list chats"),
    CommandSpec::new("/open", "<n>", "switch to chat n"),
    CommandSpec::new("/rename", "<n> <title>", "rename chat n"),
    CommandSpec::new("/delete", "<n>", "delete chat n"),
    CommandSpec::new("/regen", "", "regenerate the last reply"),
    CommandSpec::new("/show", "<n>", "details of destination n"),
    CommandSpec::new("/fav", "<n>", "toggle destination n as favorite"),
    CommandSpec::new("/favs", "", "list favorites"),
    CommandSpec::new("/unfav", "<n>", "remove favorite n"),
    CommandSpec::new("/plan", "<n[,m..]> [days] [low|medium|high]", "plan a trip"),
    CommandSpec::new("/login", "<email> <password>", "sign in"),
    CommandSpec::new("/signup", "<email> <password>", "create an account"),
    CommandSpec::new("/guest", "", "continue as guest"),
    CommandSpec::new("/logout", "", "sign out"),
    CommandSpec::new("/help", "", "show this help"),
    CommandSpec::new("/quit", "", "exit"),
];

const BUDGETS: [&str; 3] = ["low", "medium", "high"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text sent to the assistant
    Say(String),
    New,
    Chats,
    Open(usize),
    Rename(usize, String),
    Delete(usize),
    Regen,
    Show(usize),
    Fav(usize),
    Favs,
    Unfav(usize),
    Plan {
        picks: Vec<usize>,
        days: Option<i64>,
        budget: Option<String>,
    },
    Login {
        email: String,
        password: String,
    },
    Signup {
        email: String,
        password: String,
    },
    Guest,
    Logout,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        if !line.starts_with('/') {
            return Ok(Self::Say(line.to_string()));
        }

        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        let command = match name {
            "/new" => Self::New,
            "/chats" => Self::Chats,
            "/open" => Self::Open(position(args.next())?),
            "/rename" => {
                let n = position(args.next())?;
                let title = args.collect::<Vec<_>>().join(" ");
                if title.is_empty() {
                    bail!("usage: /rename <n> <title>");
                }
                Self::Rename(n, title)
            }
            "/delete" => Self::Delete(position(args.next())?),
            "/regen" => Self::Regen,
            "/show" => Self::Show(position(args.next())?),
            "/fav" => Self::Fav(position(args.next())?),
            "/favs" => Self::Favs,
            "/unfav" => Self::Unfav(position(args.next())?),
            "/plan" => {
                let picks = args
                    .next()
                    .ok_or_else(|| anyhow!("usage: /plan <n[,m..]> [days] [budget]"))?
                    .split(',')
                    .map(|n| position(Some(n)))
                    .collect::<Result<Vec<_>>>()?;
                let mut days = None;
                let mut budget = None;
                for arg in args {
                    if let Ok(n) = arg.parse::<i64>() {
                        if !(1..=MAX_TRIP_DAYS).contains(&n) {
                            bail!("days must be between 1 and {MAX_TRIP_DAYS}");
                        }
                        days = Some(n);
                    } else if BUDGETS.contains(&arg.to_lowercase().as_str()) {
                        budget = Some(arg.to_lowercase());
                    } else {
                        bail!("unknown plan option '{arg}'");
                    }
                }
                Self::Plan {
                    picks,
                    days,
                    budget,
                }
            }
            "/login" | "/signup" => {
                let (Some(email), Some(password)) = (args.next(), args.next()) else {
                    bail!("usage: {name} <email> <password>");
                };
                let email = email.to_string();
                let password = password.to_string();
                if name == "/login" {
                    Self::Login { email, password }
                } else {
                    Self::Signup { email, password }
                }
            }
            "/guest" => Self::Guest,
            "/logout" => Self::Logout,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            other => bail!("unknown command {other}, try /help"),
        };
        Ok(command)
    }
}

fn position(arg: Option<&str>) -> Result<usize> {
    let arg = arg.ok_or_else(|| anyhow!("missing list number"))?;
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => bail!("'{arg}' is not a list number"),
    }
}

/// Picks the `n`th (1-based) item of a list.
pub fn nth<T>(items: &[T], n: usize) -> Result<&T> {
    n.checked_sub(1)
        .and_then(|index| items.get(index))
        .ok_or_else(|| anyhow!("no item {n} (list has {})", items.len()))
}

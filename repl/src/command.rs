//! Command-line parsing for the front desk.

use circ_core::{MemberId, MemberStatus};
use circ_session::{BookForm, RegistrationForm};

/// A parsed front desk command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        username: String,
        password: String,
        admin: bool,
    },
    Logout,
    Whoami,
    Books {
        search: Option<String>,
    },
    Categories,
    Borrow {
        isbn: String,
    },
    Return {
        isbn: String,
    },
    Loans,
    History,
    AddBook(BookForm),
    DeleteBook {
        isbn: String,
    },
    Register(RegistrationForm),
    Members,
    SetStatus {
        member: MemberId,
        status: MemberStatus,
    },
    Transactions {
        member: MemberId,
    },
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        let tokens = tokenize(trimmed)?;
        let Some((name, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let command = match name.to_lowercase().as_str() {
            "login" => parse_login(args)?,
            "logout" => {
                no_args(args, "logout")?;
                Command::Logout
            }
            "whoami" => Command::Whoami,
            "books" => Command::Books {
                search: (!args.is_empty()).then(|| args.join(" ")),
            },
            "categories" => Command::Categories,
            "borrow" => Command::Borrow {
                isbn: one_arg(args, "borrow <isbn>")?,
            },
            "return" => Command::Return {
                isbn: one_arg(args, "return <isbn>")?,
            },
            "loans" => Command::Loans,
            "history" => Command::History,
            "add-book" => match args {
                [isbn, title, author, category] => Command::AddBook(BookForm {
                    isbn: isbn.clone(),
                    title: title.clone(),
                    author: author.clone(),
                    category: category.clone(),
                }),
                _ => return Err(usage("add-book <isbn> <title> <author> <category>")),
            },
            "delete-book" => Command::DeleteBook {
                isbn: one_arg(args, "delete-book <isbn>")?,
            },
            "register" => match args {
                [username, password, first_name, last_name, email] => {
                    Command::Register(RegistrationForm {
                        username: username.clone(),
                        password: password.clone(),
                        first_name: first_name.clone(),
                        last_name: last_name.clone(),
                        email: email.clone(),
                    })
                }
                _ => {
                    return Err(usage(
                        "register <username> <password> <first> <last> <email>",
                    ))
                }
            },
            "members" => Command::Members,
            "set-status" => match args {
                [member, status] => Command::SetStatus {
                    member: parse_member_id(member)?,
                    status: parse_status(status)?,
                },
                _ => return Err(usage("set-status <member> <Active|Suspended|Expired>")),
            },
            "transactions" => Command::Transactions {
                member: parse_member_id(&one_arg(args, "transactions <member>")?)?,
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command '{other}'. Type 'help' for commands")),
        };
        Ok(Some(command))
    }

    /// The command word, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "login",
            Command::Logout => "logout",
            Command::Whoami => "whoami",
            Command::Books { .. } => "books",
            Command::Categories => "categories",
            Command::Borrow { .. } => "borrow",
            Command::Return { .. } => "return",
            Command::Loans => "loans",
            Command::History => "history",
            Command::AddBook(_) => "add-book",
            Command::DeleteBook { .. } => "delete-book",
            Command::Register(_) => "register",
            Command::Members => "members",
            Command::SetStatus { .. } => "set-status",
            Command::Transactions { .. } => "transactions",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }
}

fn usage(form: &str) -> String {
    format!("usage: {form}")
}

fn no_args(args: &[String], form: &str) -> Result<(), String> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(usage(form))
    }
}

fn one_arg(args: &[String], form: &str) -> Result<String, String> {
    match args {
        [only] => Ok(only.clone()),
        _ => Err(usage(form)),
    }
}

fn parse_login(args: &[String]) -> Result<Command, String> {
    let admin = args.iter().any(|a| a == "--admin");
    let rest: Vec<&String> = args.iter().filter(|a| *a != "--admin").collect();
    match rest.as_slice() {
        [username, password] => Ok(Command::Login {
            username: (*username).clone(),
            password: (*password).clone(),
            admin,
        }),
        _ => Err(usage("login <username> <password> [--admin]")),
    }
}

/// Accepts `42` or the displayed form `m42`.
fn parse_member_id(raw: &str) -> Result<MemberId, String> {
    let digits = raw.strip_prefix('m').unwrap_or(raw);
    digits
        .parse::<u64>()
        .map(MemberId::new)
        .map_err(|_| format!("Invalid member id '{raw}'"))
}

fn parse_status(raw: &str) -> Result<MemberStatus, String> {
    [
        MemberStatus::Active,
        MemberStatus::Suspended,
        MemberStatus::Expired,
    ]
    .into_iter()
    .find(|status| status.as_str().eq_ignore_ascii_case(raw))
    .ok_or_else(|| format!("Unknown status '{raw}': expected Active, Suspended or Expired"))
}

/// Split a line on whitespace, keeping single- or double-quoted runs together.
pub fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unterminated quote".to_string());
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

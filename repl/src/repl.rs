//! Core REPL state and execution.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use circ_core::messages;
use circ_engine::{Clock, SystemClock};
use circ_session::{Library, Session, SessionError};
use circ_store::LendingStore;

use crate::command::Command;
use crate::format::{
    format_books, format_categories, format_loans, format_members, format_transactions,
    help_text,
};

/// REPL state: the library and whoever is logged in.
pub struct Repl<S, C = SystemClock> {
    library: Library<S, C>,
    session: Option<Session>,
    finished: bool,
}

impl<S: LendingStore, C: Clock> Repl<S, C> {
    pub fn new(library: Library<S, C>) -> Self {
        Self {
            library,
            session: None,
            finished: false,
        }
    }

    pub fn library(&self) -> &Library<S, C> {
        &self.library
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether `quit` has been executed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Execute one input line. The error string is ready to show the user.
    pub fn execute(&mut self, input: &str) -> Result<String, String> {
        let Some(command) = Command::parse(input)? else {
            return Ok(String::new());
        };
        tracing::debug!(command = command.name(), "executing");
        self.dispatch(command).map_err(|err| match err {
            Failure::Session(err) => err.message(),
            Failure::Usage(msg) => msg,
        })
    }

    fn dispatch(&mut self, command: Command) -> Result<String, Failure> {
        let output = match command {
            Command::Login {
                username,
                password,
                admin,
            } => {
                // A failed attempt must not leave the previous user at the desk.
                self.session = None;
                let session = if admin {
                    self.library.login_admin(&username, &password)?
                } else {
                    self.library.login_member(&username, &password)?
                };
                let greeting = format!("Logged in as {} ({})", session.username, session.role);
                self.session = Some(session);
                greeting
            }
            Command::Logout => match self.session.take() {
                Some(session) => format!("Logged out {}", session.username),
                None => return Err(Failure::not_logged_in()),
            },
            Command::Whoami => match &self.session {
                Some(session) => format!("{} ({})", session.username, session.role),
                None => "Not logged in".to_string(),
            },
            Command::Books { search } => {
                let books = self.library.books(self.current()?, search.as_deref())?;
                format_books(&books)
            }
            Command::Categories => format_categories(&self.library.categories()?),
            Command::Borrow { isbn } => {
                self.library.borrow(self.current()?, &isbn)?;
                messages::MSG_BORROWED.to_string()
            }
            Command::Return { isbn } => self.library.return_book(self.current()?, &isbn)?.message(),
            Command::Loans => format_loans(&self.library.active_loans(self.current()?)?),
            Command::History => format_loans(&self.library.history(self.current()?)?),
            Command::AddBook(form) => {
                self.library.add_book(self.current()?, form)?;
                messages::MSG_BOOK_ADDED.to_string()
            }
            Command::DeleteBook { isbn } => {
                self.library.delete_book(self.current()?, &isbn)?;
                messages::MSG_BOOK_DELETED.to_string()
            }
            Command::Register(form) => {
                let id = self.library.register_member(self.current()?, form)?;
                format!("{} ({id})", messages::MSG_MEMBER_REGISTERED)
            }
            Command::Members => format_members(&self.library.members(self.current()?)?),
            Command::SetStatus { member, status } => {
                self.library
                    .set_member_status(self.current()?, member, status)?;
                format!("Member {member} is now {status}")
            }
            Command::Transactions { member } => {
                format_transactions(&self.library.member_transactions(self.current()?, member)?)
            }
            Command::Help => help_text(),
            Command::Quit => {
                self.finished = true;
                String::new()
            }
        };
        Ok(output)
    }

    fn current(&self) -> Result<&Session, Failure> {
        self.session.as_ref().ok_or_else(Failure::not_logged_in)
    }

    /// Run a file.
    pub fn run_file(&mut self, path: &Path) -> Result<(), String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
        self.run_script(&content)
    }

    /// Run a script, one command per line, until it ends or says `quit`.
    /// Failing commands are reported and the script carries on.
    pub fn run_script(&mut self, content: &str) -> Result<(), String> {
        for line in content.lines() {
            match self.execute(line) {
                Ok(output) if !output.is_empty() => println!("{}", output),
                Ok(_) => {}
                Err(e) => eprintln!("Error: {}", e),
            }
            if self.finished {
                break;
            }
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        match &self.session {
            Some(session) => format!("circ({})> ", session.username),
            None => "circ> ".to_string(),
        }
    }

    /// Run the interactive REPL.
    pub fn interactive(&mut self) {
        println!("circ front desk v{}", env!("CARGO_PKG_VERSION"));
        println!("Type 'help' for commands, 'quit' to exit");
        println!();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        while !self.finished {
            print!("{}", self.prompt());
            if stdout.flush().is_err() {
                break;
            }

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    break;
                }
            }

            match self.execute(&line) {
                Ok(output) if !output.is_empty() => println!("{}", output),
                Ok(_) => {}
                Err(e) => eprintln!("Error: {}", e),
            }
        }
    }
}

/// Why a command did not run.
enum Failure {
    Session(SessionError),
    Usage(String),
}

impl Failure {
    fn not_logged_in() -> Self {
        Failure::Usage("Not logged in. Use 'login <username> <password>'".to_string())
    }
}

impl From<SessionError> for Failure {
    fn from(err: SessionError) -> Self {
        Failure::Session(err)
    }
}

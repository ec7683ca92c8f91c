//! Slash commands understood by the REPL.

/// Every command with its usage, in the order `/help` lists them.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/search", "/search <query>   search the web and use the results as context"),
    ("/new", "/new [title]      start a new chat"),
    ("/chats", "/chats            list chats"),
    ("/open", "/open <n|id>      switch to a chat by number or id"),
    ("/rename", "/rename <title>   rename the current chat"),
    ("/model", "/model [name]     show or change the model"),
    ("/models", "/models           list supported models"),
    ("/code", "/code             show the code panel"),
    ("/run", "/run              send the code panel to the model"),
    ("/clear", "/clear            clear the code panel"),
    ("/help", "/help             show this help"),
    ("/quit", "/quit             exit"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text to send as a message. Empty resends a pending search input.
    Send(String),
    Search(String),
    New(Option<String>),
    Chats,
    Open(String),
    Rename(String),
    Model(Option<String>),
    Models,
    Code,
    Run,
    Clear,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return Command::Send(line.to_string());
        }

        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        match name {
            "/search" => Command::Search(rest.to_string()),
            "/new" => Command::New(arg),
            "/chats" => Command::Chats,
            "/open" => Command::Open(rest.to_string()),
            "/rename" => Command::Rename(rest.to_string()),
            "/model" => Command::Model(arg),
            "/models" => Command::Models,
            "/code" => Command::Code,
            "/run" => Command::Run,
            "/clear" => Command::Clear,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

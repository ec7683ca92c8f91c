//! Interactive session: reads lines, dispatches commands and prints replies.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use codepane_application::{
    ChatDashboard, CodePanel, ConversationController, ConversationSettings, TurnOutcome,
};
use codepane_core::CodepaneError;
use codepane_core::content::{CodeDisplay, ContentService};
use codepane_core::session::{ChatMessage, Sender};
use codepane_interaction::SupportedModel;

use crate::commands::{COMMANDS, Command};
use crate::helper::CliHelper;

pub struct Repl {
    dashboard: ChatDashboard,
    content: Arc<dyn ContentService>,
    code_panel: Arc<CodePanel>,
    settings: ConversationSettings,
    controller: ConversationController,
}

enum Flow {
    Continue,
    Quit,
}

impl Repl {
    pub async fn new(
        dashboard: ChatDashboard,
        content: Arc<dyn ContentService>,
        code_panel: Arc<CodePanel>,
        settings: ConversationSettings,
    ) -> Result<Self> {
        let chat_id = dashboard
            .selected_chat_id()
            .await
            .context("no chat selected")?;
        let controller = open_controller(&dashboard, &chat_id, &content, &code_panel, &settings).await?;

        Ok(Self {
            dashboard,
            content,
            code_panel,
            settings,
            controller,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        let mut rl: Editor<CliHelper, DefaultHistory> = Editor::new()?;
        rl.set_helper(Some(CliHelper::new(SupportedModel::names())));

        println!("{}", "=== codepane ===".bright_magenta().bold());
        println!(
            "{}",
            "Type a message to chat, '/help' for commands, or '/quit' to exit.".bright_black()
        );
        println!();
        self.print_transcript().await;

        loop {
            let prompt = format!("[{}] >> ", self.controller.model());
            match rl.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }
                    match self.handle(Command::parse(&line)).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Quit) => break,
                        Err(err) => print_error(&err),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("{}", format!("Error: {err:?}").red());
                    break;
                }
            }
        }

        println!("{}", "Goodbye!".bright_green());
        Ok(())
    }

    async fn handle(&mut self, command: Command) -> Result<Flow, CodepaneError> {
        match command {
            Command::Send(text) => self.send(text).await?,
            Command::Search(query) => self.search(query).await?,
            Command::New(title) => {
                let id = self.dashboard.create_chat(title.as_deref()).await?;
                self.switch_to(&id).await?;
            }
            Command::Chats => self.list_chats().await,
            Command::Open(target) => {
                let id = self.resolve_chat(&target).await?;
                self.dashboard.select_chat(&id).await?;
                self.switch_to(&id).await?;
            }
            Command::Rename(title) => {
                if title.is_empty() {
                    return Err(CodepaneError::validation("Usage: /rename <title>"));
                }
                let id = self.controller.session_id().to_string();
                self.dashboard.rename_chat(&id, &title).await?;
                println!("{}", format!("Renamed to '{title}'.").bright_black());
            }
            Command::Model(None) => println!("{}", self.controller.model()),
            Command::Model(Some(model)) => {
                if !SupportedModel::is_supported(&model) {
                    println!("{}", format!("'{model}' is not in the model list; using it anyway.").yellow());
                }
                self.controller.select_model(model.clone());
                self.settings.model = model;
            }
            Command::Models => {
                for model in SupportedModel::names() {
                    let marker = if model == self.controller.model() { "*" } else { " " };
                    println!("{marker} {model}");
                }
            }
            Command::Code => self.print_code_panel(),
            Command::Run => self.run_code().await?,
            Command::Clear => {
                self.code_panel.clear();
                println!("{}", "Code panel cleared.".bright_black());
            }
            Command::Help => {
                for (_, usage) in COMMANDS {
                    println!("{}", usage.bright_black());
                }
            }
            Command::Quit => return Ok(Flow::Quit),
            Command::Unknown(name) => {
                println!("{}", format!("Unknown command {name}. Type /help.").bright_black());
            }
        }
        Ok(Flow::Continue)
    }

    async fn send(&mut self, text: String) -> Result<(), CodepaneError> {
        // An empty line submits the input kept by a previous /search.
        let resend = text.trim().is_empty() && self.controller.pending_context().is_some();
        if !resend {
            self.controller.set_input(text);
        }

        if !self.controller.input().trim().is_empty() {
            println!("{}", "Thinking...".bright_black());
        }
        match self.controller.submit().await? {
            TurnOutcome::Responded { message_index, code } => {
                self.follow_reply(message_index).await;
                if let Some(code) = code {
                    println!(
                        "{}",
                        format!("Code block sent to the code panel ({} lines). Type /code to view.", code.lines().count())
                            .bright_black()
                    );
                }
            }
            TurnOutcome::Failed { error } => {
                print_error(&error);
                if let Some(message) = self.controller.transcript().await.last() {
                    print_message(message);
                }
            }
        }
        Ok(())
    }

    async fn search(&mut self, query: String) -> Result<(), CodepaneError> {
        self.controller.set_input(query);
        println!("{}", "Searching...".bright_black());

        let results = self.controller.search().await?.to_string();
        println!("{}", "Search results:".bright_yellow());
        for line in results.lines() {
            println!("  {}", line.yellow());
        }
        println!(
            "{}",
            format!(
                "Press Enter to send '{}' with these results, or type a new message.",
                self.controller.input()
            )
            .bright_black()
        );
        Ok(())
    }

    /// Prints the reply at `index` as the typing animation reveals it.
    async fn follow_reply(&mut self, index: usize) {
        let interval = self.settings.typing_interval;
        let mut printed = 0;
        print!("{} ", "AI:".bright_blue().bold());

        loop {
            let (visible, done) = match self.controller.transcript().await.get(index) {
                Some(message) => (message.displaying_text().to_string(), message.is_fully_revealed()),
                None => break,
            };

            if visible.len() > printed {
                print!("{}", visible[printed..].bright_blue());
                let _ = std::io::stdout().flush();
                printed = visible.len();
            }
            if done {
                break;
            }
            tokio::time::sleep(interval).await;
        }
        println!();
        self.controller.wait_for_typing(index).await;
    }

    async fn switch_to(&mut self, id: &str) -> Result<(), CodepaneError> {
        self.controller =
            open_controller(&self.dashboard, id, &self.content, &self.code_panel, &self.settings).await?;
        let title = self
            .dashboard
            .chats()
            .await
            .into_iter()
            .find(|chat| chat.id == id)
            .map(|chat| chat.title)
            .unwrap_or_default();
        println!("{}", format!("Switched to '{title}'.").bright_green());
        self.print_transcript().await;
        Ok(())
    }

    async fn list_chats(&self) {
        let current = self.controller.session_id();
        for (n, chat) in self.dashboard.chats().await.iter().enumerate() {
            let line = format!(
                "{:>3}. {} ({} messages) {}",
                n + 1,
                chat.title,
                chat.message_count,
                chat.id.bright_black()
            );
            if chat.id == current {
                println!("{}", line.bright_green());
            } else {
                println!("{line}");
            }
        }
    }

    /// Accepts a 1-based position from `/chats` or a chat id.
    async fn resolve_chat(&self, target: &str) -> Result<String, CodepaneError> {
        if target.is_empty() {
            return Err(CodepaneError::validation("Usage: /open <n|id>"));
        }
        let chats = self.dashboard.chats().await;
        if let Ok(n) = target.parse::<usize>() {
            if let Some(chat) = n.checked_sub(1).and_then(|i| chats.get(i)) {
                return Ok(chat.id.clone());
            }
        }
        Ok(target.to_string())
    }

    async fn run_code(&self) -> Result<(), CodepaneError> {
        println!("{}", "Running...".bright_black());
        let api_key = self.settings.api_key.as_deref();
        let result = self
            .code_panel
            .run(self.content.as_ref(), self.controller.model(), api_key)
            .await;
        self.print_code_panel();
        result.map(|_| ())
    }

    fn print_code_panel(&self) {
        println!("{}", "--- code panel ---".bright_magenta());
        for line in self.code_panel.displayed_content().lines() {
            println!("{}", line.cyan());
        }
        println!("{}", "------------------".bright_magenta());
    }

    async fn print_transcript(&self) {
        if let Some(greeting) = self.controller.greeting().await {
            println!("{} {}", "AI:".bright_blue().bold(), greeting.bright_blue());
            return;
        }
        for message in self.controller.transcript().await.iter() {
            print_message(message);
        }
    }
}

async fn open_controller(
    dashboard: &ChatDashboard,
    id: &str,
    content: &Arc<dyn ContentService>,
    code_panel: &Arc<CodePanel>,
    settings: &ConversationSettings,
) -> Result<ConversationController, CodepaneError> {
    let code_display: Arc<dyn CodeDisplay> = code_panel.clone();
    ConversationController::open(
        id,
        dashboard.store(),
        content.clone(),
        code_display,
        settings.clone(),
    )
    .await
}

fn print_message(message: &ChatMessage) {
    match message.sender() {
        Sender::User => println!("{} {}", "You:".green().bold(), message.text().green()),
        Sender::Bot => println!("{} {}", "AI:".bright_blue().bold(), message.text().bright_blue()),
    }
}

fn print_error(err: &CodepaneError) {
    if err.is_validation() {
        println!("{}", err.to_string().yellow());
    } else {
        eprintln!("{}", format!("Error: {err}").red());
    }
}

//! Line-oriented console transport.
//!
//! One user per console. Lines starting with `/` are commands; anything else
//! is the label of a choice (or its 1-based number). The restart label only
//! restarts when it is not a choice at the current node.

use questline_domain::UserId;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::app::App;
use crate::use_cases::session::{ChoiceOutcome, EndingReport, Scene, SessionError, UndoResult};

/// Plain-text restart, as offered by the chat keyboard after an ending.
pub const RESTART_LABEL: &str = "Start over";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Undo,
    Progress,
    Endings,
    Help,
    Quit,
    Choose(String),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Some(Command::Choose(line.to_string()));
        };
        Some(match command.to_ascii_lowercase().as_str() {
            "start" | "restart" => Command::Start,
            "undo" | "back" => Command::Undo,
            "progress" => Command::Progress,
            "endings" => Command::Endings,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        })
    }
}

pub struct Console<'a> {
    app: &'a App,
    user: UserId,
}

impl<'a> Console<'a> {
    pub fn new(app: &'a App, user: UserId) -> Self {
        Self { app, user }
    }

    /// Serve lines from `input` until it closes or the user quits.
    pub async fn run<R, W>(&self, input: R, output: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        output.write_all(HELP.as_bytes()).await?;
        output.flush().await?;

        while let Some(line) = lines.next_line().await? {
            let Some(command) = Command::parse(&line) else {
                continue;
            };
            if command == Command::Quit {
                break;
            }
            let reply = self.handle(command).await;
            output.write_all(reply.as_bytes()).await?;
            output.flush().await?;
        }
        Ok(())
    }

    /// Execute one command and render the reply.
    pub async fn handle(&self, command: Command) -> String {
        let session = &self.app.use_cases.session;
        match command {
            Command::Start => self.restart().await,
            Command::Undo => match session.undo.execute(&self.user).await {
                Ok(result) => {
                    let scene = render_scene(result.scene());
                    match result {
                        UndoResult::Undone(_) => scene,
                        UndoResult::NothingToUndo(_) => format!("Nothing to undo.\n{scene}"),
                    }
                }
                Err(e) => render_error(&e),
            },
            Command::Progress => {
                let history = session.progress.execute(&self.user).await;
                if history.is_empty() {
                    "No choices made yet.\n".to_string()
                } else {
                    let mut out = String::from("Your choices so far:\n");
                    for (i, entry) in history.iter().enumerate() {
                        out.push_str(&format!("{}. {}\n", i + 1, entry.choice));
                    }
                    out
                }
            }
            Command::Endings => self.render_endings().await,
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
            Command::Choose(text) => self.choose(&text).await,
            Command::Unknown(text) => format!("Unknown command {text}. Type /help.\n"),
        }
    }

    async fn restart(&self) -> String {
        match self.app.use_cases.session.start.restart(&self.user).await {
            Ok(scene) => render_scene(&scene),
            Err(e) => render_error(&e),
        }
    }

    async fn choose(&self, text: &str) -> String {
        let choose = &self.app.use_cases.session.choose;
        let result = match choose.execute(&self.user, text).await {
            // Fall back to the option's number
            Err(SessionError::InvalidChoice { options }) => {
                match option_by_number(text, &options).map(str::to_string) {
                    Some(label) => choose.execute(&self.user, &label).await,
                    None => Err(SessionError::InvalidChoice { options }),
                }
            }
            other => other,
        };

        match result {
            Ok(ChoiceOutcome::Advanced(scene)) => render_scene(&scene),
            Ok(ChoiceOutcome::Restarted { scene, .. }) => format!(
                "This part of the story is missing. The quest restarts.\n{}",
                render_scene(&scene)
            ),
            Ok(ChoiceOutcome::Ended(report)) => render_ending(&report),
            Err(SessionError::NoActiveSession | SessionError::InvalidChoice { .. })
                if text.eq_ignore_ascii_case(RESTART_LABEL) =>
            {
                self.restart().await
            }
            Err(e) => render_error(&e),
        }
    }

    async fn render_endings(&self) -> String {
        let endings = &self.app.use_cases.endings;
        match (
            endings.coverage(&self.user).await,
            endings.missing(&self.user).await,
        ) {
            (Ok(coverage), Ok(_)) if coverage.is_complete() => {
                format!("Endings found: {coverage}. You have seen them all!\n")
            }
            (Ok(coverage), Ok(missing)) => format!(
                "Endings found: {coverage}. {} still hidden.\n",
                missing.len()
            ),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(user_id = %self.user, error = %e, "Failed to read endings");
                "Your endings could not be read right now.\n".to_string()
            }
        }
    }
}

const HELP: &str = "Commands: /start, /undo, /progress, /endings, /help, /quit.\n\
Type a choice (or its number) to continue the story.\n";

fn option_by_number<'o>(text: &str, options: &'o [String]) -> Option<&'o str> {
    let n: usize = text.trim().parse().ok()?;
    options.get(n.checked_sub(1)?).map(String::as_str)
}

fn render_scene(scene: &Scene) -> String {
    let mut out = String::new();
    if let Some(image) = &scene.image {
        out.push_str(&format!("[image: {image}]\n"));
    }
    out.push_str(&scene.text);
    out.push('\n');
    for (i, option) in scene.options.iter().enumerate() {
        out.push_str(&format!("  {}. {option}\n", i + 1));
    }
    if scene.can_undo {
        out.push_str("  (/undo to go back)\n");
    }
    if scene.story_over {
        out.push_str("The story ends here. Type /start to try again.\n");
    }
    out
}

fn render_ending(report: &EndingReport) -> String {
    let mut out = String::new();
    if let Some(image) = &report.scene.image {
        out.push_str(&format!("[image: {image}]\n"));
    }
    out.push_str(&report.scene.text);
    out.push_str("\n\n");
    out.push_str(&report.summary);
    out.push('\n');
    if let Some(insight) = &report.insight {
        out.push('\n');
        out.push_str(insight);
        out.push('\n');
    }
    if report.newly_unlocked {
        out.push_str("\nNew ending unlocked!");
    }
    if let Some(coverage) = report.coverage {
        out.push_str(&format!("\nEndings found: {coverage}"));
    }
    out.push_str(&format!("\nType \"{RESTART_LABEL}\" to play again.\n"));
    out
}

fn render_error(error: &SessionError) -> String {
    match error {
        SessionError::NoActiveSession => {
            "No quest in progress. Type /start to begin.\n".to_string()
        }
        SessionError::InvalidChoice { options } => {
            let mut out = String::from("Please pick one of the options:\n");
            for (i, option) in options.iter().enumerate() {
                out.push_str(&format!("  {}. {option}\n", i + 1));
            }
            out
        }
        SessionError::StoryUnavailable => {
            "The story could not be loaded. Try again later.\n".to_string()
        }
    }
}

//! Interactive map session reading commands from stdin.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, bail};
use hazardmap::feed::FeedLoader;
use hazardmap::layer::OverlayKind;
use hazardmap::{MapConfig, MapController};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  show                          print the map state
  weather|earthquake|radar on|off
                                toggle an overlay
  refresh [weather|earthquake]  reload the feeds
  popup <layer> <n>             print the popup of the n-th annotation
  quit";

/// Commands accepted by the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Print the page snapshot.
    Show,
    /// Change the toggle control of an overlay.
    Toggle(OverlayKind, bool),
    /// Reload one feed, or all of them.
    Refresh(Option<OverlayKind>),
    /// Print a popup.
    Popup(OverlayKind, usize),
    /// Print the command list.
    Help,
    /// End the session.
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let overlay =
            |name: &str| OverlayKind::from_name(name).ok_or_else(|| anyhow!("unknown layer '{name}'"));

        let command = match words.as_slice() {
            ["show"] => Self::Show,
            ["help"] | ["?"] => Self::Help,
            ["quit"] | ["exit"] => Self::Quit,
            ["refresh"] => Self::Refresh(None),
            ["refresh", name] => Self::Refresh(Some(overlay(name)?)),
            ["popup", name, index] => Self::Popup(overlay(name)?, index.parse()?),
            [name, "on"] => Self::Toggle(overlay(name)?, true),
            [name, "off"] => Self::Toggle(overlay(name)?, false),
            [] => bail!("empty command"),
            _ => bail!("unknown command '{line}', try 'help'"),
        };

        Ok(command)
    }
}

/// One map session driven from the terminal.
pub struct MapSession {
    controller: MapController,
}

impl MapSession {
    pub fn new(config: MapConfig, loader: impl FeedLoader + 'static) -> anyhow::Result<Self> {
        let loader: Arc<dyn FeedLoader> = Arc::new(loader);
        let controller = MapController::new(config, loader)?;
        Ok(Self { controller })
    }

    /// Starts the feeds, waits until both flows finished once and prints the map.
    pub async fn load_once(&self) -> anyhow::Result<()> {
        for handle in self.controller.start() {
            let outcome = handle.await?;
            log::debug!("Initial load finished: {outcome:?}");
        }
        self.execute(SessionCommand::Show).await
    }

    /// Starts the feeds and processes commands from stdin until `quit` or EOF.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Fetch tasks run whenever the loop waits for input.
        let _handles = self.controller.start();

        println!("{}", self.controller.config().title);
        println!("{HELP}");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let command = match line.parse::<SessionCommand>() {
                Ok(command) => command,
                Err(err) => {
                    eprintln!("{err}");
                    continue;
                }
            };

            if command == SessionCommand::Quit {
                break;
            }

            if let Err(err) = self.execute(command).await {
                eprintln!("{err}");
            }
        }

        log::info!("Session closed");
        Ok(())
    }

    async fn execute(&self, command: SessionCommand) -> anyhow::Result<()> {
        match command {
            SessionCommand::Show => {
                let snapshot = self.controller.snapshot();
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            SessionCommand::Toggle(kind, checked) => {
                if !self.controller.set_toggle(kind, checked) {
                    bail!("layer '{kind}' is not part of this map");
                }
            }
            SessionCommand::Refresh(Some(kind)) => match self.controller.refresh(kind).await {
                Some(outcome) => println!("{kind}: {outcome:?}"),
                None => bail!("layer '{kind}' has no feed"),
            },
            SessionCommand::Refresh(None) => {
                for (kind, outcome) in self.controller.refresh_all().await {
                    println!("{kind}: {outcome:?}");
                }
            }
            SessionCommand::Popup(kind, index) => match self.controller.popup(kind, index) {
                Some(popup) => println!("{popup}"),
                None => bail!("no annotation {index} in layer '{kind}'"),
            },
            SessionCommand::Help => println!("{HELP}"),
            SessionCommand::Quit => {}
        }

        Ok(())
    }
}

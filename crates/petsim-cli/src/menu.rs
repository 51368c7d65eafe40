//! Interactive menu loop.
//!
//! Input lines are read on a dedicated thread and handed over a channel,
//! so the background processes keep ticking while the player is typing and
//! a pending read never holds up runtime shutdown. Out-of-range or
//! non-numeric choices are re-prompted here and never reach the engine.

use std::io::{BufRead, Write as _};

use anyhow::Context as _;
use petsim_core::{Engine, ItemUseOutcome};
use petsim_types::PetType;
use tokio::sync::mpsc;

use crate::console::ConsoleObserver;

/// Main menu entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Adopt a new pet.
    Adopt,
    /// List live pets and their stats.
    ViewPets,
    /// Use an item on a pet.
    UseItem,
    /// List active quests.
    ViewQuests,
    /// Show the point total.
    ViewPoints,
    /// Leave the game.
    Exit,
}

impl MenuAction {
    /// Every action, in display order.
    pub const ALL: [Self; 6] = [
        Self::Adopt,
        Self::ViewPets,
        Self::UseItem,
        Self::ViewQuests,
        Self::ViewPoints,
        Self::Exit,
    ];

    /// Menu label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Adopt => "Adopt a Pet",
            Self::ViewPets => "View Pets",
            Self::UseItem => "Use Item",
            Self::ViewQuests => "View Quests",
            Self::ViewPoints => "View Points",
            Self::Exit => "Exit",
        }
    }
}

/// Parse a 1-based menu choice into a 0-based index.
pub fn parse_choice(input: &str, option_count: usize) -> Option<usize> {
    let choice: usize = input.trim().parse().ok()?;
    (1..=option_count).contains(&choice).then_some(choice.saturating_sub(1))
}

/// Line-oriented reader for player input.
#[derive(Debug)]
pub struct Prompt {
    lines: mpsc::UnboundedReceiver<std::io::Result<String>>,
}

impl Prompt {
    /// Read lines from stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader thread cannot be spawned.
    pub fn stdin() -> anyhow::Result<Self> {
        Self::spawn_reader(std::io::BufReader::new(std::io::stdin()))
    }

    /// Read lines from `reader` on a detached thread. The thread ends at
    /// end of input, on the first read error, or once the prompt is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn_reader<R: BufRead + Send + 'static>(reader: R) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name(String::from("petsim-input"))
            .spawn(move || {
                for line in reader.lines() {
                    let failed = line.is_err();
                    if tx.send(line).is_err() || failed {
                        break;
                    }
                }
            })
            .context("failed to spawn input thread")?;
        Ok(Self { lines: rx })
    }

    /// Print `label` and read one line. `None` at end of input.
    pub async fn line(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        print!("{label}");
        std::io::stdout().flush().context("failed to flush stdout")?;
        match self.lines.recv().await {
            Some(line) => line.map(Some).context("failed to read input"),
            None => Ok(None),
        }
    }

    /// Show a numbered menu and read until a valid choice is entered.
    ///
    /// Returns the 0-based index, or `None` at end of input.
    pub async fn choose(
        &mut self,
        title: &str,
        options: &[String],
    ) -> anyhow::Result<Option<usize>> {
        println!("\n{title}\n");
        for (number, option) in (1_usize..).zip(options) {
            println!("{number}. {option}");
        }

        let mut label = "\nEnter your choice: ";
        loop {
            let Some(input) = self.line(label).await? else {
                return Ok(None);
            };
            if let Some(index) = parse_choice(&input, options.len()) {
                return Ok(Some(index));
            }
            label = "Invalid choice. Please try again: ";
        }
    }
}

/// Run the menu until the player exits or input ends.
///
/// # Errors
///
/// Returns an error if stdin or stdout fails.
pub async fn run(
    engine: &Engine,
    console: &ConsoleObserver,
    prompt: &mut Prompt,
) -> anyhow::Result<()> {
    let labels: Vec<String> = MenuAction::ALL
        .iter()
        .map(|action| action.label().to_owned())
        .collect();

    loop {
        let Some(index) = prompt.choose("Pet Simulator", &labels).await? else {
            return Ok(());
        };
        let Some(action) = MenuAction::ALL.get(index).copied() else {
            continue;
        };

        let keep_going = match action {
            MenuAction::Adopt => adopt(engine, console, prompt).await?,
            MenuAction::ViewPets => {
                view_pets(engine).await;
                true
            }
            MenuAction::UseItem => use_item(engine, prompt).await?,
            MenuAction::ViewQuests => {
                view_quests(engine).await;
                true
            }
            MenuAction::ViewPoints => {
                println!("\nYour Points: {}", engine.total_points().await);
                true
            }
            MenuAction::Exit => false,
        };
        if !keep_going {
            return Ok(());
        }
    }
}

/// Returns `false` if input ended.
async fn adopt(
    engine: &Engine,
    console: &ConsoleObserver,
    prompt: &mut Prompt,
) -> anyhow::Result<bool> {
    let types: Vec<String> = PetType::ALL.iter().map(ToString::to_string).collect();
    let Some(index) = prompt.choose("Choose Pet Type", &types).await? else {
        return Ok(false);
    };
    let Some(pet_type) = PetType::ALL.get(index).copied() else {
        return Ok(true);
    };

    let name = loop {
        let Some(input) = prompt.line("Enter pet name: ").await? else {
            return Ok(false);
        };
        let trimmed = input.trim();
        if !trimmed.is_empty() {
            break trimmed.to_owned();
        }
        println!("Name cannot be empty.");
    };

    let pet_id = engine.adopt(&name, pet_type).await?;
    console.track(pet_id, &name);
    println!("\n{name} has been adopted!");
    Ok(true)
}

async fn view_pets(engine: &Engine) {
    let pets = engine.list_pets().await;
    if pets.is_empty() {
        println!("\nNo pets adopted yet!");
        return;
    }

    println!("\nYour Pets:\n");
    for pet in &pets {
        println!("{} ({})", pet.name, pet.pet_type);
        for (stat, value) in &pet.stats {
            println!("  {stat}: {value}");
        }
        println!();
    }
}

/// Returns `false` if input ended.
async fn use_item(engine: &Engine, prompt: &mut Prompt) -> anyhow::Result<bool> {
    let pets = engine.list_pets().await;
    if pets.is_empty() {
        println!("\nNo pets to use items on!");
        return Ok(true);
    }

    let names: Vec<String> = pets.iter().map(|pet| pet.name.clone()).collect();
    let Some(pet) = prompt
        .choose("Select Pet", &names)
        .await?
        .and_then(|index| pets.get(index))
    else {
        return Ok(false);
    };

    let items: Vec<_> = engine.catalog().compatible_with(pet.pet_type).collect();
    let labels: Vec<String> = items.iter().map(|item| item.name.clone()).collect();
    let Some(item) = prompt
        .choose("Select Item", &labels)
        .await?
        .and_then(|index| items.get(index))
    else {
        return Ok(false);
    };

    match engine.use_item(pet.id, item.id).await {
        ItemUseOutcome::Applied { .. } => println!("\nUsed {} on {}!", item.name, pet.name),
        ItemUseOutcome::UnknownPet => println!("\n{} is no longer with us.", pet.name),
        ItemUseOutcome::UnknownItem | ItemUseOutcome::IncompatibleItem => {
            println!("\n{} can't be used on {}.", item.name, pet.name);
        }
    }
    Ok(true)
}

async fn view_quests(engine: &Engine) {
    let quests = engine.list_active_quests().await;
    println!("\nActive Quests:\n");
    if quests.is_empty() {
        println!("No active quests!");
        return;
    }
    for quest in &quests {
        println!("{} - Progress: {}", quest.description, quest.progress);
        println!("Reward: {} points\n", quest.reward);
    }
}

//! Wiring and command handlers for the REPL.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use chrono::{Days, Local};
use colored::Colorize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use nomad_application::{
    AuthState, ChatSessionManager, ConversationService, FavoritesManager, IdentityBridge,
    PlanSource, SubmitOutcome, TripPlanner,
};
use nomad_core::chat::{ChatSession, MessageRole, group_sessions};
use nomad_core::config::{AppConfig, IdentityProviderKind};
use nomad_core::identity::{Identity, IdentityProvider};
use nomad_core::store::DocumentStore;
use nomad_core::travel::{Destination, TravelApi, TripPreferences};
use nomad_infrastructure::{
    DocumentChatRepository, DocumentFavoritesRepository, DocumentProfileRepository,
    JsonDirDocumentStore, LocalIdentityProvider, NomadPaths,
};
use nomad_interaction::{IdentityToolkitProvider, NomadApiClient};

use crate::command::{COMMANDS, Command, nth};

const SYNC_TIMEOUT: Duration = Duration::from_secs(10);

/// Where documents and logs live.
pub fn data_dir(config: &AppConfig) -> Result<PathBuf> {
    match &config.store.data_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(NomadPaths::data_dir()?),
    }
}

pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    auth: Arc<AuthState>,
    chat: Arc<ChatSessionManager>,
    favorites: Arc<FavoritesManager>,
    conversation: ConversationService,
    planner: TripPlanner,
    synced: broadcast::Receiver<Option<Identity>>,
    bridge: JoinHandle<()>,
}

impl App {
    pub async fn build(config: &AppConfig) -> Result<Self> {
        let store_dir = data_dir(config)?.join("store");
        let store: Arc<dyn DocumentStore> = Arc::new(
            JsonDirDocumentStore::new(&store_dir)
                .await
                .with_context(|| format!("opening store at {}", store_dir.display()))?,
        );
        tracing::info!("Document store at {}", store_dir.display());

        let provider: Arc<dyn IdentityProvider> = match config.identity.provider {
            IdentityProviderKind::Local => Arc::new(LocalIdentityProvider::new()),
            IdentityProviderKind::IdentityToolkit => {
                Arc::new(IdentityToolkitProvider::new(&config.identity)?)
            }
        };
        let api: Arc<dyn TravelApi> = Arc::new(NomadApiClient::new(&config.api)?);

        let chat = Arc::new(ChatSessionManager::new(Arc::new(
            DocumentChatRepository::new(store.clone()),
        )));
        let favorites = Arc::new(FavoritesManager::new(Arc::new(
            DocumentFavoritesRepository::new(store.clone()),
        )));
        let auth = Arc::new(AuthState::new(
            provider,
            Arc::new(DocumentProfileRepository::new(store)),
        ));

        let bridge = Arc::new(IdentityBridge::new(chat.clone(), favorites.clone()));
        let synced = bridge.subscribe();
        let bridge = bridge.spawn(&auth);

        Ok(Self {
            conversation: ConversationService::new(chat.clone(), api.clone()),
            planner: TripPlanner::new(api)?,
            auth,
            chat,
            favorites,
            synced,
            bridge,
        })
    }

    pub async fn prompt(&self) -> String {
        match self.auth.current().await {
            Some(identity) => format!("{}> ", identity.display_name()),
            None => "nomad> ".to_string(),
        }
    }

    pub async fn handle(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Say(text) => {
                let outcome = self.conversation.submit(&text).await?;
                print_outcome(&outcome);
            }
            Command::Regen => {
                let outcome = self.conversation.regenerate().await?;
                print_outcome(&outcome);
            }
            Command::New => {
                self.chat.create_session().await?;
                println!("{}", "Started a new chat".bright_black());
            }
            Command::Chats => self.list_chats().await,
            Command::Open(n) => {
                let session = self.session_at(n).await?;
                self.chat.select_session(Some(&session.id)).await?;
                print_transcript(&session);
            }
            Command::Rename(n, title) => {
                let session = self.session_at(n).await?;
                self.chat.rename_session(&session.id, &title).await?;
                println!("{}", format!("Renamed to '{}'", title.trim()).bright_black());
            }
            Command::Delete(n) => {
                let session = self.session_at(n).await?;
                self.chat.delete_session(&session.id).await;
                println!("{}", format!("Deleted '{}'", session.title).bright_black());
            }
            Command::Show(n) => {
                let destinations = self.current_destinations().await?;
                print_destination_details(nth(&destinations, n)?);
            }
            Command::Fav(n) => {
                let destinations = self.current_destinations().await?;
                let destination = nth(&destinations, n)?;
                let (added, _) = self.favorites.toggle(destination).await;
                let verb = if added { "Saved" } else { "Removed" };
                println!("{}", format!("{verb} {}", destination.label()).bright_black());
            }
            Command::Favs => {
                let favorites = self.favorites.favorites().await;
                if favorites.is_empty() {
                    println!("{}", "No favorites yet".bright_black());
                }
                print_destinations(&favorites);
            }
            Command::Unfav(n) => {
                let favorites = self.favorites.favorites().await;
                let destination = nth(&favorites, n)?;
                self.favorites.remove(&destination.id).await;
                println!("{}", format!("Removed {}", destination.label()).bright_black());
            }
            Command::Plan {
                picks,
                days,
                budget,
            } => self.plan(&picks, days, budget).await?,
            Command::Login { email, password } => {
                let auth = self.auth.clone();
                self.drain_synced();
                auth.login(&email, &password).await?;
                self.wait_for_sync().await?;
            }
            Command::Signup { email, password } => {
                let auth = self.auth.clone();
                self.drain_synced();
                auth.signup(&email, &password).await?;
                self.wait_for_sync().await?;
            }
            Command::Guest => {
                let auth = self.auth.clone();
                self.drain_synced();
                auth.login_as_guest().await?;
                self.wait_for_sync().await?;
            }
            Command::Logout => {
                let auth = self.auth.clone();
                self.drain_synced();
                auth.logout().await?;
                self.wait_for_sync().await?;
            }
            Command::Help => {
                for spec in COMMANDS {
                    let usage = format!("{:<48}", spec.usage());
                    println!("{} {}", usage.bright_cyan(), spec.summary.bright_black());
                }
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn plan(&self, picks: &[usize], days: Option<i64>, budget: Option<String>) -> Result<()> {
        let destinations = self.current_destinations().await?;
        let chosen = picks
            .iter()
            .map(|&n| nth(&destinations, n).cloned())
            .collect::<Result<Vec<_>>>()?;

        let mut preferences = TripPreferences::default();
        if let Some(days) = days {
            let start = Local::now().date_naive();
            preferences.start_date = Some(start);
            preferences.end_date = start.checked_add_days(Days::new(days.unsigned_abs() - 1));
        }
        if let Some(budget) = budget {
            preferences.budget = budget;
        }

        println!("{}", "Planning...".bright_black());
        let plan = self.planner.plan(&chosen, &preferences).await?;
        if plan.source == PlanSource::Fallback {
            println!("{}", "Planner unavailable, showing a local draft".yellow());
        }
        for line in plan.plan.lines() {
            println!("{}", line.bright_blue());
        }
        if let Some(cost) = plan.estimated_cost {
            println!("{}", format!("Estimated cost: {cost}").bright_green());
        }
        Ok(())
    }

    async fn list_chats(&self) {
        let sessions = self.chat.sessions().await;
        if sessions.is_empty() {
            println!("{}", "No chats yet".bright_black());
            return;
        }
        let active = self.chat.active_session_id().await;
        let groups = group_sessions(&sessions, &Local::now());

        let print_row = |session: &ChatSession| {
            let n = sessions
                .iter()
                .position(|s| s.id == session.id)
                .map_or(0, |i| i + 1);
            let marker = if active.as_deref() == Some(session.id.as_str()) {
                "*"
            } else {
                " "
            };
            let preview = session.last_message.as_deref().unwrap_or("");
            println!(
                "{marker}{n:>3}. {}  {}",
                session.title.bold(),
                preview.bright_black()
            );
        };

        for (label, bucket) in groups.labeled() {
            println!("{}", label.bright_magenta());
            for &session in bucket {
                print_row(session);
            }
        }
        if !groups.omitted.is_empty() {
            println!("{}", "Older".bright_magenta());
            for &session in &groups.omitted {
                print_row(session);
            }
        }
    }

    async fn session_at(&self, n: usize) -> Result<ChatSession> {
        let sessions = self.chat.sessions().await;
        Ok(nth(&sessions, n)?.clone())
    }

    /// Destinations recommended in the active chat.
    async fn current_destinations(&self) -> Result<Vec<Destination>> {
        match self
            .chat
            .active_session()
            .await
            .and_then(|session| session.destinations)
        {
            Some(destinations) if !destinations.is_empty() => Ok(destinations),
            _ => bail!("no destinations in this chat yet"),
        }
    }

    fn drain_synced(&mut self) {
        while !matches!(
            self.synced.try_recv(),
            Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed)
        ) {}
    }

    /// Waits until the managers have loaded for the new identity.
    async fn wait_for_sync(&mut self) -> Result<()> {
        let identity = tokio::time::timeout(SYNC_TIMEOUT, async {
            loop {
                match self.synced.recv().await {
                    Ok(identity) => return Ok(identity),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => {
                        bail!("identity sync stopped")
                    }
                }
            }
        })
        .await
        .context("timed out waiting for sign-in")??;

        match identity {
            Some(identity) => {
                let chats = self.chat.sessions().await.len();
                println!(
                    "{}",
                    format!("Signed in as {} ({chats} chats)", identity.display_name())
                        .bright_green()
                );
            }
            None => println!("{}", "Signed out".bright_green()),
        }
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.bridge.abort();
    }
}

fn print_outcome(outcome: &SubmitOutcome) {
    if outcome.is_apology() {
        println!("{}", outcome.reply.content.yellow());
        return;
    }
    for line in outcome.reply.content.lines() {
        println!("{}", line.bright_blue());
    }
    if let Some(destinations) = &outcome.reply.destinations {
        print_destinations(destinations);
        println!("{}", "Use /show <n>, /fav <n> or /plan <n>".bright_black());
    }
}

fn print_transcript(session: &ChatSession) {
    println!("{}", format!("=== {} ===", session.title).bright_magenta().bold());
    for message in &session.messages {
        match message.role {
            MessageRole::User => println!("{}", format!("> {}", message.content).green()),
            MessageRole::Assistant => println!("{}", message.content.bright_blue()),
            MessageRole::System => println!("{}", message.content.bright_black()),
        }
    }
    if let Some(destinations) = &session.destinations {
        print_destinations(destinations);
    }
}

fn print_destinations(destinations: &[Destination]) {
    for (i, destination) in destinations.iter().enumerate() {
        println!(
            "  {}. {}  {}",
            i + 1,
            destination.label().bold(),
            format!("cost: {}", destination.cost_of_living).bright_black()
        );
    }
}

fn print_destination_details(destination: &Destination) {
    println!("{}", destination.label().bright_magenta().bold());
    if !destination.description.is_empty() {
        println!("{}", destination.description);
    }

    let mut rows = vec![("Cost of living", destination.cost_of_living.to_string())];
    let optional = [
        ("Internet", Some(destination.internet_speed.clone()).filter(|s| !s.is_empty())),
        ("Visa", Some(destination.visa.clone()).filter(|s| !s.is_empty())),
        ("Climate", destination.climate.clone()),
        ("Best time", destination.best_time.clone()),
        ("Community", destination.community.clone()),
        ("Safety", destination.safety_rating.clone()),
        ("Rent", destination.rent.clone()),
        ("Coworking", destination.coworking_spaces.map(|n| n.to_string())),
    ];
    rows.extend(
        optional
            .into_iter()
            .filter_map(|(label, value)| value.map(|v| (label, v))),
    );
    for (label, value) in rows {
        println!("  {:<15}{}", format!("{label}:").bright_black(), value);
    }

    if let Some(tips) = &destination.tips {
        let tips = [
            ("Fun fact", &tips.fun_fact),
            ("SIM", &tips.sim_tip),
            ("Visa tip", &tips.visa_tip),
            ("Insider", &tips.insider_tip),
            ("Weather", &tips.weather_note),
        ];
        for (label, tip) in tips {
            if let Some(tip) = tip {
                println!("  {} {}", format!("{label}:").yellow(), tip);
            }
        }
    }
}

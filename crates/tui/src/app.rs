use std::{future::Future, io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gamestrike_core::{
    aggregate::{self, FilterMode, GameStats, ReviewStats},
    avatar,
    images::resolve_image,
    models::{Game, Review, Severity},
    validate::{self, GameForm, ReviewForm},
    ApiError, AppContext,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{debug, error, info};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_VISIBLE_TOASTS: usize = 4;
const BAR_WIDTH: usize = 24;

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    muted: Color,
    text: Color,
    star: Color,
    success: Color,
    danger: Color,
    selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Magenta,
            muted: Color::DarkGray,
            text: Color::White,
            star: Color::Yellow,
            success: Color::Green,
            danger: Color::Red,
            selection_bg: Color::DarkGray,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Library,
    Detail,
    Reviews,
    Stats,
    About,
}

impl Screen {
    const TABS: [Screen; 4] = [Screen::Library, Screen::Reviews, Screen::Stats, Screen::About];

    fn title(self) -> &'static str {
        match self {
            Screen::Library | Screen::Detail => "Library [l]",
            Screen::Reviews => "Reviews [v]",
            Screen::Stats => "Stats [s]",
            Screen::About => "About [i]",
        }
    }

    fn tab_index(self) -> usize {
        match self {
            Screen::Library | Screen::Detail => 0,
            Screen::Reviews => 1,
            Screen::Stats => 2,
            Screen::About => 3,
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
    Api(ApiReply),
}

enum ApiReply {
    Games(Result<Vec<Game>, ApiError>),
    AllReviews(Result<Vec<Review>, ApiError>),
    Stats {
        games: Result<Vec<Game>, ApiError>,
        reviews: Result<Vec<Review>, ApiError>,
    },
    Detail {
        game_id: String,
        game: Result<Game, ApiError>,
        reviews: Result<Vec<Review>, ApiError>,
    },
    GameSaved {
        change: GameChange,
        result: Result<(), ApiError>,
    },
    ReviewSaved {
        game_id: String,
        result: Result<Option<Review>, ApiError>,
    },
}

#[derive(Debug, Clone)]
enum GameChange {
    Created(String),
    Updated(String),
    Deleted(String),
}

impl GameChange {
    fn success_message(&self) -> String {
        match self {
            GameChange::Created(name) => format!("Added {name}"),
            GameChange::Updated(name) => format!("Updated {name}"),
            GameChange::Deleted(name) => format!("Deleted {name}"),
        }
    }

    fn failure_action(&self) -> &'static str {
        match self {
            GameChange::Created(_) => "Failed to add game",
            GameChange::Updated(_) => "Failed to update game",
            GameChange::Deleted(_) => "Failed to delete game",
        }
    }
}

const GAME_FIELDS: [&str; 7] = [
    "Name *",
    "Genre *",
    "Platform *",
    "Release year *",
    "Image (URL or filename)",
    "Rating (0-5)",
    "Description",
];

#[derive(Debug, Clone)]
struct GameFormModal {
    editing: Option<String>,
    form: GameForm,
    focus: usize,
}

impl GameFormModal {
    fn add() -> Self {
        Self {
            editing: None,
            form: GameForm::default(),
            focus: 0,
        }
    }

    fn edit(game: &Game) -> Self {
        Self {
            editing: Some(game.id.clone()),
            form: GameForm::from_game(game),
            focus: 0,
        }
    }

    fn field(&self, index: usize) -> &str {
        match index {
            0 => &self.form.name,
            1 => &self.form.genre,
            2 => &self.form.platform,
            3 => &self.form.release_year,
            4 => &self.form.image_url,
            5 => &self.form.rating,
            _ => &self.form.description,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.form.name,
            1 => &mut self.form.genre,
            2 => &mut self.form.platform,
            3 => &mut self.form.release_year,
            4 => &mut self.form.image_url,
            5 => &mut self.form.rating,
            _ => &mut self.form.description,
        }
    }
}

const REVIEW_FIELDS: [&str; 6] = [
    "Name *",
    "Review *",
    "Stars *",
    "Difficulty",
    "Progress",
    "Avatar",
];

#[derive(Debug, Clone)]
struct ReviewFormModal {
    game_id: String,
    game_name: String,
    form: ReviewForm,
    focus: usize,
}

impl ReviewFormModal {
    fn new(game: &Game) -> Self {
        Self {
            game_id: game.id.clone(),
            game_name: game.name.clone(),
            form: ReviewForm::new(),
            focus: 0,
        }
    }

    fn adjust(&mut self, delta: i16) {
        match self.focus {
            2 => self.form.adjust_rating(delta),
            3 => self.form.adjust_difficulty(delta),
            4 => self.form.adjust_progress(delta * 5),
            5 => self.form.avatar = avatar::cycle(&self.form.avatar, delta as isize).to_string(),
            _ => {}
        }
    }
}

#[derive(Debug, Clone)]
enum Modal {
    GameForm(GameFormModal),
    ReviewForm(ReviewFormModal),
    ConfirmDelete { id: String, name: String },
}

#[derive(Debug, Default)]
struct DetailState {
    game_id: String,
    game: Option<Game>,
    reviews: Vec<Review>,
}

struct UiState {
    games: Vec<Game>,
    library: ListState,
    detail: DetailState,
    reviews: Vec<Review>,
    review_filter: FilterMode,
    review_list: ListState,
    stats: Option<GameStats>,
    loading_games: bool,
    loading_detail: bool,
    loading_reviews: bool,
    loading_stats: bool,
    review_in_flight: bool,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            games: Vec::new(),
            library: ListState::default(),
            detail: DetailState::default(),
            reviews: Vec::new(),
            review_filter: FilterMode::All,
            review_list: ListState::default(),
            stats: None,
            loading_games: false,
            loading_detail: false,
            loading_reviews: false,
            loading_stats: false,
            review_in_flight: false,
            status: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    fn set_games(&mut self, games: Vec<Game>) {
        let selected = self.current_game().map(|game| game.id.clone());
        self.games = games;
        let index = selected
            .and_then(|id| self.games.iter().position(|game| game.id == id))
            .unwrap_or(0);
        self.library
            .select((!self.games.is_empty()).then_some(index));
    }

    fn current_game(&self) -> Option<&Game> {
        self.library.selected().and_then(|index| self.games.get(index))
    }

    fn visible_reviews(&self) -> Vec<Review> {
        aggregate::filter_sort(self.review_filter, &self.reviews)
    }
}

fn move_selection(state: &mut ListState, delta: isize, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0) as isize;
    let next = (current + delta).clamp(0, len as isize - 1);
    state.select(Some(next as usize));
}

/// Page controllers of the terminal catalog.
pub struct GameStrikeApp<'a> {
    ctx: &'a AppContext,
    screen: Screen,
    state: UiState,
    modal: Option<Modal>,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl<'a> GameStrikeApp<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            screen: Screen::Library,
            state: UiState::default(),
            modal: None,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        self.load_games();

        let result = loop {
            if let Err(err) = terminal.draw(|frame| self.draw(frame)) {
                break Err(anyhow::Error::from(err).context("failed to draw frame"));
            }
            if self.state.should_quit {
                break Ok(());
            }
            match event_rx.recv().await {
                Some(event) => self.process_app_event(event),
                None => break Ok(()),
            }
        };

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        info!("GameStrike closed");
        result
    }

    fn process_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                if self.modal.is_some() {
                    self.handle_modal_key(key);
                } else {
                    self.handle_key(key);
                }
            }
            AppEvent::Input(_) | AppEvent::Tick => {}
            AppEvent::Api(reply) => self.handle_reply(reply),
        }
    }

    fn spawn_request<F>(&self, request: F)
    where
        F: Future<Output = ApiReply> + Send + 'static,
    {
        let Some(sender) = self.event_tx.clone() else {
            error!("event channel missing, request dropped");
            return;
        };
        spawn(async move {
            let reply = request.await;
            let _ = sender.send(AppEvent::Api(reply)).await;
        });
    }

    fn load_games(&mut self) {
        self.state.loading_games = true;
        self.state.set_status("Loading games…");
        let api = self.ctx.api.clone();
        self.spawn_request(async move { ApiReply::Games(api.list_games().await) });
    }

    fn load_reviews(&mut self) {
        self.state.loading_reviews = true;
        self.state.set_status("Loading reviews…");
        let api = self.ctx.api.clone();
        self.spawn_request(async move { ApiReply::AllReviews(api.list_reviews().await) });
    }

    fn load_stats(&mut self) {
        self.state.loading_stats = true;
        self.state.set_status("Loading statistics…");
        let api = self.ctx.api.clone();
        self.spawn_request(async move {
            let (games, reviews) = tokio::join!(api.list_games(), api.list_reviews());
            ApiReply::Stats { games, reviews }
        });
    }

    fn load_detail(&mut self, game_id: String) {
        if self.state.detail.game_id != game_id {
            self.state.detail = DetailState {
                game_id: game_id.clone(),
                ..DetailState::default()
            };
        }
        self.state.loading_detail = true;
        self.state.set_status("Loading game…");
        let api = self.ctx.api.clone();
        self.spawn_request(async move {
            let (game, reviews) =
                tokio::join!(api.get_game(&game_id), api.list_game_reviews(&game_id));
            ApiReply::Detail {
                game_id,
                game,
                reviews,
            }
        });
    }

    fn show(&mut self, screen: Screen) {
        self.screen = screen;
        match screen {
            Screen::Library => {
                if self.state.games.is_empty() && !self.state.loading_games {
                    self.load_games();
                }
            }
            Screen::Reviews => self.load_reviews(),
            Screen::Stats => self.load_stats(),
            Screen::Detail | Screen::About => {}
        }
    }

    fn handle_reply(&mut self, reply: ApiReply) {
        match reply {
            ApiReply::Games(result) => {
                self.state.loading_games = false;
                match result {
                    Ok(games) => {
                        info!(total = games.len(), "games loaded");
                        self.state.set_status(format!("Loaded {} games", games.len()));
                        self.state.set_games(games);
                    }
                    Err(err) => {
                        self.ctx.report_api_error("Failed to load games", &err);
                        self.state.set_status("Could not load games");
                    }
                }
            }
            ApiReply::AllReviews(result) => {
                self.state.loading_reviews = false;
                match result {
                    Ok(reviews) => {
                        self.state.set_status(format!("Loaded {} reviews", reviews.len()));
                        self.state.reviews = reviews;
                        self.state
                            .review_list
                            .select((!self.state.reviews.is_empty()).then_some(0));
                    }
                    Err(err) => {
                        self.ctx.report_api_error("Failed to load reviews", &err);
                        self.state.set_status("Could not load reviews");
                    }
                }
            }
            ApiReply::Stats { games, reviews } => {
                self.state.loading_stats = false;
                let games = games.unwrap_or_else(|err| {
                    self.ctx.report_api_error("Failed to load games", &err);
                    Vec::new()
                });
                let reviews = reviews.unwrap_or_else(|err| {
                    self.ctx.report_api_error("Failed to load reviews", &err);
                    Vec::new()
                });
                self.state.stats = Some(GameStats::from_games_and_reviews(&games, &reviews));
                self.state.set_status("Statistics updated");
            }
            ApiReply::Detail {
                game_id,
                game,
                reviews,
            } => {
                if game_id != self.state.detail.game_id {
                    debug!(%game_id, "discarding stale detail response");
                    return;
                }
                self.state.loading_detail = false;
                match game {
                    Ok(game) => {
                        self.state.set_status(format!("Viewing {}", game.name));
                        self.state.detail.game = Some(game);
                    }
                    Err(err) => {
                        self.ctx.report_api_error("Failed to load game", &err);
                        self.state.set_status("Could not load game");
                    }
                }
                self.state.detail.reviews = reviews.unwrap_or_else(|err| {
                    self.ctx.report_api_error("Failed to load reviews", &err);
                    Vec::new()
                });
            }
            ApiReply::GameSaved { change, result } => match result {
                Ok(()) => {
                    self.ctx.notify_success(change.success_message());
                    if let GameChange::Deleted(_) = change {
                        if self.screen == Screen::Detail {
                            self.screen = Screen::Library;
                        }
                    } else if self.screen == Screen::Detail {
                        let id = self.state.detail.game_id.clone();
                        self.load_detail(id);
                    }
                    self.load_games();
                }
                Err(err) => {
                    self.ctx.report_api_error(change.failure_action(), &err);
                }
            },
            ApiReply::ReviewSaved { game_id, result } => {
                self.state.review_in_flight = false;
                match result {
                    Ok(saved) => {
                        self.ctx.notify_success("Review saved ⭐");
                        if self.screen == Screen::Detail && self.state.detail.game_id == game_id {
                            match saved {
                                Some(review) => self.state.detail.reviews.insert(0, review),
                                None => self.load_detail(game_id),
                            }
                        }
                        self.load_games();
                    }
                    Err(err) => {
                        self.ctx.report_api_error("Could not save review", &err);
                    }
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return;
        }
        match key.code {
            KeyCode::Char('q') => {
                self.state.should_quit = true;
                return;
            }
            KeyCode::Char('l') => return self.show(Screen::Library),
            KeyCode::Char('v') => return self.show(Screen::Reviews),
            KeyCode::Char('s') => return self.show(Screen::Stats),
            KeyCode::Char('i') => return self.show(Screen::About),
            KeyCode::Char('x') => {
                self.ctx.toasts.dismiss_newest();
                return;
            }
            _ => {}
        }

        match self.screen {
            Screen::Library => self.handle_library_key(key),
            Screen::Detail => self.handle_detail_key(key),
            Screen::Reviews => self.handle_reviews_key(key),
            Screen::Stats => {
                if key.code == KeyCode::Char('g') {
                    self.load_stats();
                }
            }
            Screen::About => {
                if key.code == KeyCode::Esc {
                    self.screen = Screen::Library;
                }
            }
        }
    }

    fn handle_library_key(&mut self, key: KeyEvent) {
        let len = self.state.games.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => move_selection(&mut self.state.library, 1, len),
            KeyCode::Char('k') | KeyCode::Up => move_selection(&mut self.state.library, -1, len),
            KeyCode::PageDown => move_selection(&mut self.state.library, 10, len),
            KeyCode::PageUp => move_selection(&mut self.state.library, -10, len),
            KeyCode::Char('g') => self.load_games(),
            KeyCode::Char('a') => self.modal = Some(Modal::GameForm(GameFormModal::add())),
            KeyCode::Enter => {
                if let Some(id) = self.state.current_game().map(|game| game.id.clone()) {
                    self.screen = Screen::Detail;
                    self.load_detail(id);
                }
            }
            KeyCode::Char('e') => {
                if let Some(game) = self.state.current_game().cloned() {
                    self.begin_edit(&game);
                }
            }
            KeyCode::Char('d') => {
                if let Some(game) = self.state.current_game() {
                    self.modal = Some(Modal::ConfirmDelete {
                        id: game.id.clone(),
                        name: game.name.clone(),
                    });
                }
            }
            KeyCode::Char('r') => {
                if let Some(game) = self.state.current_game() {
                    self.modal = Some(Modal::ReviewForm(ReviewFormModal::new(game)));
                }
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        let game = self.state.detail.game.clone();
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => self.screen = Screen::Library,
            KeyCode::Char('g') => {
                let id = self.state.detail.game_id.clone();
                self.load_detail(id);
            }
            KeyCode::Char('r') => {
                if let Some(game) = game {
                    self.modal = Some(Modal::ReviewForm(ReviewFormModal::new(&game)));
                }
            }
            KeyCode::Char('e') => {
                if let Some(game) = game {
                    self.begin_edit(&game);
                }
            }
            KeyCode::Char('d') => {
                if let Some(game) = game {
                    self.modal = Some(Modal::ConfirmDelete {
                        id: game.id,
                        name: game.name,
                    });
                }
            }
            _ => {}
        }
    }

    fn handle_reviews_key(&mut self, key: KeyEvent) {
        let len = self.state.reviews.len();
        let filter = match key.code {
            KeyCode::Char('1') => Some(FilterMode::All),
            KeyCode::Char('2') => Some(FilterMode::TopRated),
            KeyCode::Char('3') => Some(FilterMode::MostRecent),
            KeyCode::Char('j') | KeyCode::Down => {
                move_selection(&mut self.state.review_list, 1, len);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                move_selection(&mut self.state.review_list, -1, len);
                None
            }
            KeyCode::Char('g') => {
                self.load_reviews();
                None
            }
            _ => None,
        };
        if let Some(filter) = filter {
            self.state.review_filter = filter;
            self.state
                .review_list
                .select((len > 0).then_some(0));
            self.state
                .set_status(format!("Showing {}", filter.label().to_lowercase()));
        }
    }

    fn begin_edit(&mut self, game: &Game) {
        self.ctx.notify_success(format!("Editing {}", game.name));
        self.modal = Some(Modal::GameForm(GameFormModal::edit(game)));
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.modal.take() else {
            return;
        };
        self.modal = match modal {
            Modal::GameForm(form) => self.handle_game_form_key(form, key),
            Modal::ReviewForm(form) => self.handle_review_form_key(form, key),
            Modal::ConfirmDelete { id, name } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.submit_delete(id, name);
                    None
                }
                KeyCode::Char('n') | KeyCode::Esc => None,
                _ => Some(Modal::ConfirmDelete { id, name }),
            },
        };
    }

    fn handle_game_form_key(&mut self, mut modal: GameFormModal, key: KeyEvent) -> Option<Modal> {
        match key.code {
            KeyCode::Esc => return None,
            KeyCode::Tab | KeyCode::Down => modal.focus = (modal.focus + 1) % GAME_FIELDS.len(),
            KeyCode::BackTab | KeyCode::Up => {
                modal.focus = (modal.focus + GAME_FIELDS.len() - 1) % GAME_FIELDS.len()
            }
            KeyCode::Backspace => {
                modal.focused_mut().pop();
            }
            KeyCode::Char(ch) => modal.focused_mut().push(ch),
            KeyCode::Enter => {
                if self.submit_game(&modal) {
                    return None;
                }
            }
            _ => {}
        }
        Some(Modal::GameForm(modal))
    }

    fn handle_review_form_key(
        &mut self,
        mut modal: ReviewFormModal,
        key: KeyEvent,
    ) -> Option<Modal> {
        match key.code {
            KeyCode::Esc => return None,
            KeyCode::Tab | KeyCode::Down => {
                modal.focus = (modal.focus + 1) % REVIEW_FIELDS.len()
            }
            KeyCode::BackTab | KeyCode::Up => {
                modal.focus = (modal.focus + REVIEW_FIELDS.len() - 1) % REVIEW_FIELDS.len()
            }
            KeyCode::Left => modal.adjust(-1),
            KeyCode::Right => modal.adjust(1),
            KeyCode::Backspace => match modal.focus {
                0 => {
                    modal.form.author.pop();
                }
                1 => {
                    modal.form.text.pop();
                }
                _ => {}
            },
            KeyCode::Char(ch) => match modal.focus {
                0 => modal.form.author.push(ch),
                1 => modal.form.text.push(ch),
                2 => {
                    if let Some(stars) = ch.to_digit(10).filter(|stars| *stars <= 5) {
                        modal.form.rating = stars as u8;
                    }
                }
                _ => {}
            },
            KeyCode::Enter => {
                if self.submit_review(&modal) {
                    return None;
                }
            }
            _ => {}
        }
        Some(Modal::ReviewForm(modal))
    }

    fn submit_game(&mut self, modal: &GameFormModal) -> bool {
        let payload = match validate::validate_game_now(&modal.form) {
            Ok(payload) => payload,
            Err(err) => {
                self.ctx.report_invalid(&err);
                self.state.set_status(err.to_string());
                return false;
            }
        };
        let api = self.ctx.api.clone();
        let name = payload.name().to_string();
        match modal.editing.clone() {
            Some(id) => self.spawn_request(async move {
                let result = api.update_game(&id, &payload).await.map(|_| ());
                ApiReply::GameSaved {
                    change: GameChange::Updated(name),
                    result,
                }
            }),
            None => self.spawn_request(async move {
                let result = api.create_game(&payload).await.map(|_| ());
                ApiReply::GameSaved {
                    change: GameChange::Created(name),
                    result,
                }
            }),
        }
        self.state.set_status("Saving game…");
        true
    }

    fn submit_review(&mut self, modal: &ReviewFormModal) -> bool {
        if self.state.review_in_flight {
            self.state.set_status("A review is already being sent");
            return false;
        }
        let payload = match validate::validate_review(&modal.form, Utc::now()) {
            Ok(payload) => payload,
            Err(err) => {
                self.ctx.report_invalid(&err);
                self.state.set_status(err.to_string());
                return false;
            }
        };
        self.state.review_in_flight = true;
        self.state
            .set_status(format!("Sending review for {}…", modal.game_name));
        let api = self.ctx.api.clone();
        let game_id = modal.game_id.clone();
        self.spawn_request(async move {
            let result = api.create_review(&game_id, &payload).await;
            ApiReply::ReviewSaved { game_id, result }
        });
        true
    }

    fn submit_delete(&mut self, id: String, name: String) {
        info!(%id, %name, "deleting game");
        self.state.set_status(format!("Deleting {name}…"));
        let api = self.ctx.api.clone();
        self.spawn_request(async move {
            let result = api.delete_game(&id).await;
            ApiReply::GameSaved {
                change: GameChange::Deleted(name),
                result,
            }
        });
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(frame.size());

        self.render_tabs(frame, chunks[0]);
        match self.screen {
            Screen::Library => self.render_library(frame, chunks[1]),
            Screen::Detail => self.render_detail(frame, chunks[1]),
            Screen::Reviews => self.render_reviews(frame, chunks[1]),
            Screen::Stats => self.render_stats(frame, chunks[1]),
            Screen::About => self.render_about(frame, chunks[1]),
        }
        self.render_status(frame, chunks[2]);

        match &self.modal {
            Some(Modal::GameForm(modal)) => self.render_game_form(frame, modal),
            Some(Modal::ReviewForm(modal)) => self.render_review_form(frame, modal),
            Some(Modal::ConfirmDelete { name, .. }) => self.render_confirm(frame, name),
            None => {}
        }
        self.render_toasts(frame);
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = Screen::TABS
            .iter()
            .map(|screen| Line::from(screen.title()))
            .collect();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("🎮 GameStrike"))
            .select(self.screen.tab_index())
            .style(Style::default().fg(self.theme.muted))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn render_library(&mut self, frame: &mut Frame, area: Rect) {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(area);

        let title = if self.state.loading_games {
            "Games (loading…)".to_string()
        } else {
            format!("Games ({})", self.state.games.len())
        };
        let items: Vec<ListItem> = self
            .state
            .games
            .iter()
            .map(|game| {
                ListItem::new(Line::from(vec![
                    Span::raw(game.name.clone()),
                    Span::raw("  "),
                    Span::styled(
                        stars(game.rating.unwrap_or(0.0)),
                        Style::default().fg(self.theme.star),
                    ),
                ]))
            })
            .collect();
        let empty = items.is_empty();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, body[0], &mut self.state.library);
        if empty && !self.state.loading_games {
            let hint = Paragraph::new("No games yet. Press [a] to add one.")
                .style(Style::default().fg(self.theme.muted))
                .alignment(Alignment::Center);
            frame.render_widget(hint, inner(body[0]));
        }

        let lines = match self.state.current_game() {
            Some(game) => self.game_lines(game),
            None => vec![Line::from("Select a game")],
        };
        let help = Line::from(Span::styled(
            "[Enter] open  [a] add  [e] edit  [d] delete  [r] review  [g] refresh",
            Style::default().fg(self.theme.muted),
        ));
        let mut lines = lines;
        lines.push(Line::from(""));
        lines.push(help);
        let info = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Game"))
            .wrap(Wrap { trim: true });
        frame.render_widget(info, body[1]);
    }

    fn game_lines(&self, game: &Game) -> Vec<Line<'static>> {
        let cover = resolve_image(game.image_url.as_deref(), &self.ctx.config);
        let mut lines = vec![
            Line::from(Span::styled(
                game.display_name(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("Genre: {}", or_dash(&game.genre))),
            Line::from(format!("Platform: {}", or_dash(&game.platform))),
            Line::from(format!(
                "Released: {}",
                game.release_year
                    .map(|year| year.to_string())
                    .unwrap_or_else(|| "-".to_string())
            )),
            Line::from(vec![
                Span::raw("Rating: "),
                Span::styled(
                    stars(game.rating.unwrap_or(0.0)),
                    Style::default().fg(self.theme.star),
                ),
                Span::raw(format!(" {:.1}", game.rating.unwrap_or(0.0))),
            ]),
            Line::from(format!("Cover: {cover}")),
        ];
        if let Some(created) = game.created_at {
            lines.push(Line::from(format!("Added: {}", created.format("%Y-%m-%d"))));
        }
        if let Some(description) = game.description.as_deref().filter(|d| !d.trim().is_empty()) {
            lines.push(Line::from(""));
            lines.push(Line::from(description.to_string()));
        }
        lines
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(12), Constraint::Min(4)])
            .split(area);

        let mut lines = match &self.state.detail.game {
            Some(game) => self.game_lines(game),
            None if self.state.loading_detail => vec![Line::from("Loading game…")],
            None => vec![Line::from("Game unavailable")],
        };
        lines.push(Line::from(Span::styled(
            "[Esc] back  [r] review  [e] edit  [d] delete  [g] refresh",
            Style::default().fg(self.theme.muted),
        )));
        let info = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Game detail"))
            .wrap(Wrap { trim: true });
        frame.render_widget(info, body[0]);

        let reviews = &self.state.detail.reviews;
        let average = aggregate::average(reviews, |review| review.rating);
        let title = format!(
            "Reviews ({}) · average {:.1} {}",
            reviews.len(),
            average,
            stars(average)
        );
        let items: Vec<ListItem> = reviews.iter().map(|review| self.review_item(review, false)).collect();
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(list, body[1]);
    }

    fn review_item(&self, review: &Review, with_game: bool) -> ListItem<'static> {
        let mut header = vec![
            Span::raw(format!(
                "{} ",
                avatar::display(review.avatar.as_deref(), review.author.as_deref())
            )),
            Span::styled(
                review.author_name().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                stars(review.rating.unwrap_or(0.0)),
                Style::default().fg(self.theme.star),
            ),
        ];
        if with_game {
            if let Some(label) = review.game_label() {
                header.push(Span::styled(
                    format!("  🎮 {label}"),
                    Style::default().fg(self.theme.accent),
                ));
            }
        }

        let mut meta = Vec::new();
        if let Some(difficulty) = review.difficulty {
            meta.push(format!("Difficulty {difficulty}/10"));
        }
        if let Some(progress) = review.progress {
            meta.push(format!("Progress {progress}%"));
        }
        if let Some(date) = review.timestamp() {
            meta.push(date.format("%Y-%m-%d").to_string());
        }

        ListItem::new(vec![
            Line::from(header),
            Line::from(format!("  {}", review.display_text())),
            Line::from(Span::styled(
                format!("  {}", meta.join(" · ")),
                Style::default().fg(self.theme.muted),
            )),
        ])
    }

    fn render_reviews(&mut self, frame: &mut Frame, area: Rect) {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(4)])
            .split(area);

        let stats = ReviewStats::from_reviews(&self.state.reviews);
        let filters = [FilterMode::All, FilterMode::TopRated, FilterMode::MostRecent]
            .iter()
            .enumerate()
            .map(|(index, mode)| {
                let label = format!("[{}] {}", index + 1, mode.label());
                if *mode == self.state.review_filter {
                    Span::styled(
                        label,
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(label, Style::default().fg(self.theme.muted))
                }
            })
            .flat_map(|span| [span, Span::raw("  ")])
            .collect::<Vec<_>>();
        let mut header = filters;
        header.push(Span::raw(format!(
            "│ {} reviews · average {:.1} · {} players",
            stats.total, stats.average_rating, stats.players
        )));
        frame.render_widget(
            Paragraph::new(Line::from(header)).block(Block::default().borders(Borders::ALL)),
            body[0],
        );

        let visible = self.state.visible_reviews();
        let title = if self.state.loading_reviews {
            "Community reviews (loading…)".to_string()
        } else {
            "Community reviews".to_string()
        };
        if visible.is_empty() && !self.state.loading_reviews {
            let empty = Paragraph::new("📭 No reviews yet. Be the first to share your opinion!")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(empty, body[1]);
            return;
        }
        let items: Vec<ListItem> = visible
            .iter()
            .map(|review| self.review_item(review, true))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, body[1], &mut self.state.review_list);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect) {
        let Some(stats) = &self.state.stats else {
            let text = if self.state.loading_stats {
                "Loading statistics… 📊"
            } else {
                "Press [g] to load statistics"
            };
            frame.render_widget(
                Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title("Statistics")),
                area,
            );
            return;
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let mut left = vec![
            Line::from(format!("🎮 Games in library: {}", stats.total_games)),
            Line::from(format!("💬 Reviews written: {}", stats.total_reviews)),
            Line::from(format!("⭐ Average rating: {:.1}", stats.average_rating)),
            Line::from(format!("🎯 Favourite genre: {}", stats.favourite_genre)),
            Line::from(""),
            Line::from(Span::styled(
                "Genres",
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        left.extend(self.histogram_lines(&stats.genres, stats.total_games));
        left.push(Line::from(""));
        left.push(Line::from(Span::styled(
            "Platforms",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        left.extend(self.histogram_lines(&stats.platforms, stats.total_games));
        frame.render_widget(
            Paragraph::new(left)
                .block(Block::default().borders(Borders::ALL).title("Statistics"))
                .wrap(Wrap { trim: false }),
            columns[0],
        );

        let mut right = vec![Line::from(Span::styled(
            "Top rated",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if stats.top_rated.is_empty() {
            right.push(Line::from("No rated games yet"));
        }
        for (rank, game) in stats.top_rated.iter().enumerate() {
            let rating = game.rating.unwrap_or(0.0);
            right.push(Line::from(vec![
                Span::raw(format!("#{} {} ", rank + 1, game.name)),
                Span::styled(stars(rating), Style::default().fg(self.theme.star)),
                Span::raw(format!(" {rating:.1}")),
            ]));
        }
        right.push(Line::from(""));
        right.push(Line::from(Span::styled(
            "Recently added",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if stats.recent.is_empty() {
            right.push(Line::from("No games added yet"));
        }
        for game in &stats.recent {
            let added = game
                .created_at
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unknown date".to_string());
            right.push(Line::from(format!("🎮 {} · {added}", game.name)));
        }
        frame.render_widget(
            Paragraph::new(right)
                .block(Block::default().borders(Borders::ALL).title("Rankings [g] refresh"))
                .wrap(Wrap { trim: true }),
            columns[1],
        );
    }

    fn histogram_lines(&self, buckets: &[(String, usize)], total: usize) -> Vec<Line<'static>> {
        buckets
            .iter()
            .map(|(label, count)| {
                let filled = (aggregate::share(*count, total) / 100.0 * BAR_WIDTH as f64).round()
                    as usize;
                Line::from(vec![
                    Span::raw(format!("{:<14} ", truncate(or_dash(label), 14))),
                    Span::styled(
                        "█".repeat(filled),
                        Style::default().fg(self.theme.accent),
                    ),
                    Span::styled(
                        "░".repeat(BAR_WIDTH.saturating_sub(filled)),
                        Style::default().fg(self.theme.muted),
                    ),
                    Span::raw(format!(" {count}")),
                ])
            })
            .collect()
    }

    fn render_about(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "GameStrike",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from("Keep track of your video game collection: add games, rate them,"),
            Line::from("write reviews and browse statistics about what you play."),
            Line::from(""),
            Line::from(format!("API: {}", self.ctx.api.base())),
            Line::from(""),
            Line::from("[l] library  [v] reviews  [s] stats  [i] about  [x] dismiss toast  [q] quit"),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("About"))
                .wrap(Wrap { trim: true }),
            area,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let busy = self.state.loading_games
            || self.state.loading_detail
            || self.state.loading_reviews
            || self.state.loading_stats
            || self.state.review_in_flight;
        let mut spans = vec![Span::raw(self.state.status.clone())];
        if busy {
            spans.push(Span::styled(
                "  ⏳",
                Style::default().fg(self.theme.muted),
            ));
        }
        let paragraph = Paragraph::new(Line::from(spans)).block(block);
        frame.render_widget(paragraph, area);
    }

    fn render_game_form(&self, frame: &mut Frame, modal: &GameFormModal) {
        let title = if modal.editing.is_some() {
            "✏️ Edit game"
        } else {
            "➕ Add game"
        };
        let mut lines: Vec<Line> = GAME_FIELDS
            .iter()
            .enumerate()
            .map(|(index, label)| {
                self.form_line(label, modal.field(index).to_string(), index == modal.focus)
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "[Tab] next field  [Enter] save  [Esc] cancel",
            Style::default().fg(self.theme.muted),
        )));
        self.render_modal(frame, title, lines, 64, GAME_FIELDS.len() as u16 + 4);
    }

    fn render_review_form(&self, frame: &mut Frame, modal: &ReviewFormModal) {
        let form = &modal.form;
        let values = [
            form.author.clone(),
            form.text.clone(),
            format!("{} ({}/5)", stars(form.rating as f64), form.rating),
            format!("{}/10", form.difficulty),
            format!("{}%", form.progress),
            form.avatar.clone(),
        ];
        let mut lines: Vec<Line> = REVIEW_FIELDS
            .iter()
            .zip(values)
            .enumerate()
            .map(|(index, (label, value))| self.form_line(label, value, index == modal.focus))
            .collect();
        lines.push(Line::from(""));
        let hint = if self.state.review_in_flight {
            "Sending…"
        } else {
            "[Tab] next  [←/→] adjust  [Enter] send  [Esc] cancel"
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(self.theme.muted),
        )));
        let title = format!("⭐ Review {}", modal.game_name);
        self.render_modal(frame, &title, lines, 64, REVIEW_FIELDS.len() as u16 + 4);
    }

    fn form_line(&self, label: &str, value: String, focused: bool) -> Line<'static> {
        let marker = if focused { "▶ " } else { "  " };
        let cursor = if focused { "▏" } else { "" };
        let label_style = if focused {
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.muted)
        };
        Line::from(vec![
            Span::styled(format!("{marker}{label:<24}"), label_style),
            Span::styled(format!("{value}{cursor}"), Style::default().fg(self.theme.text)),
        ])
    }

    fn render_confirm(&self, frame: &mut Frame, name: &str) {
        let lines = vec![
            Line::from(format!("Delete {name}?")),
            Line::from(""),
            Line::from(Span::styled(
                "[y] delete  [n] keep",
                Style::default().fg(self.theme.muted),
            )),
        ];
        self.render_modal(frame, "Confirm", lines, 44, 5);
    }

    fn render_modal(&self, frame: &mut Frame, title: &str, lines: Vec<Line>, width: u16, height: u16) {
        let area = centered_rect(width, height + 2, frame.size());
        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title.to_string())
                    .border_style(Style::default().fg(self.theme.accent)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_toasts(&self, frame: &mut Frame) {
        let toasts = self.ctx.toasts.snapshot();
        let size = frame.size();
        let width = 40.min(size.width);
        let mut y = size.y + 1;
        for toast in toasts.iter().take(MAX_VISIBLE_TOASTS) {
            if y + 3 > size.bottom() {
                break;
            }
            let area = Rect::new(size.right().saturating_sub(width + 1), y, width, 3);
            let color = match toast.severity {
                Severity::Success => self.theme.success,
                Severity::Error => self.theme.danger,
            };
            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(toast.message.clone())
                    .block(
                        Block::default()
                            .borders(Borders::ALL)
                            .border_style(Style::default().fg(color))
                            .title("[x]"),
                    )
                    .wrap(Wrap { trim: true }),
                area,
            );
            y += 3;
        }
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn stars(rating: f64) -> String {
    let full = rating.clamp(0.0, 5.0).floor() as usize;
    format!("{}{}", "★".repeat(full), "☆".repeat(5 - full))
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut shortened: String = value.chars().take(max.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

fn inner(area: Rect) -> Rect {
    Rect::new(
        area.x + 1,
        area.y + area.height / 2,
        area.width.saturating_sub(2),
        1.min(area.height),
    )
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

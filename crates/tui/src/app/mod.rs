use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

use crate::{
    client::{Client, ClientError},
    config::AppConfig,
    error::Result,
    ui,
};

use api_types::{
    auth::SessionUser,
    fail::{FailNew, FailUpdate, FailView},
    user::UserView,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    List,
    Add,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Description,
    Author,
}

#[derive(Debug)]
pub struct LoginState {
    pub email: String,
    pub message: Option<String>,
}

#[derive(Debug, Default)]
pub struct FormState {
    pub name: String,
    pub description: String,
    pub author: String,
    pub focus: FormField,
    /// Id of the post being edited; `None` while adding.
    pub editing: Option<i32>,
    pub message: Option<String>,
}

#[derive(Debug, Default)]
pub struct FailsState {
    pub items: Vec<FailView>,
    pub selected: usize,
    pub error: Option<String>,
}

impl FailsState {
    fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.items.len() - 1);
    }

    fn select_prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
    }

    fn current(&self) -> Option<&FailView> {
        self.items.get(self.selected)
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub mode: Mode,
    pub login: LoginState,
    pub session: Option<SessionUser>,
    pub users: Vec<UserView>,
    /// Index into `users` of the active creator filter.
    pub filter: Option<usize>,
    pub fails: FailsState,
    pub form: FormState,
    pub base_url: String,
}

pub struct App {
    client: Client,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let state = AppState {
            screen: Screen::Login,
            mode: Mode::List,
            login: LoginState {
                email: config.email.clone(),
                message: None,
            },
            session: None,
            users: Vec::new(),
            filter: None,
            fails: FailsState::default(),
            form: FormState::default(),
            base_url: config.base_url,
        };

        Ok(Self {
            client,
            state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| crate::error::AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await?,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match ui::keymap::map_key(key) {
            ui::keymap::AppAction::Quit => {
                self.should_quit = true;
            }
            ui::keymap::AppAction::Cancel => match self.state.screen {
                Screen::Login => self.should_quit = true,
                Screen::Home => {
                    if self.state.mode != Mode::List {
                        self.state.mode = Mode::List;
                        self.state.form = FormState::default();
                    }
                }
            },
            ui::keymap::AppAction::NextField => {
                if self.state.screen == Screen::Home && self.state.mode != Mode::List {
                    self.advance_focus();
                }
            }
            ui::keymap::AppAction::Submit => match self.state.screen {
                Screen::Login => self.attempt_login().await?,
                Screen::Home => {
                    if self.state.mode != Mode::List {
                        self.submit_form().await?;
                    }
                }
            },
            ui::keymap::AppAction::Backspace => {
                if let Some(field) = self.active_field_mut() {
                    field.pop();
                }
            }
            ui::keymap::AppAction::Up => {
                if self.state.screen == Screen::Home && self.state.mode == Mode::List {
                    self.state.fails.select_prev();
                }
            }
            ui::keymap::AppAction::Down => {
                if self.state.screen == Screen::Home && self.state.mode == Mode::List {
                    self.state.fails.select_next();
                }
            }
            ui::keymap::AppAction::Input(ch) => self.handle_char(ch).await?,
            ui::keymap::AppAction::None => {}
        }

        Ok(())
    }

    async fn handle_char(&mut self, ch: char) -> Result<()> {
        match self.state.screen {
            Screen::Login => self.state.login.email.push(ch),
            Screen::Home => match self.state.mode {
                Mode::List => self.handle_list_key(ch).await?,
                Mode::Add | Mode::Edit => {
                    if let Some(field) = self.active_field_mut() {
                        field.push(ch);
                    }
                }
            },
        }
        Ok(())
    }

    async fn handle_list_key(&mut self, ch: char) -> Result<()> {
        match ch {
            'q' => self.should_quit = true,
            'r' => self.reload().await?,
            'a' => self.open_add(),
            'e' => self.open_edit(),
            'd' => self.delete_selected().await?,
            'f' => {
                self.cycle_filter();
                self.load_fails().await?;
            }
            'o' => self.logout().await?,
            'j' => self.state.fails.select_next(),
            'k' => self.state.fails.select_prev(),
            _ => {}
        }
        Ok(())
    }

    fn advance_focus(&mut self) {
        self.state.form.focus = match self.state.form.focus {
            FormField::Name => FormField::Description,
            FormField::Description => FormField::Author,
            FormField::Author => FormField::Name,
        };
    }

    fn active_field_mut(&mut self) -> Option<&mut String> {
        match self.state.screen {
            Screen::Login => Some(&mut self.state.login.email),
            Screen::Home => match self.state.mode {
                Mode::List => None,
                Mode::Add | Mode::Edit => Some(match self.state.form.focus {
                    FormField::Name => &mut self.state.form.name,
                    FormField::Description => &mut self.state.form.description,
                    FormField::Author => &mut self.state.form.author,
                }),
            },
        }
    }

    async fn attempt_login(&mut self) -> Result<()> {
        let email = self.state.login.email.trim().to_string();
        if email.is_empty() {
            self.state.login.message = Some("Enter an email.".to_string());
            return Ok(());
        }

        match self.client.login(&email).await {
            Ok(_) => match self.client.status().await {
                Ok(status) if status.logged_in => {
                    self.state.session = status.user;
                    self.state.screen = Screen::Home;
                    self.state.mode = Mode::List;
                    self.state.login.message = None;
                    self.reload().await?;
                }
                Ok(_) => {
                    self.state.login.message = Some("Session was not established.".to_string());
                }
                Err(err) => {
                    self.state.login.message = Some(message_for_error(err));
                }
            },
            Err(err) => {
                self.state.login.message = Some(message_for_error(err));
            }
        }

        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        if let Err(err) = self.client.logout().await {
            self.state.fails.error = Some(message_for_error(err));
            return Ok(());
        }

        self.state.session = None;
        self.state.users.clear();
        self.state.filter = None;
        self.state.fails = FailsState::default();
        self.state.form = FormState::default();
        self.state.screen = Screen::Login;
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        match self.client.users().await {
            Ok(users) => {
                self.state.users = users;
                // Keep the filter index meaningful after the list changed.
                if self
                    .state
                    .filter
                    .is_some_and(|index| index >= self.state.users.len())
                {
                    self.state.filter = None;
                }
            }
            Err(err) => {
                self.state.fails.error = Some(message_for_error(err));
            }
        }
        self.load_fails().await
    }

    async fn load_fails(&mut self) -> Result<()> {
        let created_by = self
            .state
            .filter
            .and_then(|index| self.state.users.get(index))
            .map(|user| user.id);

        match self.client.fails(created_by).await {
            Ok(items) => {
                self.state.fails.items = items;
                self.state.fails.error = None;
                self.state.fails.selected = 0;
            }
            Err(err) => {
                self.state.fails.error = Some(message_for_error(err));
            }
        }
        Ok(())
    }

    fn cycle_filter(&mut self) {
        self.state.filter = match self.state.filter {
            None if self.state.users.is_empty() => None,
            None => Some(0),
            Some(index) if index + 1 < self.state.users.len() => Some(index + 1),
            Some(_) => None,
        };
    }

    fn open_add(&mut self) {
        self.state.form = FormState::default();
        self.state.mode = Mode::Add;
    }

    fn open_edit(&mut self) {
        let Some(fail) = self.state.fails.current() else {
            return;
        };
        self.state.form = FormState {
            name: fail.name.clone(),
            description: fail.description.clone(),
            author: fail.author.clone(),
            focus: FormField::Name,
            editing: Some(fail.id),
            message: None,
        };
        self.state.mode = Mode::Edit;
    }

    async fn submit_form(&mut self) -> Result<()> {
        let outcome = match self.state.form.editing {
            Some(id) => {
                let payload = FailUpdate {
                    name: non_empty(&self.state.form.name),
                    description: non_empty(&self.state.form.description),
                    author: non_empty(&self.state.form.author),
                };
                self.client.fail_update(id, payload).await.map(|_| ())
            }
            None => {
                let Some(session) = &self.state.session else {
                    self.state.form.message = Some("Not logged in.".to_string());
                    return Ok(());
                };
                let payload = FailNew {
                    name: non_empty(&self.state.form.name),
                    description: non_empty(&self.state.form.description),
                    author: non_empty(&self.state.form.author),
                    created_by: Some(session.id),
                };
                self.client.fail_new(payload).await.map(|_| ())
            }
        };

        match outcome {
            Ok(()) => {
                self.state.mode = Mode::List;
                self.state.form = FormState::default();
                self.load_fails().await?;
            }
            Err(err) => {
                self.state.form.message = Some(message_for_error(err));
            }
        }

        Ok(())
    }

    async fn delete_selected(&mut self) -> Result<()> {
        let Some(id) = self.state.fails.current().map(|fail| fail.id) else {
            return Ok(());
        };

        match self.client.fail_delete(id).await {
            // A 404 means someone else already deleted it; the reload
            // below resolves either way.
            Ok(()) | Err(ClientError::NotFound) => {}
            Err(err) => {
                self.state.fails.error = Some(message_for_error(err));
                return Ok(());
            }
        }
        self.load_fails().await
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn message_for_error(err: ClientError) -> String {
    match err {
        ClientError::Unauthorized => "Invalid credentials.".to_string(),
        ClientError::NotFound => "Not found.".to_string(),
        ClientError::Validation(message) => format!("Validation error: {message}"),
        ClientError::Server(message) => format!("Server error: {message}"),
        ClientError::Transport(err) => format!("Server unreachable: {err}"),
    }
}

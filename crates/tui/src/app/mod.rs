use std::time::Duration;

use api_types::{expense::Expense, reservation::Reservation};
use chrono::NaiveDate;
use chrono_tz::Tz;
use crossterm::event::{self, Event, KeyEvent};
use engine::{
    Backend, Calendar, Dashboard, DeleteRequest, Engine, EngineError, ExpenseInput,
    ExpensesTable, Guard, ReservationInput, ReservationsTable, Route, SessionState,
    SignUpOutcome, YearMonth, guard,
};
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    config,
    error::{AppError, Result},
    forms::{ExpenseForm, LoginForm, LoginMode, ReservationForm},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

pub const CONFIRMATION_SENT: &str = "Check your email for confirmation link!";

/// A delete waiting for the user's y/n.
#[derive(Debug)]
pub enum PendingDelete {
    Reservation(DeleteRequest<ReservationsTable>),
    Expense(DeleteRequest<ExpensesTable>),
}

impl PendingDelete {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Reservation(request) => request.prompt(),
            Self::Expense(request) => request.prompt(),
        }
    }
}

/// Awaited work, run after the frame that shows its progress indicator.
#[derive(Debug)]
enum Task {
    Load(Route),
    SignIn,
    SignOut,
    SaveReservation {
        id: Option<Uuid>,
        input: ReservationInput,
    },
    CreateExpense(ExpenseInput),
    Delete(PendingDelete),
}

#[derive(Debug)]
pub struct DashboardState {
    pub model: Dashboard,
    pub calendar: Calendar,
    pub loading: bool,
}

impl DashboardState {
    fn new(today: NaiveDate) -> Self {
        let month = YearMonth::of(today);
        Self {
            model: Dashboard::new(month),
            calendar: Calendar::new(month),
            loading: false,
        }
    }

    /// Dashboard totals and calendar move together.
    fn next_month(&mut self) {
        self.model.next_month();
        self.calendar.next();
    }

    fn previous_month(&mut self) {
        self.model.previous_month();
        self.calendar.previous();
    }
}

/// A fetched list with a cursor.
#[derive(Debug)]
pub struct ListState<T, F> {
    pub items: Vec<T>,
    pub selected: usize,
    pub loading: bool,
    pub form: Option<F>,
}

impl<T, F> Default for ListState<T, F> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            loading: false,
            form: None,
        }
    }
}

impl<T, F> ListState<T, F> {
    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
        self.loading = false;
    }

    fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.items.len() - 1);
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

pub type ReservationsState = ListState<Reservation, ReservationForm>;
pub type ExpensesState = ListState<Expense, ExpenseForm>;

#[derive(Debug)]
pub struct AppState {
    /// The route the user asked for; the guard decides what is shown.
    pub route: Route,
    pub session: SessionState,
    pub today: NaiveDate,
    pub login: LoginForm,
    pub dashboard: DashboardState,
    pub reservations: ReservationsState,
    pub expenses: ExpensesState,
    /// Blocking error message, dismissed by any key.
    pub notice: Option<String>,
    pub confirm: Option<PendingDelete>,
    /// Progress of a running mutation.
    pub busy: Option<&'static str>,
    pub demo: bool,
}

impl AppState {
    pub fn guard(&self) -> Guard {
        guard(self.route, &self.session)
    }
}

#[cfg(test)]
impl AppState {
    /// State before the first session lookup completes.
    pub fn for_tests(today: NaiveDate) -> Self {
        Self {
            route: Route::Dashboard,
            session: SessionState::resolving(),
            today,
            login: LoginForm::new(""),
            dashboard: DashboardState::new(today),
            reservations: ReservationsState::default(),
            expenses: ExpensesState::default(),
            notice: None,
            confirm: None,
            busy: None,
            demo: false,
        }
    }
}

pub struct App<B> {
    engine: Engine<B>,
    session: watch::Receiver<SessionState>,
    tz: Tz,
    pub state: AppState,
    pending: Option<Task>,
    should_quit: bool,
}

impl<B: Backend> App<B> {
    pub fn new(engine: Engine<B>, config: &config::AppConfig, tz: Tz) -> Self {
        let mut session = engine.session().subscribe();
        let today = config::today(tz);
        let state = AppState {
            route: Route::Dashboard,
            session: session.borrow_and_update().clone(),
            today,
            login: LoginForm::new(&config.email),
            dashboard: DashboardState::new(today),
            reservations: ReservationsState::default(),
            expenses: ExpensesState::default(),
            notice: None,
            confirm: None,
            busy: None,
            demo: config.backend == config::BackendKind::Memory,
        };

        Self {
            engine,
            session,
            tz,
            state,
            pending: None,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);
        self.navigate(self.state.route);

        while !self.should_quit {
            self.state.today = config::today(self.tz);
            self.sync_session();
            self.enforce_guard();

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if let Some(task) = self.pending.take() {
                self.run_task(task).await;
                continue;
            }

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Apply provider events and pick up the latest session snapshot.
    fn sync_session(&mut self) {
        self.engine.session_mut().pump();
        if self.session.has_changed().unwrap_or(false) {
            self.state.session = self.session.borrow_and_update().clone();
        }
    }

    fn enforce_guard(&mut self) {
        if let Guard::Redirect(target) = self.state.guard() {
            tracing::debug!(from = self.state.route.path(), to = target.path(), "redirect");
            self.navigate(target);
        }
    }

    /// Switch route and schedule the fetch its view needs.
    fn navigate(&mut self, route: Route) {
        self.state.route = route;
        match route {
            Route::Login => {
                // Nothing fetched for the previous account survives sign-out.
                self.state.login.reset();
                self.state.dashboard = DashboardState::new(self.state.today);
                self.state.reservations = ReservationsState::default();
                self.state.expenses = ExpensesState::default();
                self.state.confirm = None;
                return;
            }
            Route::Dashboard => self.state.dashboard.loading = true,
            Route::Reservations => self.state.reservations.loading = true,
            Route::Expenses => self.state.expenses.loading = true,
        }
        if self.state.session.is_signed_in() {
            self.pending = Some(Task::Load(route));
        }
    }

    fn schedule(&mut self, task: Task, busy: &'static str) {
        self.state.busy = Some(busy);
        self.pending = Some(task);
    }

    async fn run_task(&mut self, task: Task) {
        match task {
            Task::Load(route) => self.load(route).await,
            Task::SignIn => self.submit_login().await,
            Task::SignOut => {
                if let Err(err) = self.engine.session_mut().sign_out().await {
                    self.state.notice = Some(format!("Error: {err}"));
                }
            }
            Task::SaveReservation { id, input } => self.save_reservation(id, input).await,
            Task::CreateExpense(input) => self.create_expense(input).await,
            Task::Delete(request) => self.delete(request).await,
        }
        self.state.busy = None;
    }

    async fn load(&mut self, route: Route) {
        match route {
            Route::Login => {}
            Route::Dashboard => {
                self.engine
                    .refresh_dashboard(&mut self.state.dashboard.model)
                    .await;
                self.state.dashboard.loading = false;
            }
            Route::Reservations => {
                let items = self.engine.reservations().refresh().await;
                self.state.reservations.replace(items);
            }
            Route::Expenses => {
                let items = self.engine.expenses().refresh().await;
                self.state.expenses.replace(items);
            }
        }
    }

    async fn submit_login(&mut self) {
        let login = &mut self.state.login;
        let session = self.engine.session_mut();
        let result = match login.mode {
            LoginMode::SignIn => session
                .sign_in(&login.email, &login.password)
                .await
                .map(SignUpOutcome::SignedIn),
            LoginMode::SignUp => {
                session
                    .sign_up(&login.email, &login.password, &login.full_name)
                    .await
            }
        };
        login.busy = false;

        match result {
            Ok(SignUpOutcome::SignedIn(principal)) => {
                tracing::info!(user = %principal.id, "signed in");
                login.reset();
            }
            Ok(SignUpOutcome::ConfirmationRequired) => {
                login.toggle_mode();
                login.reset();
                login.info = Some(CONFIRMATION_SENT.to_string());
            }
            Err(err) => login.error = Some(err.to_string()),
        }
    }

    async fn save_reservation(&mut self, id: Option<Uuid>, input: ReservationInput) {
        let today = self.state.today;
        let result = match id {
            Some(id) => self.engine.reservations().update(id, &input, today).await,
            None => self.engine.create_reservation(&input, today).await,
        };

        let view = &mut self.state.reservations;
        match result {
            Ok(items) => {
                view.form = None;
                view.replace(items);
            }
            Err(EngineError::Validation(message)) => {
                if let Some(form) = view.form.as_mut() {
                    form.error = Some(message);
                }
            }
            Err(EngineError::Unauthenticated) => view.form = None,
            Err(err) => self.state.notice = Some(format!("Error saving reservation: {err}")),
        }
    }

    async fn create_expense(&mut self, input: ExpenseInput) {
        let result = self.engine.create_expense(&input).await;

        let view = &mut self.state.expenses;
        match result {
            Ok(items) => {
                view.form = None;
                view.replace(items);
            }
            Err(EngineError::Validation(message)) => {
                if let Some(form) = view.form.as_mut() {
                    form.error = Some(message);
                }
            }
            Err(EngineError::Unauthenticated) => view.form = None,
            Err(err) => self.state.notice = Some(format!("Error creating expense: {err}")),
        }
    }

    async fn delete(&mut self, request: PendingDelete) {
        let result = match request {
            PendingDelete::Reservation(request) => self
                .engine
                .reservations()
                .delete(request)
                .await
                .map(|items| self.state.reservations.replace(items)),
            PendingDelete::Expense(request) => self
                .engine
                .expenses()
                .delete(request)
                .await
                .map(|items| self.state.expenses.replace(items)),
        };
        if let Err(err) = result {
            self.state.notice = Some(format!("Error deleting: {err}"));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }
        if action == AppAction::None {
            return;
        }
        if self.state.notice.take().is_some() {
            return;
        }
        if let Some(request) = self.state.confirm.take() {
            match action {
                AppAction::Input('y' | 'Y') | AppAction::Submit => {
                    self.schedule(Task::Delete(request), "Deleting...");
                }
                // Dropping the request declines the delete.
                _ => {}
            }
            return;
        }

        match self.state.guard() {
            Guard::Loading | Guard::Redirect(_) => {}
            Guard::Render(Route::Login) => self.handle_login(action),
            Guard::Render(Route::Dashboard) => self.handle_dashboard(action),
            Guard::Render(Route::Reservations) => self.handle_reservations(action),
            Guard::Render(Route::Expenses) => self.handle_expenses(action),
        }
    }

    /// Shortcuts shared by every signed-in view. Returns whether `ch` was one.
    fn handle_nav(&mut self, ch: char) -> bool {
        match ch {
            'q' | 'Q' => self.should_quit = true,
            'd' | 'D' => self.navigate(Route::Dashboard),
            'r' | 'R' => self.navigate(Route::Reservations),
            'e' | 'E' => self.navigate(Route::Expenses),
            'o' | 'O' => self.schedule(Task::SignOut, "Signing out..."),
            _ => return false,
        }
        true
    }

    fn handle_login(&mut self, action: AppAction) {
        let login = &mut self.state.login;
        if login.busy {
            return;
        }
        match action {
            AppAction::NextField | AppAction::Down => login.next_field(),
            AppAction::ToggleSignUp => login.toggle_mode(),
            AppAction::Backspace => login.pop(),
            AppAction::Input(ch) => login.push(ch),
            AppAction::Cancel => self.should_quit = true,
            AppAction::Submit => {
                login.busy = true;
                login.error = None;
                login.info = None;
                self.pending = Some(Task::SignIn);
            }
            _ => {}
        }
    }

    fn handle_dashboard(&mut self, action: AppAction) {
        let AppAction::Input(ch) = action else {
            match action {
                AppAction::Right => self.state.dashboard.next_month(),
                AppAction::Left => self.state.dashboard.previous_month(),
                _ => {}
            }
            return;
        };
        match ch {
            'n' | 'N' => self.state.dashboard.next_month(),
            'p' | 'P' => self.state.dashboard.previous_month(),
            _ => {
                self.handle_nav(ch);
            }
        }
    }

    fn handle_reservations(&mut self, action: AppAction) {
        let today = self.state.today;
        if let Some(form) = self.state.reservations.form.as_mut() {
            match action {
                AppAction::Cancel => self.state.reservations.form = None,
                AppAction::NextField | AppAction::Down => form.next_field(),
                AppAction::PrevField | AppAction::Up => form.previous_field(),
                AppAction::Left => form.cycle_choice(false),
                AppAction::Right => form.cycle_choice(true),
                AppAction::Backspace => form.pop(),
                AppAction::Input(ch) => form.push(ch),
                AppAction::Submit => match form.to_input() {
                    Ok(input) => {
                        form.error = None;
                        let id = form.editing;
                        self.schedule(Task::SaveReservation { id, input }, "Saving...");
                    }
                    Err(message) => form.error = Some(message),
                },
                _ => {}
            }
            return;
        }

        let view = &mut self.state.reservations;
        match action {
            AppAction::Down | AppAction::Input('j') => view.select_next(),
            AppAction::Up | AppAction::Input('k') => view.select_prev(),
            AppAction::Submit => {
                if let Some(reservation) = view.selected_item() {
                    view.form = Some(ReservationForm::edit(reservation));
                }
            }
            AppAction::Input('a' | 'A') => view.form = Some(ReservationForm::new(today)),
            AppAction::Input('x' | 'X') => {
                if let Some(reservation) = view.selected_item() {
                    let request = self.engine.reservations().request_delete(reservation.id);
                    self.state.confirm = Some(PendingDelete::Reservation(request));
                }
            }
            AppAction::Input(ch) => {
                self.handle_nav(ch);
            }
            _ => {}
        }
    }

    fn handle_expenses(&mut self, action: AppAction) {
        let today = self.state.today;
        if let Some(form) = self.state.expenses.form.as_mut() {
            match action {
                AppAction::Cancel => self.state.expenses.form = None,
                AppAction::NextField | AppAction::Down => form.next_field(),
                AppAction::PrevField | AppAction::Up => form.previous_field(),
                AppAction::Left => form.cycle_choice(false),
                AppAction::Right => form.cycle_choice(true),
                AppAction::Backspace => form.pop(),
                AppAction::Input(ch) => form.push(ch),
                AppAction::Submit => match form.to_input() {
                    Ok(input) => {
                        form.error = None;
                        self.schedule(Task::CreateExpense(input), "Saving...");
                    }
                    Err(message) => form.error = Some(message),
                },
                _ => {}
            }
            return;
        }

        let view = &mut self.state.expenses;
        match action {
            AppAction::Down | AppAction::Input('j') => view.select_next(),
            AppAction::Up | AppAction::Input('k') => view.select_prev(),
            AppAction::Input('a' | 'A') => view.form = Some(ExpenseForm::new(today)),
            AppAction::Input('x' | 'X') => {
                if let Some(expense) = view.selected_item() {
                    let request = self.engine.expenses().request_delete(expense.id);
                    self.state.confirm = Some(PendingDelete::Expense(request));
                }
            }
            AppAction::Input(ch) => {
                self.handle_nav(ch);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyModifiers};
    use engine::MemoryBackend;

    use super::*;
    use crate::demo;

    async fn demo_app() -> App<MemoryBackend> {
        let config = config::AppConfig {
            backend: config::BackendKind::Memory,
            ..Default::default()
        };
        let tz = Tz::UTC;
        let backend = demo::seeded_backend(config::today(tz)).await.unwrap();
        let engine = Engine::builder()
            .backend(Arc::new(backend))
            .build()
            .await
            .unwrap();
        App::new(engine, &config, tz)
    }

    fn press(app: &mut App<MemoryBackend>, ch: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
    }

    async fn run_pending(app: &mut App<MemoryBackend>) {
        while let Some(task) = app.pending.take() {
            app.run_task(task).await;
        }
    }

    async fn open_reservations() -> App<MemoryBackend> {
        let mut app = demo_app().await;
        app.navigate(Route::Reservations);
        run_pending(&mut app).await;
        assert_eq!(app.state.reservations.items.len(), 5);
        app
    }

    #[tokio::test]
    async fn declined_delete_never_reaches_the_store() {
        let mut app = open_reservations().await;
        let calls = app.engine.backend().store_calls();

        press(&mut app, 'x');
        assert_eq!(
            app.state.confirm.as_ref().map(PendingDelete::prompt),
            Some("Are you sure you want to delete this reservation?")
        );
        press(&mut app, 'n');

        assert!(app.state.confirm.is_none());
        assert!(app.pending.is_none());
        assert_eq!(app.engine.backend().store_calls(), calls);
        assert_eq!(app.state.reservations.items.len(), 5);
    }

    #[tokio::test]
    async fn confirmed_delete_replaces_the_list() {
        let mut app = open_reservations().await;
        let doomed = app.state.reservations.items[0].id;

        press(&mut app, 'x');
        press(&mut app, 'y');
        assert_eq!(app.state.busy, Some("Deleting..."));
        run_pending(&mut app).await;

        assert!(app.state.busy.is_none());
        assert_eq!(app.state.reservations.items.len(), 4);
        assert!(app.state.reservations.items.iter().all(|r| r.id != doomed));
    }

    #[tokio::test]
    async fn sign_out_returns_to_login_and_forgets_the_lists() {
        let mut app = open_reservations().await;

        press(&mut app, 'o');
        run_pending(&mut app).await;
        app.sync_session();
        app.enforce_guard();

        assert_eq!(app.state.route, Route::Login);
        assert!(!app.state.session.is_signed_in());
        assert!(app.state.reservations.items.is_empty());
        assert!(app.state.dashboard.model.reservations().is_empty());
        assert!(app.pending.is_none());
    }

    #[tokio::test]
    async fn any_key_dismisses_the_notice() {
        let mut app = open_reservations().await;
        app.state.notice = Some("Error deleting: connection reset".to_string());

        press(&mut app, 'x');

        assert!(app.state.notice.is_none());
        // The key only dismissed the notice.
        assert!(app.state.confirm.is_none());
    }

    #[test]
    fn list_cursor_stays_in_bounds() {
        let mut list: ListState<u8, ()> = ListState::default();
        list.select_next();
        assert_eq!(list.selected, 0);

        list.replace(vec![1, 2, 3]);
        list.select_next();
        list.select_next();
        list.select_next();
        assert_eq!(list.selected, 2);

        list.replace(vec![1]);
        assert_eq!(list.selected, 0);
        assert_eq!(list.selected_item(), Some(&1));
        list.select_prev();
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn dashboard_and_calendar_share_the_month() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let mut dashboard = DashboardState::new(today);
        dashboard.previous_month();
        assert_eq!(dashboard.model.month(), YearMonth::new(2024, 12).unwrap());
        assert_eq!(dashboard.calendar.displayed(), dashboard.model.month());
        dashboard.next_month();
        dashboard.next_month();
        assert_eq!(dashboard.calendar.displayed(), YearMonth::new(2025, 2).unwrap());
    }
}

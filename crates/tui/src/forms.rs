//! Editable form state and parsing of the typed text into engine inputs.
//!
//! Parsing only turns text into typed values; the domain checks (dates in
//! the past, blank names, negative amounts) belong to the engine.

use api_types::{
    expense::ExpenseCategory,
    reservation::{Reservation, ReservationStatus},
};
use chrono::{Days, NaiveDate};
use engine::{ExpenseInput, ReservationInput};
use uuid::Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(raw: &str, label: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| format!("{label} must be a date (YYYY-MM-DD)"))
}

fn parse_amount(raw: &str, label: &str) -> Result<f64, String> {
    let trimmed = raw.trim().trim_start_matches('$').replace(',', "");
    if trimmed.is_empty() {
        return Err(format!("{label} is required"));
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| format!("{label} must be a number"))
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let Some(index) = all.iter().position(|item| *item == current) else {
        return current;
    };
    let len = all.len();
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    all[next]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    FullName,
    Email,
    Password,
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub mode: LoginMode,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub info: Option<String>,
    pub busy: bool,
}

impl LoginForm {
    pub fn new(email: &str) -> Self {
        Self {
            mode: LoginMode::SignIn,
            full_name: String::new(),
            email: email.to_string(),
            password: String::new(),
            focus: LoginField::Email,
            error: None,
            info: None,
            busy: false,
        }
    }

    pub fn fields(&self) -> &'static [LoginField] {
        match self.mode {
            LoginMode::SignIn => &[LoginField::Email, LoginField::Password],
            LoginMode::SignUp => &[LoginField::FullName, LoginField::Email, LoginField::Password],
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::SignIn => LoginMode::SignUp,
            LoginMode::SignUp => LoginMode::SignIn,
        };
        self.focus = self.fields()[0];
        self.error = None;
        self.info = None;
    }

    pub fn next_field(&mut self) {
        self.focus = cycle(self.fields(), self.focus, true);
    }

    pub fn push(&mut self, ch: char) {
        self.active_mut().push(ch);
    }

    pub fn pop(&mut self) {
        self.active_mut().pop();
    }

    /// Forget the password and any messages, keep the e-mail.
    pub fn reset(&mut self) {
        self.password.clear();
        self.full_name.clear();
        self.error = None;
        self.busy = false;
        if !self.fields().contains(&self.focus) {
            self.focus = self.fields()[0];
        }
    }

    fn active_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::FullName => &mut self.full_name,
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationField {
    GuestName,
    CheckIn,
    CheckOut,
    TotalPrice,
    Status,
    Notes,
}

impl ReservationField {
    pub const ALL: [ReservationField; 6] = [
        Self::GuestName,
        Self::CheckIn,
        Self::CheckOut,
        Self::TotalPrice,
        Self::Status,
        Self::Notes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::GuestName => "Guest name",
            Self::CheckIn => "Check-in",
            Self::CheckOut => "Check-out",
            Self::TotalPrice => "Total price",
            Self::Status => "Status",
            Self::Notes => "Notes",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReservationForm {
    /// `Some` when editing an existing reservation.
    pub editing: Option<Uuid>,
    pub guest_name: String,
    pub check_in: String,
    pub check_out: String,
    pub total_price: String,
    pub status: ReservationStatus,
    pub notes: String,
    pub focus: ReservationField,
    pub error: Option<String>,
}

impl ReservationForm {
    /// Blank form arriving today for one night.
    pub fn new(today: NaiveDate) -> Self {
        let departure = today.checked_add_days(Days::new(1)).unwrap_or(today);
        Self {
            editing: None,
            guest_name: String::new(),
            check_in: today.format(DATE_FORMAT).to_string(),
            check_out: departure.format(DATE_FORMAT).to_string(),
            total_price: String::new(),
            status: ReservationStatus::default(),
            notes: String::new(),
            focus: ReservationField::GuestName,
            error: None,
        }
    }

    pub fn edit(reservation: &Reservation) -> Self {
        Self {
            editing: Some(reservation.id),
            guest_name: reservation.guest_name.clone(),
            check_in: reservation.check_in.format(DATE_FORMAT).to_string(),
            check_out: reservation.check_out.format(DATE_FORMAT).to_string(),
            total_price: format!("{:.2}", reservation.total_price),
            status: reservation.status,
            notes: reservation.notes.clone().unwrap_or_default(),
            focus: ReservationField::GuestName,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Reservation"
        } else {
            "New Reservation"
        }
    }

    pub fn next_field(&mut self) {
        self.focus = cycle(&ReservationField::ALL, self.focus, true);
    }

    pub fn previous_field(&mut self) {
        self.focus = cycle(&ReservationField::ALL, self.focus, false);
    }

    /// Cycle the status when it has focus.
    pub fn cycle_choice(&mut self, forward: bool) {
        if self.focus == ReservationField::Status {
            self.status = cycle(&ReservationStatus::ALL, self.status, forward);
        }
    }

    pub fn push(&mut self, ch: char) {
        if let Some(field) = self.text_mut() {
            field.push(ch);
        }
    }

    pub fn pop(&mut self) {
        if let Some(field) = self.text_mut() {
            field.pop();
        }
    }

    /// Display text of a field.
    pub fn value(&self, field: ReservationField) -> &str {
        match field {
            ReservationField::GuestName => &self.guest_name,
            ReservationField::CheckIn => &self.check_in,
            ReservationField::CheckOut => &self.check_out,
            ReservationField::TotalPrice => &self.total_price,
            ReservationField::Status => self.status.label(),
            ReservationField::Notes => &self.notes,
        }
    }

    pub fn to_input(&self) -> Result<ReservationInput, String> {
        Ok(ReservationInput {
            guest_name: self.guest_name.clone(),
            check_in: parse_date(&self.check_in, "Check-in date")?,
            check_out: parse_date(&self.check_out, "Check-out date")?,
            total_price: parse_amount(&self.total_price, "Total price")?,
            status: Some(self.status),
            notes: Some(self.notes.clone()),
        })
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            ReservationField::GuestName => Some(&mut self.guest_name),
            ReservationField::CheckIn => Some(&mut self.check_in),
            ReservationField::CheckOut => Some(&mut self.check_out),
            ReservationField::TotalPrice => Some(&mut self.total_price),
            ReservationField::Status => None,
            ReservationField::Notes => Some(&mut self.notes),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseField {
    Description,
    Amount,
    Category,
    Date,
}

impl ExpenseField {
    pub const ALL: [ExpenseField; 4] = [Self::Description, Self::Amount, Self::Category, Self::Date];

    pub fn label(self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::Amount => "Amount",
            Self::Category => "Category",
            Self::Date => "Date",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpenseForm {
    pub description: String,
    pub amount: String,
    pub category: ExpenseCategory,
    pub date: String,
    pub focus: ExpenseField,
    pub error: Option<String>,
}

impl ExpenseForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            description: String::new(),
            amount: String::new(),
            category: ExpenseCategory::default(),
            date: today.format(DATE_FORMAT).to_string(),
            focus: ExpenseField::Description,
            error: None,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = cycle(&ExpenseField::ALL, self.focus, true);
    }

    pub fn previous_field(&mut self) {
        self.focus = cycle(&ExpenseField::ALL, self.focus, false);
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        if self.focus == ExpenseField::Category {
            self.category = cycle(&ExpenseCategory::ALL, self.category, forward);
        }
    }

    pub fn push(&mut self, ch: char) {
        if let Some(field) = self.text_mut() {
            field.push(ch);
        }
    }

    pub fn pop(&mut self) {
        if let Some(field) = self.text_mut() {
            field.pop();
        }
    }

    pub fn value(&self, field: ExpenseField) -> &str {
        match field {
            ExpenseField::Description => &self.description,
            ExpenseField::Amount => &self.amount,
            ExpenseField::Category => self.category.label(),
            ExpenseField::Date => &self.date,
        }
    }

    pub fn to_input(&self) -> Result<ExpenseInput, String> {
        Ok(ExpenseInput {
            description: self.description.clone(),
            amount: parse_amount(&self.amount, "Amount")?,
            category: Some(self.category.as_str().to_string()),
            date: parse_date(&self.date, "Date")?,
        })
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            ExpenseField::Description => Some(&mut self.description),
            ExpenseField::Amount => Some(&mut self.amount),
            ExpenseField::Category => None,
            ExpenseField::Date => Some(&mut self.date),
        }
    }
}

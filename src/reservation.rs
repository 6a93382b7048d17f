//! A reservation for a party.
use chrono::{DateTime, Datelike, NaiveDateTime};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::customer::normalize;
use crate::error::{ModelError, Result};
use crate::orm::{Db, FromRow, Model, Param};

/// Text layouts accepted by [`parse_start_at`], tried in order after RFC 3339.
const START_AT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A row of `reservations`, keyed by the aliases the queries select.
#[derive(Debug, Clone, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct ReservationRow {
    pub id: i64,
    pub customer_id: i64,
    pub num_guests: i64,
    pub start_at: NaiveDateTime,
    pub notes: Option<String>,
}

/// Caller-supplied fields for a reservation that has not been saved yet.
///
/// `start_at` arrives as text and is validated by [`Reservation::from_input`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    pub customer_id: i64,
    pub num_guests: i64,
    pub start_at: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Parse a date/time from text, rejecting anything that is not one.
///
/// Text carrying an offset (RFC 3339) is converted to UTC; text without one
/// is taken as already being UTC.
pub fn parse_start_at(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.naive_utc());
    }
    START_AT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .ok_or_else(|| {
            ModelError::validation("startAt", format!("must be a date/time, got {text:?}"))
        })
}

fn check_num_guests(n: i64) -> Result<i64> {
    if n < 1 {
        return Err(ModelError::validation(
            "numGuests",
            "must have at least one guest",
        ));
    }
    Ok(n)
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    id: Option<i64>,
    customer_id: i64,
    num_guests: i64,
    start_at: NaiveDateTime,
    notes: String,
}

impl Reservation {
    /// A reservation that does not exist in the store yet.
    pub fn new(
        customer_id: i64,
        num_guests: i64,
        start_at: NaiveDateTime,
        notes: Option<String>,
    ) -> Result<Self> {
        Ok(Reservation {
            id: None,
            customer_id,
            num_guests: check_num_guests(num_guests)?,
            start_at,
            notes: normalize(notes),
        })
    }

    pub fn from_input(input: NewReservation) -> Result<Self> {
        let start_at = parse_start_at(&input.start_at)?;
        Reservation::new(input.customer_id, input.num_guests, start_at, input.notes)
    }

    /// Rows from the store go through the same guest-count check as new input.
    pub fn from_row(row: ReservationRow) -> Result<Self> {
        Ok(Reservation {
            id: Some(row.id),
            customer_id: row.customer_id,
            num_guests: check_num_guests(row.num_guests)?,
            start_at: row.start_at,
            notes: normalize(row.notes),
        })
    }

    pub fn customer_id(&self) -> i64 {
        self.customer_id
    }

    pub fn num_guests(&self) -> i64 {
        self.num_guests
    }

    pub fn start_at(&self) -> NaiveDateTime {
        self.start_at
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Fails without touching the current value when `n` is below one.
    pub fn set_num_guests(&mut self, n: i64) -> Result<()> {
        self.num_guests = check_num_guests(n)?;
        Ok(())
    }

    pub fn set_start_at(&mut self, at: NaiveDateTime) {
        self.start_at = at;
    }

    /// Fails without touching the current value when `text` is not a date/time.
    pub fn set_start_at_str(&mut self, text: &str) -> Result<()> {
        self.start_at = parse_start_at(text)?;
        Ok(())
    }

    pub fn set_notes(&mut self, value: impl Into<Option<String>>) {
        self.notes = normalize(value.into());
    }

    /// `start_at` for display, e.g. "April 5th 2024, 1:30 pm".
    pub fn formatted_start_at(&self) -> String {
        let at = self.start_at;
        format!(
            "{} {}{} {}",
            at.format("%B"),
            at.day(),
            ordinal_suffix(at.day()),
            at.format("%Y, %-I:%M %P")
        )
    }

    /// Every reservation for `customer_id`, in no particular order.
    pub async fn get_reservations_for_customer(
        db: &Db,
        customer_id: i64,
    ) -> Result<Vec<Reservation>> {
        debug!("Fetching reservations for customer {}", customer_id);
        let rows: Vec<ReservationRow> = db
            .query(
                r#"SELECT id,
                       customer_id AS "customerId",
                       num_guests AS "numGuests",
                       start_at AS "startAt",
                       notes
                   FROM reservations
                   WHERE customer_id = ?1"#,
                &[customer_id.into()],
            )
            .await?;
        rows.into_iter().map(Reservation::from_row).collect()
    }

    fn params(&self) -> Vec<Param> {
        vec![
            self.customer_id.into(),
            self.start_at.into(),
            self.num_guests.into(),
            self.notes.as_str().into(),
        ]
    }
}

#[async_trait::async_trait]
impl Model for Reservation {
    fn table_name() -> &'static str {
        "reservations"
    }

    fn create_table_sql() -> String {
        "CREATE TABLE IF NOT EXISTS reservations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER NOT NULL REFERENCES customers (id),
            num_guests INTEGER NOT NULL CHECK (num_guests >= 1),
            start_at DATETIME NOT NULL,
            notes TEXT NOT NULL DEFAULT ''
        )"
        .to_string()
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    async fn save(&mut self, db: &Db) -> Result<()> {
        let mut params = self.params();
        match self.id {
            None => {
                let (id,): (i64,) = db
                    .query_one(
                        "INSERT INTO reservations (customer_id, start_at, num_guests, notes)
                         VALUES (?1, ?2, ?3, ?4)
                         RETURNING id",
                        &params,
                    )
                    .await?;
                info!("Inserted reservation {} for customer {}", id, self.customer_id);
                self.id = Some(id);
            }
            Some(id) => {
                params.push(id.into());
                let updated = db
                    .execute_with(
                        "UPDATE reservations
                         SET customer_id = ?1, start_at = ?2, num_guests = ?3, notes = ?4
                         WHERE id = ?5",
                        &params,
                    )
                    .await?;
                if updated == 0 {
                    return Err(ModelError::NotFound {
                        entity: "reservation",
                        id,
                    });
                }
                debug!("Updated reservation {}", id);
            }
        }
        Ok(())
    }
}

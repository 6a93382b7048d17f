//! Customer of the restaurant.
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::orm::{Db, FromRow, Model, Param};
use crate::reservation::Reservation;

const SELECT_COLUMNS: &str = r#"id,
       first_name AS "firstName",
       last_name AS "lastName",
       phone,
       notes"#;

/// A row of `customers`, keyed by the aliases the queries select.
#[derive(Debug, Clone, FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct CustomerRow {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Caller-supplied fields for a customer that has not been saved yet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCustomer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Structured input for reassigning [`Customer::full_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullName {
    pub firstname: String,
    pub lastname: String,
}

impl FullName {
    pub fn new(firstname: impl Into<String>, lastname: impl Into<String>) -> Self {
        FullName {
            firstname: firstname.into(),
            lastname: lastname.into(),
        }
    }

    fn render(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// Absent or empty text is stored as the empty string.
pub(crate) fn normalize(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// A restaurant patron.
///
/// `full_name` is derived at construction and on [`Customer::set_full_name`]
/// only. Changing the first or last name afterwards leaves it stale until
/// [`Customer::recompute_full_name`] is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    id: Option<i64>,
    first_name: String,
    last_name: String,
    phone: String,
    notes: String,
    full_name: String,
}

impl Customer {
    /// A customer that does not exist in the store yet.
    pub fn new(fields: NewCustomer) -> Self {
        Customer::build(
            None,
            fields.first_name,
            fields.last_name,
            fields.phone,
            fields.notes,
        )
    }

    pub fn from_row(row: CustomerRow) -> Self {
        Customer::build(
            Some(row.id),
            row.first_name,
            row.last_name,
            row.phone,
            row.notes,
        )
    }

    fn build(
        id: Option<i64>,
        first_name: Option<String>,
        last_name: Option<String>,
        phone: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let mut customer = Customer {
            id,
            first_name: normalize(first_name),
            last_name: normalize(last_name),
            phone: normalize(phone),
            notes: normalize(notes),
            full_name: String::new(),
        };
        customer.recompute_full_name();
        customer
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    // Setters only normalize; no format checks on names or phone numbers.

    pub fn set_first_name(&mut self, value: impl Into<Option<String>>) {
        self.first_name = normalize(value.into());
    }

    pub fn set_last_name(&mut self, value: impl Into<Option<String>>) {
        self.last_name = normalize(value.into());
    }

    pub fn set_phone(&mut self, value: impl Into<Option<String>>) {
        self.phone = normalize(value.into());
    }

    pub fn set_notes(&mut self, value: impl Into<Option<String>>) {
        self.notes = normalize(value.into());
    }

    /// Replace the display name, independent of the current first/last name.
    pub fn set_full_name(&mut self, name: FullName) {
        self.full_name = name.render();
    }

    /// Rebuild `full_name` from the current first and last name.
    pub fn recompute_full_name(&mut self) {
        self.set_full_name(FullName::new(
            self.first_name.clone(),
            self.last_name.clone(),
        ));
    }

    fn from_rows(rows: Vec<CustomerRow>) -> Vec<Customer> {
        rows.into_iter().map(Customer::from_row).collect()
    }

    /// Every customer, ordered by last name then first name.
    pub async fn all(db: &Db) -> Result<Vec<Customer>> {
        debug!("Listing all customers");
        let rows = db
            .query(
                &format!(
                    "SELECT {SELECT_COLUMNS}
                     FROM customers
                     ORDER BY last_name, first_name"
                ),
                &[],
            )
            .await?;
        Ok(Customer::from_rows(rows))
    }

    /// The customer with `id`, or [`ModelError::NotFound`].
    pub async fn get(db: &Db, id: i64) -> Result<Customer> {
        debug!("Fetching customer {}", id);
        let row: Option<CustomerRow> = db
            .query_optional(
                &format!("SELECT {SELECT_COLUMNS} FROM customers WHERE id = ?1"),
                &[id.into()],
            )
            .await?;
        row.map(Customer::from_row).ok_or(ModelError::NotFound {
            entity: "customer",
            id,
        })
    }

    /// Customers whose first or last name contains `fragment`, ignoring case.
    ///
    /// Matching uses Unicode lowercasing, so "émile" finds "Émile". The
    /// fragment is trimmed and matched literally; a blank fragment returns
    /// everyone.
    pub async fn search(db: &Db, fragment: &str) -> Result<Vec<Customer>> {
        debug!("Searching customers for {:?}", fragment);
        let needle = fragment.trim().to_lowercase();
        let rows: Vec<CustomerRow> = db
            .query(
                &format!(
                    "SELECT {SELECT_COLUMNS}
                     FROM customers
                     ORDER BY last_name, first_name"
                ),
                &[],
            )
            .await?;
        Ok(Customer::from_rows(rows)
            .into_iter()
            .filter(|c| c.matches(&needle))
            .collect())
    }

    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        self.first_name.to_lowercase().contains(needle)
            || self.last_name.to_lowercase().contains(needle)
    }

    /// The `limit` customers with the most reservations, most first.
    ///
    /// Customers without reservations never appear. Ties come back in
    /// whatever order the store produces.
    pub async fn get_top_customers(db: &Db, limit: i64) -> Result<Vec<Customer>> {
        debug!("Fetching top {} customers", limit);
        // SQLite reads a negative LIMIT as "no limit"
        if limit < 0 {
            return Err(ModelError::validation(
                "limit",
                format!("must not be negative, got {limit}"),
            ));
        }
        let rows = db
            .query(
                r#"SELECT c.id,
                       c.first_name AS "firstName",
                       c.last_name AS "lastName",
                       c.phone,
                       c.notes
                   FROM reservations AS r
                   JOIN customers AS c ON r.customer_id = c.id
                   GROUP BY c.id
                   ORDER BY COUNT(*) DESC
                   LIMIT ?1"#,
                &[limit.into()],
            )
            .await?;
        Ok(Customer::from_rows(rows))
    }

    /// All reservations made by this customer. An unsaved customer has none.
    pub async fn get_reservations(&self, db: &Db) -> Result<Vec<Reservation>> {
        match self.id {
            Some(id) => Reservation::get_reservations_for_customer(db, id).await,
            None => Ok(Vec::new()),
        }
    }

    fn params(&self) -> Vec<Param> {
        vec![
            self.first_name.as_str().into(),
            self.last_name.as_str().into(),
            self.phone.as_str().into(),
            self.notes.as_str().into(),
        ]
    }
}

#[async_trait::async_trait]
impl Model for Customer {
    fn table_name() -> &'static str {
        "customers"
    }

    fn create_table_sql() -> String {
        "CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
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
                        "INSERT INTO customers (first_name, last_name, phone, notes)
                         VALUES (?1, ?2, ?3, ?4)
                         RETURNING id",
                        &params,
                    )
                    .await?;
                info!("Inserted customer {}", id);
                self.id = Some(id);
            }
            Some(id) => {
                params.push(id.into());
                let updated = db
                    .execute_with(
                        "UPDATE customers
                         SET first_name = ?1, last_name = ?2, phone = ?3, notes = ?4
                         WHERE id = ?5",
                        &params,
                    )
                    .await?;
                if updated == 0 {
                    return Err(ModelError::NotFound {
                        entity: "customer",
                        id,
                    });
                }
                debug!("Updated customer {}", id);
            }
        }
        Ok(())
    }
}

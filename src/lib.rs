pub mod customer;
pub mod error;
pub mod orm;
pub mod reservation;
pub mod settings;

pub use customer::{Customer, FullName, NewCustomer};
pub use error::{ModelError, Result};
pub use orm::{Db, Model};
pub use reservation::{NewReservation, Reservation};

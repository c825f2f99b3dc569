//! Durable key-value storage for the last known fix
//!
//! [`KeyValueStore`] models a named key-value namespace whose batch commits apply entirely or
//! not at all. [`CoordinateStore`] keeps exactly one [`GeoPosition`](crate::core::GeoPosition)
//! in such a namespace under the `geo_breite`/`geo_laenge` keys.

pub mod key_value;
pub mod coordinates;
pub mod error;

pub use key_value::{KeyValueStore, MemoryStore, JsonFileStore};
pub use coordinates::CoordinateStore;
pub use error::{StoreError, StoreResult};

//! Persistence of the most recent fix

use crate::core::constants::{PREFKEY_LATITUDE, PREFKEY_LONGITUDE};
use crate::core::GeoPosition;
use crate::storage::error::StoreResult;
use crate::storage::key_value::KeyValueStore;
use tracing::{debug, info};

/// Holds at most one position; every save overwrites the previous one
pub struct CoordinateStore {
    backend: Box<dyn KeyValueStore>,
}

impl CoordinateStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Persist both coordinates in a single commit, replacing any stored position
    pub fn save(&mut self, position: &GeoPosition) -> StoreResult<()> {
        self.backend.commit(&[
            (PREFKEY_LATITUDE, position.latitude()),
            (PREFKEY_LONGITUDE, position.longitude()),
        ])?;

        info!(%position, namespace = self.backend.namespace(), "position stored");
        Ok(())
    }

    /// Stored position, or `None` unless both coordinates are present
    pub fn load(&self) -> StoreResult<Option<GeoPosition>> {
        let values = self.backend.get_many(&[PREFKEY_LATITUDE, PREFKEY_LONGITUDE])?;

        match values.as_slice() {
            [Some(latitude), Some(longitude)] => {
                Ok(Some(GeoPosition::new(*latitude, *longitude)?))
            }
            _ => {
                debug!(namespace = self.backend.namespace(), "no position stored yet");
                Ok(None)
            }
        }
    }

    /// Drop the stored position
    pub fn clear(&mut self) -> StoreResult<()> {
        self.backend.remove(&[PREFKEY_LATITUDE, PREFKEY_LONGITUDE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, MemoryStore, StoreError};
    use tempfile::tempdir;

    fn pos(lat: f64, lon: f64) -> GeoPosition {
        GeoPosition::new(lat, lon).unwrap()
    }

    #[test]
    fn test_empty_store_loads_none() {
        let store = CoordinateStore::new(Box::new(MemoryStore::new("prefs")));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_round_trip_is_exact() {
        let mut store = CoordinateStore::new(Box::new(MemoryStore::new("prefs")));
        let position = pos(52.520_008_123_456_7, 13.404_954_987_654_3);
        store.save(&position).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.latitude(), position.latitude());
        assert_eq!(loaded.longitude(), position.longitude());
    }

    #[test]
    fn test_file_round_trip_is_exact() {
        let dir = tempdir().unwrap();
        let backend = JsonFileStore::open(dir.path(), "koordinaten_prefs").unwrap();
        let mut store = CoordinateStore::new(Box::new(backend));

        let samples = [
            pos(0.1 + 0.2, -0.0),
            pos(-33.868_819_999_999_99, 151.209_295_5),
            pos(89.999_999_999_999_99, -179.999_999_999_999_97),
            pos(1e-300, 2.5e-10),
        ];

        for position in samples {
            store.save(&position).unwrap();
            assert_eq!(store.load().unwrap(), Some(position));
        }
    }

    #[test]
    fn test_save_overwrites() {
        let mut store = CoordinateStore::new(Box::new(MemoryStore::new("prefs")));
        store.save(&pos(52.5, 13.4)).unwrap();
        store.save(&pos(48.8566, 2.3522)).unwrap();

        assert_eq!(store.load().unwrap(), Some(pos(48.8566, 2.3522)));
    }

    #[test]
    fn test_partial_entry_loads_none() {
        let mut backend = MemoryStore::new("prefs");
        backend.insert_raw(PREFKEY_LATITUDE, 52.5);
        let store = CoordinateStore::new(Box::new(backend));
        assert_eq!(store.load().unwrap(), None);

        let mut backend = MemoryStore::new("prefs");
        backend.insert_raw(PREFKEY_LONGITUDE, 13.4);
        let store = CoordinateStore::new(Box::new(backend));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_write_failure_is_reported_and_keeps_old_position() {
        let mut backend = MemoryStore::new("prefs");
        backend.insert_raw(PREFKEY_LATITUDE, 52.5);
        backend.insert_raw(PREFKEY_LONGITUDE, 13.4);
        backend.set_read_only(true);
        let mut store = CoordinateStore::new(Box::new(backend));

        let err = store.save(&pos(1.0, 2.0)).unwrap_err();
        assert!(err.is_write_failure());
        assert_eq!(store.load().unwrap(), Some(pos(52.5, 13.4)));
    }

    #[test]
    fn test_out_of_range_entries_are_rejected() {
        let mut backend = MemoryStore::new("prefs");
        backend.insert_raw(PREFKEY_LATITUDE, 123.0);
        backend.insert_raw(PREFKEY_LONGITUDE, 13.4);
        let store = CoordinateStore::new(Box::new(backend));

        assert!(matches!(store.load(), Err(StoreError::InvalidPosition(_))));
    }

    #[test]
    fn test_clear() {
        let mut store = CoordinateStore::new(Box::new(MemoryStore::new("prefs")));
        store.save(&pos(52.5, 13.4)).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}

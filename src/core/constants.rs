//! Fixed identifiers and physical constants

/// Key of the persisted latitude entry
pub const PREFKEY_LATITUDE: &str = "geo_breite";

/// Key of the persisted longitude entry
pub const PREFKEY_LONGITUDE: &str = "geo_laenge";

/// Default key-value namespace holding the last fix
pub const DEFAULT_STORE_NAMESPACE: &str = "koordinaten_prefs";

/// Runtime permission required for a GPS fix
pub const FINE_LOCATION_PERMISSION: &str = "android.permission.ACCESS_FINE_LOCATION";

/// Provider identifier for satellite fixes
pub const GPS_PROVIDER: &str = "gps";

/// First platform API level with runtime permission checks
pub const RUNTIME_PERMISSION_API_LEVEL: u32 = 23;

/// IUGG mean Earth radius (m)
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Distances above this are rendered in kilometers
pub const KM_DISPLAY_THRESHOLD_M: u32 = 10_000;

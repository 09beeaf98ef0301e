// Tuning constants for the event relay, in one place.

// === Event delivery ===
// Buffered events per subscriber before the oldest are dropped. Sixteen
// event kinds with Progress ticking every second leaves plenty of headroom.
pub const EVENT_BUS_CAPACITY: usize = 256;

// === Time units ===
// Engine boundaries speak milliseconds; everything application-facing is
// seconds.
pub const MS_PER_SEC: f64 = 1000.0;

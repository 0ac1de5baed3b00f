//! GPIO pin assignments for the binsense sensor board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Binary sensors
// ---------------------------------------------------------------------------

/// Reed switch on the door frame. Pull-up input; LOW = door open.
pub const DOOR_SENSOR_GPIO: i32 = 4;
/// PIR motion module output. Pull-down input; HIGH = presence.
pub const PIR_SENSOR_GPIO: i32 = 5;
/// Smoke detector alarm output (open-drain). Pull-up input; LOW = smoke.
pub const SMOKE_SENSOR_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Indicator LEDs
// ---------------------------------------------------------------------------

/// Discrete RGB LED, common anode: driving a channel LOW lights it.
pub const LED_R_GPIO: i32 = 11;
pub const LED_G_GPIO: i32 = 12;
pub const LED_B_GPIO: i32 = 13;

/// On-board LED, active HIGH. Lit while a central is connected.
pub const LED_LINK_GPIO: i32 = 21;

/// Highest GPIO number on the ESP32-S3.
pub const MAX_GPIO: i32 = 48;

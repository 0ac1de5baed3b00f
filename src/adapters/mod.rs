//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to               |
//! |------------|--------------|---------------------------|
//! | `ble`      | LinkPort     | Bluedroid GATT server     |
//! |            | StatusPort   |                           |
//! |            | CommandPort  |                           |
//! | `hardware` | IndicatorPort| ESP32 GPIO (RGB + link)   |
//! | `log_sink` | EventSink    | Serial log output         |
//! | `nvs`      | ConfigPort   | NVS / in-memory store     |

pub mod ble;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub(crate) mod utils;

//! BLE GATT server adapter.
//!
//! Implements [`LinkPort`], [`StatusPort`] and [`CommandPort`] — the
//! hexagonal boundary between the sensor core and the Bluetooth Low
//! Energy peripheral role.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid GATT server via raw `esp_idf_svc::sys` calls.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## GATT Service Layout
//!
//! | Characteristic | UUID     | Perms       | Value                         |
//! |----------------|----------|-------------|-------------------------------|
//! | (service)      | `0x180A` |             |                               |
//! | LED command    | `0x2A57` | Read+Write  | 1 byte: 1=R 2=G 3=B other=off |
//! | Sensor status  | `0x2A56` | Read+Notify | bit0 door, bit1 smoke, bit2 PIR |

use log::{debug, info, warn};

use crate::app::ports::{CommandPort, LinkPort, PeerAddress, StatusPort};
use crate::error::CommsError;

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u16 = 0x180A;
pub const CHAR_LED_COMMAND: u16 = 0x2A57;
pub const CHAR_SENSOR_STATUS: u16 = 0x2A56;

/// Both characteristics carry exactly one byte.
const CHAR_VALUE_LEN: usize = 1;

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    Idle,
    Advertising,
    Connected,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF BLE static state (callback-safe atomics)
// ───────────────────────────────────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures. These statics bridge the callback context to the adapter.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering as AtomicOrdering};

#[cfg(target_os = "espidf")]
static BLE_GATTS_IF: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONN_ID: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONNECTED: AtomicBool = AtomicBool::new(false);
/// Bumped on every connect. A session is bound to one generation.
#[cfg(target_os = "espidf")]
static BLE_LINK_GEN: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_LED_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_STATUS_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CHAR_STEP: AtomicU32 = AtomicU32::new(0);

// Data bridging GATTS callbacks → BleAdapter.
// GATTS callbacks run in the Bluedroid task (not ISR), so std Mutex is safe.
#[cfg(target_os = "espidf")]
static BLE_PEER: std::sync::Mutex<Option<PeerAddress>> = std::sync::Mutex::new(None);
#[cfg(target_os = "espidf")]
static BLE_LED_BUF: std::sync::Mutex<Option<heapless::Vec<u8, 8>>> = std::sync::Mutex::new(None);

/// 16-bit service UUID expanded onto the Bluetooth base UUID, little-endian,
/// as the advertising data builder expects.
#[cfg(target_os = "espidf")]
static ADV_SERVICE_UUID128: [u8; 16] = [
    0xFB, 0x34, 0x9B, 0x5F, 0x80, 0x00, 0x00, 0x80, 0x00, 0x10, 0x00, 0x00,
    (SERVICE_UUID & 0xFF) as u8,
    (SERVICE_UUID >> 8) as u8,
    0x00, 0x00,
];

#[cfg(target_os = "espidf")]
fn uuid16_to_esp(uuid: u16) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 2;
    t.uuid.uuid16 = uuid;
    t
}

#[cfg(target_os = "espidf")]
unsafe fn add_gatt_char(svc_handle: u16, uuid: u16, perm: u32, prop: u32) {
    use esp_idf_svc::sys::*;
    let mut char_uuid = uuid16_to_esp(uuid);
    let mut initial = [0u8; CHAR_VALUE_LEN];
    let mut value = esp_attr_value_t {
        attr_max_len: CHAR_VALUE_LEN as u16,
        attr_len: CHAR_VALUE_LEN as u16,
        attr_value: initial.as_mut_ptr(),
    };
    let mut control = esp_attr_control_t {
        auto_rsp: ESP_GATT_AUTO_RSP as u8,
    };
    // SAFETY: Bluedroid copies the initial value before returning.
    unsafe {
        esp_ble_gatts_add_char(
            svc_handle,
            &mut char_uuid,
            perm as esp_gatt_perm_t,
            prop as esp_gatt_char_prop_t,
            &mut value,
            &mut control,
        );
    }
}

#[cfg(target_os = "espidf")]
unsafe fn add_cccd(svc_handle: u16) {
    use esp_idf_svc::sys::*;
    let mut uuid = uuid16_to_esp(ESP_GATT_UUID_CHAR_CLIENT_CONFIG as u16);
    let mut initial = [0u8; 2];
    let mut value = esp_attr_value_t {
        attr_max_len: 2,
        attr_len: 2,
        attr_value: initial.as_mut_ptr(),
    };
    let mut control = esp_attr_control_t {
        auto_rsp: ESP_GATT_AUTO_RSP as u8,
    };
    unsafe {
        esp_ble_gatts_add_char_descr(
            svc_handle,
            &mut uuid,
            (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
            &mut value,
            &mut control,
        );
    }
}

#[cfg(target_os = "espidf")]
unsafe fn start_advertising() {
    use esp_idf_svc::sys::*;
    let mut adv_params = esp_ble_adv_params_t {
        adv_int_min: 0x20,
        adv_int_max: 0x40,
        adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
        own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
        channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
        adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
        ..unsafe { core::mem::zeroed() }
    };
    unsafe {
        esp_ble_gap_start_advertising(&mut adv_params);
    }
}

/// Consume the connected central's address recorded by the GATTS callback.
#[cfg(target_os = "espidf")]
pub fn take_peer() -> Option<PeerAddress> {
    BLE_PEER.lock().ok().and_then(|mut p| p.take())
}

/// Consume LED characteristic bytes written by the central.
#[cfg(target_os = "espidf")]
pub fn take_led_data() -> Option<heapless::Vec<u8, 8>> {
    BLE_LED_BUF.lock().ok().and_then(|mut buf| buf.take())
}

#[cfg(not(target_os = "espidf"))]
pub fn take_peer() -> Option<PeerAddress> {
    None
}

#[cfg(not(target_os = "espidf"))]
pub fn take_led_data() -> Option<heapless::Vec<u8, 8>> {
    None
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    _param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_SET_COMPLETE_EVT => {
            unsafe { start_advertising() };
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising started");
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising stopped");
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gatts_event_handler(
    event: esp_idf_svc::sys::esp_gatts_cb_event_t,
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
) {
    use esp_idf_svc::sys::*;

    BLE_GATTS_IF.store(gatts_if as u32, AtomicOrdering::Relaxed);

    match event {
        esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
            log::info!("BLE GATTS: app registered (if={})", gatts_if);
            let mut svc_id = esp_gatt_srvc_id_t {
                id: esp_gatt_id_t {
                    uuid: uuid16_to_esp(SERVICE_UUID),
                    inst_id: 0,
                },
                is_primary: true,
            };
            // service + 2 × (decl + value) + CCCD
            unsafe { esp_ble_gatts_create_service(gatts_if, &mut svc_id, 8) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            let p = unsafe { &(*param).create };
            let svc_handle = p.service_handle;
            BLE_SVC_HANDLE.store(svc_handle as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: service created (handle={})", svc_handle);
            unsafe { esp_ble_gatts_start_service(svc_handle) };
            BLE_CHAR_STEP.store(1, AtomicOrdering::Relaxed);
            unsafe {
                add_gatt_char(
                    svc_handle,
                    CHAR_LED_COMMAND,
                    ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE,
                    ESP_GATT_CHAR_PROP_BIT_READ | ESP_GATT_CHAR_PROP_BIT_WRITE,
                );
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            let p = unsafe { &(*param).add_char };
            let handle = p.attr_handle;
            let svc_handle = BLE_SVC_HANDLE.load(AtomicOrdering::Relaxed) as u16;
            match BLE_CHAR_STEP.load(AtomicOrdering::Relaxed) {
                1 => {
                    BLE_LED_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
                    log::info!("BLE GATTS: LED char (handle={})", handle);
                    BLE_CHAR_STEP.store(2, AtomicOrdering::Relaxed);
                    unsafe {
                        add_gatt_char(
                            svc_handle,
                            CHAR_SENSOR_STATUS,
                            ESP_GATT_PERM_READ,
                            ESP_GATT_CHAR_PROP_BIT_READ | ESP_GATT_CHAR_PROP_BIT_NOTIFY,
                        );
                    }
                }
                2 => {
                    BLE_STATUS_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
                    log::info!("BLE GATTS: status char (handle={})", handle);
                    BLE_CHAR_STEP.store(3, AtomicOrdering::Relaxed);
                    unsafe { add_cccd(svc_handle) };
                }
                _ => {}
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_DESCR_EVT => {
            log::info!("BLE GATTS: status CCCD added, all registered");
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            let p = unsafe { &(*param).connect };
            BLE_CONN_ID.store(p.conn_id as u32, AtomicOrdering::Relaxed);
            if let Ok(mut peer) = BLE_PEER.lock() {
                *peer = Some(p.remote_bda);
            }
            BLE_LINK_GEN.fetch_add(1, AtomicOrdering::AcqRel);
            BLE_CONNECTED.store(true, AtomicOrdering::Release);
            log::info!("BLE GATTS: client connected (conn_id={})", p.conn_id);
            crate::events::push_event(crate::events::Event::CentralConnected);
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            BLE_CONNECTED.store(false, AtomicOrdering::Release);
            log::info!("BLE GATTS: client disconnected");
            crate::events::push_event(crate::events::Event::CentralDisconnected);
            // Restart advertising after disconnect.
            unsafe { start_advertising() };
        }
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            let p = unsafe { &(*param).write };
            if p.handle as u32 == BLE_LED_CHAR_HANDLE.load(AtomicOrdering::Relaxed) {
                let data = unsafe { core::slice::from_raw_parts(p.value, p.len as usize) };
                if let Ok(mut buf) = BLE_LED_BUF.lock() {
                    let mut bytes = heapless::Vec::new();
                    // Oversized writes keep their first 8 bytes; the adapter
                    // rejects anything but exactly one byte anyway.
                    let _ = bytes.extend_from_slice(&data[..data.len().min(8)]);
                    *buf = Some(bytes);
                }
                crate::events::push_event(crate::events::Event::IndicatorWritten);
            }
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

pub struct BleAdapter {
    state: BleState,
    device_name: heapless::String<24>,
    peer: Option<PeerAddress>,
    /// Link generation the current session was opened on.
    session: Option<u32>,
    pending_command: Option<u8>,
    status_value: u8,
    notify_count: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_link: Option<u32>,
    #[cfg(not(target_os = "espidf"))]
    sim_generation: u32,
}

impl BleAdapter {
    pub fn new(device_name: heapless::String<24>) -> Self {
        Self {
            state: BleState::Idle,
            device_name,
            peer: None,
            session: None,
            pending_command: None,
            status_value: 0,
            notify_count: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_link: None,
            #[cfg(not(target_os = "espidf"))]
            sim_generation: 0,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Current value of the status characteristic.
    pub fn status_value(&self) -> u8 {
        self.status_value
    }

    /// Status notifications sent since start.
    pub fn notify_count(&self) -> u32 {
        self.notify_count
    }

    /// Bring up the stack, register the GATT service and start advertising.
    pub fn start(&mut self) -> Result<(), CommsError> {
        info!("BLE: starting advertising as '{}'", self.device_name);
        if let Err(e) = self.platform_start() {
            self.state = BleState::Failed;
            return Err(e);
        }
        self.state = BleState::Advertising;
        self.status_value = 0;
        self.pending_command = None;
        Ok(())
    }

    /// Open a session on the link that is up right now. A later reconnect
    /// starts a new generation and ends this session.
    pub fn on_central_connected(&mut self, peer: Option<PeerAddress>) {
        info!("BLE: central connected");
        // Host: a connect notification implies the simulated link is up.
        #[cfg(not(target_os = "espidf"))]
        if self.sim_link.is_none() {
            self.sim_link_up();
        }
        self.state = BleState::Connected;
        self.peer = peer;
        self.session = self.platform_link();
    }

    pub fn on_central_disconnected(&mut self) {
        info!("BLE: central disconnected");
        #[cfg(not(target_os = "espidf"))]
        self.sim_link_down();
        self.peer = None;
        self.session = None;
        self.pending_command = None;
        if self.state != BleState::Idle {
            self.state = BleState::Advertising;
        }
    }

    /// Accept a write to the LED characteristic. Only single-byte writes
    /// are valid; a newer write replaces one not yet taken.
    pub fn on_command_write(&mut self, raw: &[u8]) -> Result<(), CommsError> {
        let [byte] = raw else {
            warn!("BLE: LED write of {} bytes ignored", raw.len());
            return Err(CommsError::InvalidWriteLength);
        };
        self.pending_command = Some(*byte);
        info!("BLE: LED command written (0x{:02x})", byte);
        Ok(())
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::sys::*;
        unsafe {
            // Release classic BT memory (BLE-only mode saves ~30 KB).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            let ret = esp_bt_controller_init(&mut bt_cfg);
            if ret != ESP_OK as i32 {
                log::error!("BLE: bt_controller_init failed ({})", ret);
                return Err(CommsError::BleInitFailed);
            }

            let ret = esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE);
            if ret != ESP_OK as i32 {
                log::error!("BLE: bt_controller_enable failed ({})", ret);
                return Err(CommsError::BleInitFailed);
            }

            let ret = esp_bluedroid_init();
            if ret != ESP_OK as i32 {
                log::error!("BLE: bluedroid_init failed ({})", ret);
                return Err(CommsError::BleInitFailed);
            }

            let ret = esp_bluedroid_enable();
            if ret != ESP_OK as i32 {
                log::error!("BLE: bluedroid_enable failed ({})", ret);
                return Err(CommsError::BleInitFailed);
            }

            esp_ble_gap_register_callback(Some(ble_gap_event_handler));
            esp_ble_gatts_register_callback(Some(ble_gatts_event_handler));
            esp_ble_gatts_app_register(0);

            // Device name must be NUL-terminated for the C API.
            let mut name = [0u8; 25];
            let bytes = self.device_name.as_bytes();
            name[..bytes.len()].copy_from_slice(bytes);
            esp_ble_gap_set_device_name(name.as_ptr() as *const _);

            // Advertising starts from the GAP callback once this completes.
            let mut adv_data = esp_ble_adv_data_t {
                set_scan_rsp: false,
                include_name: true,
                include_txpower: false,
                min_interval: 0x0006,
                max_interval: 0x0010,
                service_uuid_len: ADV_SERVICE_UUID128.len() as u16,
                p_service_uuid: ADV_SERVICE_UUID128.as_ptr() as *mut u8,
                flag: (ESP_BLE_ADV_FLAG_GEN_DISC | ESP_BLE_ADV_FLAG_BREDR_NOT_SPT) as u8,
                ..core::mem::zeroed()
            };
            esp_ble_gap_config_adv_data(&mut adv_data);

            info!(
                "BLE(espidf): Bluedroid stack initialized, advertising as '{}'",
                self.device_name
            );
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        info!(
            "BLE(sim): advertising '{}' (service 0x{:04X})",
            self.device_name, SERVICE_UUID
        );
        Ok(())
    }

    /// Generation of the live link, `None` while disconnected.
    #[cfg(target_os = "espidf")]
    fn platform_link(&self) -> Option<u32> {
        BLE_CONNECTED
            .load(AtomicOrdering::Acquire)
            .then(|| BLE_LINK_GEN.load(AtomicOrdering::Acquire))
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link(&self) -> Option<u32> {
        self.sim_link
    }

    /// Simulate the radio bringing a link up, as the GATTS connect callback does.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_link_up(&mut self) {
        self.sim_generation = self.sim_generation.wrapping_add(1);
        self.sim_link = Some(self.sim_generation);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_link_down(&mut self) {
        self.sim_link = None;
    }

    #[cfg(target_os = "espidf")]
    fn platform_notify_status(&mut self, bits: u8) {
        use esp_idf_svc::sys::*;
        let handle = BLE_STATUS_CHAR_HANDLE.load(AtomicOrdering::Relaxed) as u16;
        if handle == 0 {
            return;
        }
        let mut value = [bits];
        unsafe {
            esp_ble_gatts_set_attr_value(handle, CHAR_VALUE_LEN as u16, value.as_ptr());
            if BLE_CONNECTED.load(AtomicOrdering::Acquire) {
                esp_ble_gatts_send_indicate(
                    BLE_GATTS_IF.load(AtomicOrdering::Relaxed) as esp_gatt_if_t,
                    BLE_CONN_ID.load(AtomicOrdering::Relaxed) as u16,
                    handle,
                    CHAR_VALUE_LEN as u16,
                    value.as_mut_ptr(),
                    false,
                );
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_notify_status(&mut self, bits: u8) {
        info!("BLE(sim): status notify 0b{:08b}", bits);
    }
}

// ───────────────────────────────────────────────────────────────
// Port implementations
// ───────────────────────────────────────────────────────────────

impl LinkPort for BleAdapter {
    fn is_connected(&self) -> bool {
        self.session.is_some() && self.platform_link() == self.session
    }

    fn peer(&self) -> Option<PeerAddress> {
        self.peer
    }
}

impl StatusPort for BleAdapter {
    fn publish_status(&mut self, bits: u8) {
        self.status_value = bits;
        self.notify_count = self.notify_count.wrapping_add(1);
        self.platform_notify_status(bits);
    }
}

impl CommandPort for BleAdapter {
    fn take_command(&mut self) -> Option<u8> {
        // Writes arriving mid-session are not seen by the event drain.
        if let Some(raw) = take_led_data() {
            if let Err(e) = self.on_command_write(&raw) {
                debug!("BLE: mid-session LED write dropped ({})", e);
            }
        }
        self.pending_command.take()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

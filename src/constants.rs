/// Current firmware version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Size of the heap in DRAM (internal memory)
pub const HEAP_SIZE: usize = 72 * 1024;

/// Size of the TCP socket receive buffer
pub const RX_BUFFER_SIZE: usize = 4096;
/// Size of the TCP socket transmit buffer
pub const TX_BUFFER_SIZE: usize = 4096;

/// Size of the MQTT client receive buffer for application data
pub const MQTT_RX_BUFFER_SIZE: usize = 1024;
/// Size of the MQTT client transmit buffer for application data
pub const MQTT_TX_BUFFER_SIZE: usize = 1024;

/// Maximum number of MQTT v5 properties per packet
pub const MQTT_MAX_PROPERTIES: usize = 5;
/// MQTT keep-alive in seconds (status publishes keep the session busy anyway)
pub const MQTT_KEEP_ALIVE_SECS: u16 = 60;
/// Largest MQTT packet the client accepts
pub const MQTT_MAX_PACKET_SIZE: u32 = 1024;

/// Pending LED commands before the session back-pressures
pub const COMMAND_QUEUE_DEPTH: usize = 4;

/// Capacity for the derived state topic name
pub const STATE_TOPIC_MAX: usize = 96;
/// Capacity for the formatted status payload
pub const STATUS_PAYLOAD_MAX: usize = 128;

/// TCP inactivity timeout in seconds
pub const SOCKET_TIMEOUT_SECS: u64 = 300;

/// Timeout for a single WiFi association attempt
pub const WIFI_CONNECT_TIMEOUT_SECS: u64 = 30;
/// Delay between WiFi reconnection attempts
pub const WIFI_RECONNECT_DELAY_MS: u64 = 5000;
/// Delay before rebuilding a failed MQTT session
pub const SESSION_RETRY_DELAY_MS: u64 = 5000;

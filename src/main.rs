#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_time::{Duration, Timer};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{
    gpio::{Level, Output, OutputConfig},
    rng::Rng,
    timer::timg::TimerGroup,
};
use esp_println::logger::init_logger;
use esp_wifi::EspWifiController;
use static_cell::StaticCell;

pub mod command;
pub mod config;
pub mod constants;
mod led;
mod mac;
mod mqtt;
mod session;
mod telemetry;
mod transport;
mod wifi;

use command::Command;
use config::CONFIG;
use constants::*;
use led::Led;
use session::Session;
use wifi::Wifi;

static ESP_WIFI_CTRL: StaticCell<EspWifiController<'static>> = StaticCell::new();
static RX_BUF: StaticCell<[u8; RX_BUFFER_SIZE]> = StaticCell::new();
static TX_BUF: StaticCell<[u8; TX_BUFFER_SIZE]> = StaticCell::new();

static COMMANDS: Channel<CriticalSectionRawMutex, Command, COMMAND_QUEUE_DEPTH> = Channel::new();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    init_logger(log::LevelFilter::Info);

    if let Err(e) = CONFIG.validate() {
        panic!("Invalid device configuration: {:?}", e);
    }
    log::info!(
        "mqtt_led_control v{} starting, deployment profile {:?}",
        VERSION,
        config::PROFILE
    );

    let peripherals = esp_hal::init(esp_hal::Config::default());

    let rng = Rng::new(peripherals.RNG);

    esp_alloc::heap_allocator!(size: HEAP_SIZE);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let timg1 = TimerGroup::new(peripherals.TIMG1);

    esp_hal_embassy::init(timg0.timer0);

    // possibly high transient required at init
    // https://github.com/esp-rs/esp-hal/issues/1626
    Timer::after(Duration::from_millis(1000)).await;

    let led_output = match CONFIG.led_pin {
        2 => Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default()),
        4 => Output::new(peripherals.GPIO4, Level::Low, OutputConfig::default()),
        5 => Output::new(peripherals.GPIO5, Level::Low, OutputConfig::default()),
        16 => Output::new(peripherals.GPIO16, Level::Low, OutputConfig::default()),
        17 => Output::new(peripherals.GPIO17, Level::Low, OutputConfig::default()),
        25 => Output::new(peripherals.GPIO25, Level::Low, OutputConfig::default()),
        26 => Output::new(peripherals.GPIO26, Level::Low, OutputConfig::default()),
        27 => Output::new(peripherals.GPIO27, Level::Low, OutputConfig::default()),
        other => panic!("LED GPIO {} is not wired on this board", other),
    };
    let led = Led::new(led_output);

    spawner
        .spawn(led::led_task(led, COMMANDS.receiver()))
        .expect("Failed to spawn LED task");

    let esp_wifi_ctrl = ESP_WIFI_CTRL.init(
        esp_wifi::init(timg1.timer0, rng.clone(), peripherals.RADIO_CLK)
            .expect("Failed to initialize WiFi radio"),
    );

    let wifi = Wifi::new(esp_wifi_ctrl, peripherals.WIFI, rng, spawner)
        .await
        .unwrap();

    wifi.connect().await.unwrap();

    let rx_buf = RX_BUF.init([0; RX_BUFFER_SIZE]);
    let tx_buf = TX_BUF.init([0; TX_BUFFER_SIZE]);

    let session = Session::new(wifi.stack, COMMANDS.sender(), rx_buf, tx_buf);
    spawner.spawn(session::session_task(session)).ok();
}

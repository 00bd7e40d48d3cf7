use embassy_net::Stack;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Sender};
use embassy_time::{with_timeout, Duration, Instant, Timer};
use static_cell::StaticCell;

use crate::command::Command;
use crate::config::CONFIG;
use crate::constants::*;
use crate::led;
use crate::mqtt::{self, Mqtt};
use crate::telemetry;
use crate::transport;

static MQTT_RX_BUF: StaticCell<[u8; MQTT_RX_BUFFER_SIZE]> = StaticCell::new();
static MQTT_TX_BUF: StaticCell<[u8; MQTT_TX_BUFFER_SIZE]> = StaticCell::new();

#[derive(Debug)]
pub enum Error {
    #[allow(dead_code)]
    Transport(transport::Error),
    #[allow(dead_code)]
    Mqtt(mqtt::Error),
    Format,
}

/// One MQTT session: a TCP connection to the broker, a command
/// subscription, and periodic status publishes. Rebuilt from scratch by
/// the session task whenever it fails.
pub struct Session {
    stack: Stack<'static>,
    commands: Sender<'static, CriticalSectionRawMutex, Command, COMMAND_QUEUE_DEPTH>,
    rx_buf: &'static mut [u8; RX_BUFFER_SIZE],
    tx_buf: &'static mut [u8; TX_BUFFER_SIZE],
    mqtt_rx_buf: &'static mut [u8; MQTT_RX_BUFFER_SIZE],
    mqtt_tx_buf: &'static mut [u8; MQTT_TX_BUFFER_SIZE],
}

impl Session {
    pub fn new(
        stack: Stack<'static>,
        commands: Sender<'static, CriticalSectionRawMutex, Command, COMMAND_QUEUE_DEPTH>,
        rx_buf: &'static mut [u8; RX_BUFFER_SIZE],
        tx_buf: &'static mut [u8; TX_BUFFER_SIZE],
    ) -> Self {
        Self {
            stack,
            commands,
            rx_buf,
            tx_buf,
            mqtt_rx_buf: MQTT_RX_BUF.init([0; MQTT_RX_BUFFER_SIZE]),
            mqtt_tx_buf: MQTT_TX_BUF.init([0; MQTT_TX_BUFFER_SIZE]),
        }
    }

    pub async fn run(&mut self) -> Result<(), Error> {
        let socket = transport::connect(
            self.stack,
            self.rx_buf.as_mut_slice(),
            self.tx_buf.as_mut_slice(),
            CONFIG.mqtt_broker,
            CONFIG.mqtt_port,
        )
        .await
        .map_err(Error::Transport)?;

        let mut mqtt = Mqtt::new(
            socket,
            self.mqtt_tx_buf.as_mut_slice(),
            self.mqtt_rx_buf.as_mut_slice(),
        )
        .await
        .map_err(Error::Mqtt)?;

        mqtt.subscribe(CONFIG.command_topic).await.map_err(Error::Mqtt)?;

        let state_topic = telemetry::state_topic(CONFIG.command_topic).map_err(|_| Error::Format)?;
        let interval = Duration::from_millis(CONFIG.publish_interval_ms.into());
        let mut next_publish = Instant::now();

        loop {
            let now = Instant::now();
            if now >= next_publish {
                let payload = telemetry::format_status(led::is_on(), now.as_secs())
                    .map_err(|_| Error::Format)?;
                mqtt.publish(state_topic.as_str(), payload.as_bytes())
                    .await
                    .map_err(Error::Mqtt)?;
                log::debug!("Published status to {:?}", state_topic.as_str());

                next_publish += interval;
                if next_publish <= now {
                    // fell behind, e.g. a slow broker; don't publish a burst
                    next_publish = now + interval;
                }
                continue;
            }

            // Wait for a command until the next status is due
            match with_timeout(next_publish - now, mqtt.receive()).await {
                Ok(Ok((topic, payload))) => match Command::parse(payload) {
                    Some(command) => self.commands.send(command).await,
                    None => log::warn!("Ignoring unknown payload on {:?}", topic),
                },
                Ok(Err(e)) => return Err(Error::Mqtt(e)),
                Err(_) => {} // timeout: publish on the next pass
            }
        }
    }
}

#[embassy_executor::task]
pub async fn session_task(mut session: Session) {
    loop {
        if let Err(e) = session.run().await {
            log::error!("MQTT session ended: {:?}", e);
        }
        Timer::after(Duration::from_millis(SESSION_RETRY_DELAY_MS)).await;
    }
}

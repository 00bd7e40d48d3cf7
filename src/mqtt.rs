use embedded_io_async::{Read, Write};
use rust_mqtt::{
    client::{
        client::MqttClient,
        client_config::{ClientConfig, MqttVersion},
    },
    packet::v5::{publish_packet::QualityOfService, reason_codes::ReasonCode},
    utils::rng_generator::CountingRng,
};

use crate::config::CONFIG;
use crate::constants::{MQTT_KEEP_ALIVE_SECS, MQTT_MAX_PACKET_SIZE, MQTT_MAX_PROPERTIES};

#[derive(Debug)]
pub enum Error {
    #[allow(dead_code)]
    ConnectFailed(ReasonCode),
    #[allow(dead_code)]
    SubscribeFailed(ReasonCode),
    #[allow(dead_code)]
    PublishFailed(ReasonCode),
    #[allow(dead_code)]
    ReceiveFailed(ReasonCode),
}

pub struct Mqtt<'a, T>
where
    T: Read + Write,
{
    client: MqttClient<'a, T, MQTT_MAX_PROPERTIES, CountingRng>,
}

impl<'a, T> Mqtt<'a, T>
where
    T: Read + Write,
{
    pub async fn new(
        transport: T,
        write_buf: &'a mut [u8],
        recv_buf: &'a mut [u8],
    ) -> Result<Self, Error> {
        let mut config = ClientConfig::new(MqttVersion::MQTTv5, CountingRng(20000));
        config.add_client_id(CONFIG.mqtt_client_id);
        config.add_max_subscribe_qos(QualityOfService::QoS1);
        config.keep_alive = MQTT_KEEP_ALIVE_SECS;
        config.max_packet_size = MQTT_MAX_PACKET_SIZE;

        // Credentials are optional: the open deployment's broker accepts
        // anonymous sessions and rejects unexpected auth properties.
        if let Some(username) = CONFIG.mqtt_username {
            config.add_username(username);
        }
        if let Some(password) = CONFIG.mqtt_password {
            config.add_password(password);
        }

        let write_len = write_buf.len();
        let recv_len = recv_buf.len();
        let mut client = MqttClient::<_, MQTT_MAX_PROPERTIES, _>::new(
            transport, write_buf, write_len, recv_buf, recv_len, config,
        );

        match client.connect_to_broker().await {
            Ok(()) => {
                log::info!(
                    "MQTT connected to broker as {:?}",
                    CONFIG.mqtt_client_id
                );
            }
            Err(e) => {
                log::error!("MQTT connect_to_broker failed: {:?}", e);
                return Err(Error::ConnectFailed(e));
            }
        }

        Ok(Self { client })
    }

    pub async fn subscribe(&mut self, topic: &str) -> Result<(), Error> {
        self.client
            .subscribe_to_topic(topic)
            .await
            .map_err(Error::SubscribeFailed)?;
        log::info!("Subscribed to {:?}", topic);
        Ok(())
    }

    /// Wait for the next message on any subscribed topic.
    pub async fn receive(&mut self) -> Result<(&str, &[u8]), Error> {
        self.client
            .receive_message()
            .await
            .map_err(Error::ReceiveFailed)
    }

    pub async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Error> {
        self.client
            .send_message(topic, payload, QualityOfService::QoS0, false)
            .await
            .map_err(Error::PublishFailed)
    }

    pub async fn disconnect(mut self) {
        let _ = self.client.disconnect().await;
    }
}

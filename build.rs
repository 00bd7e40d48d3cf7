use std::{env, error::Error, fs, path::Path};

use serde::Deserialize;

const PROFILES: [&str; 2] = ["cdac", "cvr"];

#[derive(Deserialize)]
struct RawConfig {
    led_pin: u8,
    wifi_ssid: String,
    wifi_password: String,
    command_topic: String,
    mqtt_broker: String,
    mqtt_port: u16,
    mqtt_client_id: String,
    mqtt_username: Option<String>,
    mqtt_password: Option<String>,
    mac_address: String,
    publish_interval_ms: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = env::var("OUT_DIR")?;
    let dest_path = Path::new(&out_dir).join("config.rs");

    let mut code = String::new();
    for profile in PROFILES {
        let file = format!("cfg/{profile}.toml");

        // Tell Cargo to rerun if a profile table changes
        println!("cargo:rerun-if-changed={file}");

        let toml_str = fs::read_to_string(&file)?;
        let raw: RawConfig = toml::from_str(&toml_str)?;
        let mac = check(&file, &raw)?;

        code.push_str(&emit(profile, &raw, mac));
    }

    // The active profile is picked by cargo feature; config.rs guards
    // against zero or multiple selected features with compile_error.
    for profile in PROFILES {
        code.push_str(&format!(
            r#"
        #[cfg(feature = {profile:?})]
        pub const CONFIG: Config = {upper};
        #[cfg(feature = {profile:?})]
        pub const PROFILE: &str = {profile:?};
    "#,
            upper = profile.to_uppercase(),
        ));
    }

    fs::write(dest_path, code)?;
    Ok(())
}

// Values are compile-time literals, so malformed ones must fail the build
// here rather than surface on the device.
fn check(file: &str, raw: &RawConfig) -> Result<[u8; 6], String> {
    if raw.wifi_ssid.is_empty() {
        return Err(format!("{file}: wifi_ssid must not be empty"));
    }
    if raw.wifi_ssid.len() > 32 {
        return Err(format!("{file}: wifi_ssid exceeds 32 bytes"));
    }
    if raw.wifi_password.len() > 64 {
        return Err(format!("{file}: wifi_password exceeds 64 bytes"));
    }
    if raw.command_topic.is_empty() {
        return Err(format!("{file}: command_topic must not be empty"));
    }
    if raw.mqtt_port == 0 {
        return Err(format!("{file}: mqtt_port must be in 1-65535"));
    }
    if raw.mqtt_client_id.is_empty() {
        return Err(format!("{file}: mqtt_client_id must not be empty"));
    }
    if raw.publish_interval_ms == 0 {
        return Err(format!("{file}: publish_interval_ms must be > 0"));
    }
    parse_mac(&raw.mac_address).map_err(|e| format!("{file}: mac_address: {e}"))
}

fn parse_mac(s: &str) -> Result<[u8; 6], String> {
    let mut mac = [0u8; 6];
    let mut parts = s.split(':');
    for byte in &mut mac {
        let part = parts
            .next()
            .ok_or_else(|| format!("expected 6 colon-separated octets, got {s:?}"))?;
        *byte = u8::from_str_radix(part, 16)
            .map_err(|_| format!("invalid hex octet {part:?} in {s:?}"))?;
    }
    if parts.next().is_some() {
        return Err(format!("expected 6 colon-separated octets, got {s:?}"));
    }
    Ok(mac)
}

fn emit(profile: &str, raw: &RawConfig, mac: [u8; 6]) -> String {
    let mac_literal = format!(
        "[0x{:02X}, 0x{:02X}, 0x{:02X}, 0x{:02X}, 0x{:02X}, 0x{:02X}]",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
    format!(
        r#"
        // Generated from cfg/{profile}.toml
        #[allow(dead_code)]
        pub const {upper}: Config = Config {{
            led_pin: {pin},
            wifi_ssid: {ssid:?},
            wifi_password: {psk:?},
            command_topic: {topic:?},
            mqtt_broker: {broker:?},
            mqtt_port: {port},
            mqtt_client_id: {client:?},
            mqtt_username: {user:?},
            mqtt_password: {pass:?},
            mac_address: {mac},
            publish_interval_ms: {interval},
        }};
    "#,
        upper = profile.to_uppercase(),
        pin = raw.led_pin,
        ssid = raw.wifi_ssid,
        psk = raw.wifi_password,
        topic = raw.command_topic,
        broker = raw.mqtt_broker,
        port = raw.mqtt_port,
        client = raw.mqtt_client_id,
        user = raw.mqtt_username,
        pass = raw.mqtt_password,
        mac = mac_literal,
        interval = raw.publish_interval_ms,
    )
}

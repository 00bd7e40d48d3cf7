use core::fmt::Write;

use heapless::String;

use crate::constants::{STATE_TOPIC_MAX, STATUS_PAYLOAD_MAX, VERSION};

/// Status reports go to the state topic paired with the command topic.
pub fn state_topic(command_topic: &str) -> Result<String<STATE_TOPIC_MAX>, core::fmt::Error> {
    let mut topic: String<STATE_TOPIC_MAX> = String::new();
    write!(topic, "{}/state", command_topic)?;
    Ok(topic)
}

pub fn format_status(
    led_on: bool,
    uptime_secs: u64,
) -> Result<String<STATUS_PAYLOAD_MAX>, core::fmt::Error> {
    let mut payload: String<STATUS_PAYLOAD_MAX> = String::new();
    write!(
        payload,
        "{{\"led\":\"{}\",\"uptime\":{},\"version\":\"{}\"}}",
        if led_on { "on" } else { "off" },
        uptime_secs,
        VERSION
    )?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_topic_pairs_with_command_topic() {
        let topic = state_topic("cdac/desd/commands").unwrap();
        assert_eq!(topic.as_str(), "cdac/desd/commands/state");

        let topic = state_topic("cvr/fdp/ledcontrol").unwrap();
        assert_eq!(topic.as_str(), "cvr/fdp/ledcontrol/state");
    }

    #[test]
    fn state_topic_fails_instead_of_truncating() {
        let long = core::str::from_utf8(&[b'x'; STATE_TOPIC_MAX]).unwrap();
        assert!(state_topic(long).is_err());
    }

    #[test]
    fn status_payload_reports_led_and_uptime() {
        let payload = format_status(true, 42).unwrap();
        assert!(payload.starts_with("{\"led\":\"on\",\"uptime\":42,"));
        assert!(payload.contains(VERSION));
        assert!(payload.ends_with("\"}"));

        let payload = format_status(false, 0).unwrap();
        assert!(payload.starts_with("{\"led\":\"off\",\"uptime\":0,"));
    }
}

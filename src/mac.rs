use core::fmt::Write;

use heapless::String;

/// Render a MAC address in the usual colon-separated form.
/// The capacity fits exactly six hex octets with separators.
pub fn format_mac(mac: &[u8; 6]) -> String<17> {
    let mut out = String::new();
    for (i, byte) in mac.iter().enumerate() {
        if i > 0 {
            let _ = out.push(':');
        }
        let _ = write!(out, "{:02X}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_colon_separated_uppercase() {
        let mac = [0xF4, 0x96, 0x34, 0x9D, 0xE6, 0x2B];
        assert_eq!(format_mac(&mac).as_str(), "F4:96:34:9D:E6:2B");
    }

    #[test]
    fn pads_low_octets() {
        let mac = [0x00, 0x01, 0x02, 0x0A, 0x0B, 0x0C];
        assert_eq!(format_mac(&mac).as_str(), "00:01:02:0A:0B:0C");
    }
}

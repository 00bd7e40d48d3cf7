use embassy_net::{
    dns::{DnsQueryType, Error as DnsError},
    tcp::{ConnectError, TcpSocket},
    IpAddress, Ipv4Address, Stack,
};
use embassy_time::Duration;

use crate::constants::SOCKET_TIMEOUT_SECS;

#[derive(Debug)]
pub enum Error {
    #[allow(dead_code)]
    DnsQueryFailed(DnsError),
    DnsLookupFailed,
    #[allow(dead_code)]
    SocketConnectionError(ConnectError),
}

/// Open a TCP connection to the broker. The configured broker is either an
/// IPv4 literal (used as-is) or a hostname (resolved over DNS).
pub async fn connect<'a>(
    stack: Stack<'static>,
    rx_buffer: &'a mut [u8],
    tx_buffer: &'a mut [u8],
    host: &str,
    port: u16,
) -> Result<TcpSocket<'a>, Error> {
    let addr = match ipv4_literal(host) {
        Some(addr) => IpAddress::Ipv4(addr),
        None => stack
            .dns_query(host, DnsQueryType::A)
            .await
            .map_err(Error::DnsQueryFailed)?
            .first()
            .copied()
            .ok_or(Error::DnsLookupFailed)?,
    };

    let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT_SECS)));

    log::info!("Connecting TCP socket to {}:{}", host, port);
    socket
        .connect((addr, port))
        .await
        .map_err(Error::SocketConnectionError)?;
    log::info!("TCP connected");

    Ok(socket)
}

fn ipv4_literal(host: &str) -> Option<Ipv4Address> {
    host.parse::<Ipv4Address>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_broker_addresses() {
        assert_eq!(
            ipv4_literal("192.168.0.105"),
            Some(Ipv4Address::new(192, 168, 0, 105))
        );
        assert_eq!(ipv4_literal("test.mosquitto.org"), None);
        assert_eq!(ipv4_literal("999.0.0.1"), None);
        assert_eq!(ipv4_literal(""), None);
    }
}

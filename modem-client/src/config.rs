//! Client configuration

use std::time::Duration;

/// Client settings
///
/// The defaults match the Aeris network on a Quectel BG96/BG95 module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Access point name of the PDP context
    pub apn: String,
    /// PDP context id used for sockets, ping and DNS
    pub context_id: u8,
    /// Socket (connect) id used by the TCP operations
    pub socket_id: u8,
    /// Settle time around socket open/close
    pub socket_delay: Duration,
    /// Settle time after a ping, covering its timeout plus margin
    pub ping_delay: Duration,
    /// URC wait for a DNS answer
    pub dns_wait: Duration,
    /// URC wait for entry into power saving mode
    pub psm_wait: Duration,
    /// Maximum bytes fetched by a socket read
    pub read_length: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            apn: "iot.aer.net".to_string(),
            context_id: 1,
            socket_id: 0,
            socket_delay: Duration::from_secs(1),
            ping_delay: Duration::from_secs(6),
            dns_wait: Duration::from_secs(4),
            psm_wait: Duration::from_secs(120),
            read_length: 1500,
        }
    }
}

impl ClientConfig {
    pub fn with_apn(mut self, apn: impl Into<String>) -> Self {
        self.apn = apn.into();
        self
    }
}

/// Requested PSM timers for `AT+CPSMS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PsmSettings {
    /// Requested periodic TAU timer byte
    pub tau: u8,
    /// Requested Active Time timer byte
    pub active_time: u8,
}

impl Default for PsmSettings {
    /// TAU 1 x (reserved unit 101), Active Time 31 x 2 sec
    fn default() -> Self {
        Self {
            tau: 0b1010_0001,
            active_time: 0b0001_1111,
        }
    }
}

impl PsmSettings {
    pub fn command(&self) -> String {
        format!(
            "AT+CPSMS=1,,,\"{:08b}\",\"{:08b}\"",
            self.tau, self.active_time
        )
    }
}

/// Requested eDRX parameters for `AT+CEDRXS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdrxSettings {
    /// 0 disable, 1 enable, 2 enable with `+CEDRXP` URC
    pub mode: u8,
    /// Access technology code (4 = LTE CAT M1, 5 = LTE CAT NB1)
    pub access_technology: u8,
    /// 4-bit requested eDRX cycle
    pub cycle: u8,
}

impl Default for EdrxSettings {
    fn default() -> Self {
        Self {
            mode: 2,
            access_technology: 4,
            cycle: 0b1001,
        }
    }
}

impl EdrxSettings {
    pub fn command(&self) -> String {
        format!(
            "AT+CEDRXS={},{},\"{:04b}\"",
            self.mode,
            self.access_technology,
            self.cycle & 0x0F
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psm_command() {
        assert_eq!(
            PsmSettings::default().command(),
            "AT+CPSMS=1,,,\"10100001\",\"00011111\""
        );
        let settings = PsmSettings {
            tau: 0b0110_0000,
            active_time: 0,
        };
        assert_eq!(settings.command(), "AT+CPSMS=1,,,\"01100000\",\"00000000\"");
    }

    #[test]
    fn test_edrx_command() {
        assert_eq!(EdrxSettings::default().command(), "AT+CEDRXS=2,4,\"1001\"");
        let nb = EdrxSettings {
            mode: 1,
            access_technology: 5,
            cycle: 0,
        };
        assert_eq!(nb.command(), "AT+CEDRXS=1,5,\"0000\"");
    }

    #[test]
    fn test_client_defaults() {
        let config = ClientConfig::default().with_apn("internet");
        assert_eq!(config.apn, "internet");
        assert_eq!(config.dns_wait, Duration::from_secs(4));
        assert_eq!(config.psm_wait, Duration::from_secs(120));
    }
}

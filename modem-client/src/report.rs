//! Typed reports decoded from query responses
//!
//! The `Display` output keeps the exact operator labels; log scrapers match
//! on them.

use crate::ModemResult;
use modem_decode::{
    edrx_cycle_duration, extract_fields, field, paging_time_duration, parse_bits, parse_int,
    psm_mode, registration_status, unquote, AccessTechnology, PsmTimer, SignalQuality,
};
use modem_session::Response;
use serde::Serialize;
use std::fmt;

/// PSM feature configuration from `+QPSMCFG: <threshold>,<mode>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PsmConfig {
    pub min_seconds: u32,
    pub mode: &'static str,
}

impl PsmConfig {
    pub fn decode(response: &str) -> ModemResult<Self> {
        let vals = extract_fields(response, "+QPSMCFG:")?;
        Ok(Self {
            min_seconds: parse_int(field(&vals, 0)?)?,
            mode: psm_mode(parse_int(field(&vals, 1)?)?),
        })
    }
}

/// Network-assigned PSM values from `+QPSMS`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkPsm {
    pub enabled: String,
    pub tau: String,
    pub active_time: String,
}

impl NetworkPsm {
    pub fn decode(response: &str) -> ModemResult<Self> {
        let vals = extract_fields(response, "+QPSMS:")?;
        Ok(Self {
            enabled: field(&vals, 0)?.to_string(),
            tau: field(&vals, 3)?.to_string(),
            active_time: field(&vals, 4)?.to_string(),
        })
    }
}

/// Requested PSM timers from `+CPSMS`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestedPsm {
    pub enabled: String,
    pub tau: PsmTimer,
    pub active_time: PsmTimer,
}

impl RequestedPsm {
    pub fn decode(response: &str) -> ModemResult<Self> {
        let vals = extract_fields(response, "+CPSMS:")?;
        Ok(Self {
            enabled: field(&vals, 0)?.to_string(),
            tau: PsmTimer::tau(parse_bits(field(&vals, 3)?)?),
            active_time: PsmTimer::active_time(parse_bits(field(&vals, 4)?)?),
        })
    }
}

/// Decode `+QCFG: "psm/urc",<enable>`
pub fn decode_psm_urc(response: &str) -> ModemResult<String> {
    let vals = extract_fields(response, "+QCFG: ")?;
    Ok(field(&vals, 1)?.to_string())
}

/// Everything `psm_info` learned
///
/// A section is `None` when its reply could not be decoded; the remaining
/// queries still ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PsmReport {
    pub config: Option<PsmConfig>,
    pub network: Option<NetworkPsm>,
    pub requested: Option<RequestedPsm>,
    pub urc: Option<String>,
}

impl fmt::Display for PsmReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(config) = &self.config {
            writeln!(f, "Minimum seconds to enter PSM: {}", config.min_seconds)?;
            writeln!(f, "PSM mode: {}", config.mode)?;
        }
        if let Some(network) = &self.network {
            writeln!(f, "PSM enabled: {}", network.enabled)?;
            writeln!(f, "Network-specified TAU: {}", network.tau)?;
            writeln!(f, "Network-specified Active Time: {}", network.active_time)?;
        }
        if let Some(requested) = &self.requested {
            writeln!(f, "PSM enabled: {}", requested.enabled)?;
            writeln!(f, "TAU requested units: {}", requested.tau.units)?;
            writeln!(f, "TAU requested value: {}", requested.tau.value)?;
            writeln!(f, "Active time requested units: {}", requested.active_time.units)?;
            writeln!(f, "Active time requested value: {}", requested.active_time.value)?;
        }
        if let Some(urc) = &self.urc {
            writeln!(f, "PSM unsolicited response codes (urc): {}", urc)?;
        }
        Ok(())
    }
}

/// eDRX parameters from `+CEDRXRDP: <AcT>,<requested>,<network>,<paging>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdrxReport {
    pub access_technology: AccessTechnology,
    pub requested_cycle: &'static str,
    pub network_cycle: &'static str,
    pub paging_time: &'static str,
}

impl EdrxReport {
    /// Decode a `AT+CEDRXRDP` reply
    ///
    /// Returns `None` when the access technology is not using eDRX; no
    /// cycle values follow in that case.
    pub fn decode(response: &str) -> ModemResult<Option<Self>> {
        let vals = extract_fields(response, "+CEDRXRDP: ")?;
        let access_technology = AccessTechnology::from_code(parse_int(field(&vals, 0)?)?);
        if !access_technology.uses_edrx() {
            return Ok(None);
        }
        Ok(Some(Self {
            access_technology,
            requested_cycle: edrx_cycle_duration(parse_bits(field(&vals, 1)?)?),
            network_cycle: edrx_cycle_duration(parse_bits(field(&vals, 2)?)?),
            paging_time: paging_time_duration(parse_bits(field(&vals, 3)?)?),
        }))
    }
}

impl fmt::Display for EdrxReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Access technology: {}", self.access_technology)?;
        writeln!(f, "Requested edrx cycle time: {}", self.requested_cycle)?;
        writeln!(f, "Network edrx cycle time: {}", self.network_cycle)?;
        writeln!(f, "Paging time: {}", self.paging_time)
    }
}

/// Replies of the basic modem check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModemStatus {
    pub identity: String,
    pub registration: Option<&'static str>,
    pub operator: String,
    pub signal: Option<SignalQuality>,
}

impl ModemStatus {
    /// Build from the `ATI`, `AT+CREG?`, `AT+COPS?` and `AT+CSQ` replies
    pub fn from_responses(
        identity: &Response,
        registration: &Response,
        operator: &Response,
        signal: &Response,
    ) -> Self {
        let registration = extract_fields(registration.text(), "+CREG:")
            .and_then(|vals| parse_int(field(&vals, 1)?))
            .map(registration_status)
            .ok();
        let operator = extract_fields(operator.text(), "+COPS:")
            .ok()
            .and_then(|vals| vals.get(2).map(|name| unquote(name).to_string()))
            .unwrap_or_default();

        Self {
            identity: strip_result_code(identity.text()),
            registration,
            operator,
            signal: SignalQuality::from_response(signal.text()).ok(),
        }
    }
}

impl fmt::Display for ModemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Modem: {}", self.identity)?;
        writeln!(
            f,
            "Registration: {}",
            self.registration.unwrap_or("Unknown")
        )?;
        writeln!(f, "Operator: {}", self.operator)?;
        match &self.signal {
            Some(signal) => writeln!(f, "Signal: {}", signal),
            None => writeln!(f, "Signal: Unknown"),
        }
    }
}

fn strip_result_code(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "OK")
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CPSMS: &str = "+CPSMS: 1,,,\"01100000\",\"00000000\"\r\n\r\nOK\r\n";

    #[test]
    fn test_requested_psm() {
        let requested = RequestedPsm::decode(CPSMS).unwrap();
        assert_eq!(requested.enabled, "1");
        assert_eq!(requested.tau.raw, 0b0110_0000);
        assert_eq!(requested.tau.units, "2 sec");
        assert_eq!(requested.tau.value, 0);
        assert_eq!(requested.active_time.units, "2 sec");
        assert_eq!(requested.active_time.value, 0);
        assert_eq!(RequestedPsm::decode(CPSMS).unwrap(), requested);
    }

    #[test]
    fn test_psm_config_and_network() {
        let config = PsmConfig::decode("+QPSMCFG: 20,4\r\n\r\nOK\r\n").unwrap();
        assert_eq!(config.min_seconds, 20);
        assert_eq!(config.mode, "Rel 12 PSM with context retention");

        let network =
            NetworkPsm::decode("+QPSMS: 1,,,\"4200\",\"60\"\r\n\r\nOK\r\n").unwrap();
        assert_eq!(network.enabled, "1");
        assert_eq!(network.tau, "\"4200\"");
        assert_eq!(network.active_time, "\"60\"");

        assert!(NetworkPsm::decode("+QPSMS: 0\r\nOK\r\n").unwrap_err().is_decode());
    }

    #[test]
    fn test_psm_urc() {
        assert_eq!(
            decode_psm_urc("+QCFG: \"psm/urc\",1\r\n\r\nOK\r\n").unwrap(),
            "1"
        );
    }

    #[test]
    fn test_psm_report_display() {
        let report = PsmReport {
            requested: Some(RequestedPsm::decode(CPSMS).unwrap()),
            urc: Some("0".to_string()),
            ..PsmReport::default()
        };
        assert_eq!(
            report.to_string(),
            "PSM enabled: 1\n\
             TAU requested units: 2 sec\n\
             TAU requested value: 0\n\
             Active time requested units: 2 sec\n\
             Active time requested value: 0\n\
             PSM unsolicited response codes (urc): 0\n"
        );
    }

    #[test]
    fn test_edrx_report() {
        let report = EdrxReport::decode("+CEDRXRDP: 4,\"0010\",\"0011\",\"0101\"\r\nOK\r\n")
            .unwrap()
            .unwrap();
        assert_eq!(report.access_technology, AccessTechnology::LteCatM1);
        assert_eq!(report.requested_cycle, "20.48 sec");
        assert_eq!(report.network_cycle, "40.96 sec");
        assert_eq!(report.paging_time, "7.68 sec");
        assert_eq!(
            report.to_string(),
            "Access technology: LTE CAT M1\n\
             Requested edrx cycle time: 20.48 sec\n\
             Network edrx cycle time: 40.96 sec\n\
             Paging time: 7.68 sec\n"
        );
    }

    #[test]
    fn test_edrx_not_in_use() {
        assert_eq!(EdrxReport::decode("+CEDRXRDP: 0\r\n\r\nOK\r\n").unwrap(), None);
        assert!(EdrxReport::decode("ERROR\r\n").unwrap_err().is_decode());
    }

    #[test]
    fn test_modem_status() {
        let status = ModemStatus::from_responses(
            &Response::new("Quectel\r\nBG96\r\nRevision: BG96MAR02A07M1G\r\n\r\nOK\r\n"),
            &Response::new("+CREG: 0,5\r\n\r\nOK\r\n"),
            &Response::new("+COPS: 0,0,\"AT&T Aeris\",8\r\n\r\nOK\r\n"),
            &Response::new("+CSQ: 99,99\r\n\r\nOK\r\n"),
        );
        assert_eq!(status.identity, "Quectel BG96 Revision: BG96MAR02A07M1G");
        assert_eq!(status.registration, Some("Registered, roaming"));
        assert_eq!(status.operator, "AT&T Aeris");
        assert_eq!(status.signal.and_then(|s| s.dbm()), None);

        let silent = ModemStatus::from_responses(
            &Response::empty(),
            &Response::empty(),
            &Response::empty(),
            &Response::empty(),
        );
        assert_eq!(silent.registration, None);
        assert!(silent.signal.is_none());
        assert!(silent.to_string().contains("Signal: Unknown"));
    }
}

//! Quectel modem client
//!
//! Each operation is a fixed sequence of session commands. Transport errors
//! abort the operation; decode failures only affect the report section they
//! belong to.

use crate::config::{ClientConfig, EdrxSettings, PsmSettings};
use crate::report::{
    decode_psm_urc, EdrxReport, ModemStatus, NetworkPsm, PsmConfig, PsmReport, RequestedPsm,
};
use crate::{ModemError, ModemResult};
use log::{info, warn};
use modem_session::{Response, Session, SessionConfig};
use modem_transport::{ModemTransport, SerialSettings, SerialTransport};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// HTTP GET request sent over the modem socket
pub fn http_request(host: &str) -> String {
    format!("GET / HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n", host)
}

/// High-level operations on one modem session
#[derive(Debug)]
pub struct ModemClient<T: ModemTransport> {
    session: Session<T>,
    config: ClientConfig,
}

impl ModemClient<SerialTransport> {
    /// Open the serial port and wrap it in a client
    pub fn open(
        settings: SerialSettings,
        session_config: SessionConfig,
        config: ClientConfig,
    ) -> ModemResult<Self> {
        Ok(Self::new(
            Session::open_with_config(settings, session_config)?,
            config,
        ))
    }
}

impl<T: ModemTransport> ModemClient<T> {
    pub fn new(session: Session<T>, config: ClientConfig) -> Self {
        Self { session, config }
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Turn off command echo
    pub async fn init_modem(&mut self) -> ModemResult<Response> {
        self.session.send("ATE0").await
    }

    /// Configure the PDP context and activate it if it is not already active
    pub async fn create_packet_session(&mut self) -> ModemResult<()> {
        self.init_modem().await?;
        let ctx = self.config.context_id;
        self.session
            .send(&format!(
                "AT+QICSGP={},1,\"{}\",\"\",\"\",0",
                ctx, self.config.apn
            ))
            .await?;

        // an active context reports "+QIACT: <ctx>,..."
        let state = self.session.send("AT+QIACT?").await?;
        if state.len() < "+QIACT: ".len() {
            self.session.send(&format!("AT+QIACT={}", ctx)).await?;
            self.session.send("AT+QIACT?").await?;
        }
        Ok(())
    }

    /// Identity, registration, operator and signal queries
    pub async fn check_modem(&mut self) -> ModemResult<ModemStatus> {
        self.init_modem().await?;
        let identity = self.session.send("ATI").await?;
        let registration = self.session.send("AT+CREG?").await?;
        let operator = self.session.send("AT+COPS?").await?;
        let signal = self.session.send("AT+CSQ").await?;
        Ok(ModemStatus::from_responses(
            &identity,
            &registration,
            &operator,
            &signal,
        ))
    }

    /// Fetch `/` from `host` over a TCP socket and return the socket read reply
    pub async fn http_get(&mut self, host: &str) -> ModemResult<Response> {
        self.create_packet_session().await?;
        let ctx = self.config.context_id;
        let sock = self.config.socket_id;
        let delay = self.config.socket_delay;

        self.session
            .send_with_delay(&format!("AT+QICLOSE={}", sock), delay)
            .await?;
        self.session
            .send_with_delay(
                &format!("AT+QIOPEN={},{},\"TCP\",\"{}\",80,0,0", ctx, sock, host),
                delay,
            )
            .await?;

        let query = format!("AT+QISTATE=1,{}", sock);
        let state = self.session.send(&query).await?;
        if !state.contains("TCP") {
            info!("Socket {} not reported yet, asking again", sock);
            self.session.send_with_delay(&query, delay).await?;
        }

        let request = http_request(host);
        self.session
            .send_with_payload(&format!("AT+QISEND={},{}", sock, request.len()), request)
            .await?;
        self.session.send(&format!("AT+QISEND={},0", sock)).await?;
        self.session
            .send(&format!("AT+QIRD={},{}", sock, self.config.read_length))
            .await
    }

    /// Ping `host` four times with a four second timeout
    pub async fn icmp_ping(&mut self, host: &str) -> ModemResult<Response> {
        self.create_packet_session().await?;
        let cmd = format!("AT+QPING={},\"{}\",4,4", self.config.context_id, host);
        self.session
            .send_with_delay(&cmd, self.config.ping_delay)
            .await
    }

    /// Resolve `host`; the answer arrives as `+QIURC: "dnsgip"` URCs
    pub async fn dns_lookup(&mut self, host: &str) -> ModemResult<Response> {
        self.create_packet_session().await?;
        let ctx = self.config.context_id;
        self.session.send(&format!("AT+QIDNSCFG={}", ctx)).await?;
        self.session
            .send(&format!("AT+QIDNSGIP={},\"{}\"", ctx, host))
            .await?;
        self.session.wait_for_urc(self.config.dns_wait).await
    }

    /// Query PSM feature, network and requested settings
    pub async fn psm_info(&mut self) -> ModemResult<PsmReport> {
        self.init_modem().await?;

        let reply = self.session.send("AT+QPSMCFG?").await?;
        let config = section("+QPSMCFG", PsmConfig::decode(reply.text()))?;

        let reply = self.session.send("AT+QPSMS?").await?;
        let network = section("+QPSMS", NetworkPsm::decode(reply.text()))?;

        let reply = self.session.send("AT+CPSMS?").await?;
        let requested = section("+CPSMS", RequestedPsm::decode(reply.text()))?;

        let reply = self.session.send("AT+QCFG=\"psm/urc\"").await?;
        let urc = section("+QCFG", decode_psm_urc(reply.text()))?;

        Ok(PsmReport {
            config,
            network,
            requested,
            urc,
        })
    }

    /// Request PSM timers, enable the PSM URC and wait for the modem to enter PSM
    pub async fn psm_enable(&mut self, settings: PsmSettings) -> ModemResult<Response> {
        self.init_modem().await?;
        self.session.send(&settings.command()).await?;
        self.session.send("AT+QCFG=\"psm/urc\",1").await?;
        self.session.wait_for_urc(self.config.psm_wait).await
    }

    /// Enter PSM right after the RRC connection is released
    pub async fn psm_now(&mut self) -> ModemResult<Response> {
        self.init_modem().await?;
        self.session.send("AT+QCFG=\"psm/enter\",1").await?;
        self.session.wait_for_urc(self.config.psm_wait).await
    }

    /// Read requested and network-provided eDRX parameters
    pub async fn edrx_info(&mut self) -> ModemResult<Option<EdrxReport>> {
        self.init_modem().await?;
        self.session.send("AT+CEDRXS?").await?;
        let reply = self.session.send("AT+CEDRXRDP").await?;
        EdrxReport::decode(reply.text())
    }

    pub async fn edrx_enable(&mut self, settings: EdrxSettings) -> ModemResult<Response> {
        self.init_modem().await?;
        self.session.send(&settings.command()).await
    }

    /// Raw passthrough: one AT command per input line until `exit`
    ///
    /// Malformed lines are reported and skipped. The session is closed when
    /// the user types `exit`, the input ends, or an I/O error stops the loop;
    /// the loop's error wins over a close error.
    pub async fn interactive<R, W>(&mut self, input: R, output: W) -> ModemResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let result = self.passthrough(input, output).await;
        let closed = self.session.close().await;
        result?;
        closed
    }

    async fn passthrough<R, W>(&mut self, input: R, mut output: W) -> ModemResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.init_modem().await?;
        output.write_all(b"Enter AT command or type exit\n").await?;
        output.flush().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line == "exit" {
                break;
            }
            if line.is_empty() {
                continue;
            }
            match self.session.send(line).await {
                Ok(response) => {
                    output.write_all(response.text().as_bytes()).await?;
                    if !response.text().ends_with('\n') {
                        output.write_all(b"\n").await?;
                    }
                }
                Err(ModemError::InvalidCommand(msg)) => {
                    output.write_all(format!("{}\n", msg).as_bytes()).await?;
                }
                Err(e) => return Err(e),
            }
            output.flush().await?;
        }
        Ok(())
    }

    pub async fn close(&mut self) -> ModemResult<()> {
        self.session.close().await
    }
}

/// Keep a decode failure local to its report section
fn section<V>(name: &str, decoded: ModemResult<V>) -> ModemResult<Option<V>> {
    match decoded {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_decode() => {
            warn!("Skipping {} section: {}", name, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_request() {
        assert_eq!(
            http_request("example.com"),
            "GET / HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn test_section_keeps_decode_errors_local() {
        assert_eq!(section("x", Ok(1)).unwrap(), Some(1));
        assert_eq!(
            section::<u8>("x", Err(ModemError::decode("missing"))).unwrap(),
            None
        );
        assert!(section::<u8>("x", Err(ModemError::not_connected())).is_err());
    }
}

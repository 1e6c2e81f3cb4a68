//! AT command engine for cellular modems
//!
//! This library drives a modem over its serial AT port: it sends commands,
//! waits for replies or unsolicited result codes, and decodes status fields
//! such as PSM timers and eDRX parameters.
//!
//! # Architecture
//!
//! - `modem-core`: error taxonomy
//! - `modem-transport`: serial and in-memory transports
//! - `modem-session`: command executor, response reader, URC waiter
//! - `modem-decode`: field extraction and bitfield tables
//! - `modem-client`: Quectel operations (PSM, eDRX, sockets, ping, DNS)
//!
//! # Usage
//!
//! ```no_run
//! use modem::session::Session;
//! use modem::transport::SerialSettings;
//!
//! # async fn run() -> modem::ModemResult<()> {
//! let mut session = Session::open(SerialSettings::new("/dev/ttyUSB2", 9600))?;
//! let reply = session.send("AT+CPSMS?").await?;
//! let fields = modem::decode::extract_fields(reply.text(), "+CPSMS:")?;
//! println!("{:?}", fields);
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

pub use modem_core::{ModemError, ModemResult};

pub mod transport {
    pub use modem_transport::*;
}

pub mod session {
    pub use modem_session::*;
}

pub mod decode {
    pub use modem_decode::*;
}

pub mod client {
    pub use modem_client::*;
}

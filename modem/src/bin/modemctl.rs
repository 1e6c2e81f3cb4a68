//! Command-line front end for the modem client

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modem::client::{ClientConfig, EdrxSettings, ModemClient, PsmSettings};
use modem::session::{CompletionStrategy, ReaderConfig, SessionConfig};
use modem::transport::{ModemTransport, SerialSettings};
use std::time::Duration;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Drive a cellular modem over its AT serial port")]
struct Cli {
    /// Serial device of the modem AT port
    #[arg(short, long, default_value = "/dev/ttyUSB2")]
    port: String,

    #[arg(short, long, default_value_t = SerialSettings::DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Access point name for packet sessions
    #[arg(long, default_value = "iot.aer.net")]
    apn: String,

    /// Stop reading a reply after the first burst instead of waiting for a quiet line
    #[arg(long)]
    drain_once: bool,

    /// Silence (ms) that ends a reply
    #[arg(long, default_value_t = 100)]
    quiet_ms: u64,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identity, registration, operator and signal
    Check,
    /// Show PSM configuration and timers
    PsmInfo,
    /// Request PSM timers and wait for the modem to power down
    PsmEnable {
        /// Requested TAU timer byte, as 8 bits
        #[arg(long, default_value = "10100001", value_parser = parse_timer)]
        tau: u8,
        /// Requested Active Time timer byte, as 8 bits
        #[arg(long, default_value = "00011111", value_parser = parse_timer)]
        active_time: u8,
    },
    /// Enter PSM right after RRC release
    PsmNow,
    /// Show requested and network eDRX parameters
    EdrxInfo,
    /// Request eDRX
    EdrxEnable {
        #[arg(long, default_value_t = 2)]
        mode: u8,
        /// Access technology (4 = LTE CAT M1, 5 = LTE CAT NB1)
        #[arg(long, default_value_t = 4)]
        act: u8,
        /// Requested cycle, as 4 bits
        #[arg(long, default_value = "1001", value_parser = parse_timer)]
        cycle: u8,
    },
    /// ICMP ping through the modem
    Ping { host: String },
    /// DNS lookup through the modem
    Dns { host: String },
    /// HTTP GET / over a modem TCP socket
    HttpGet { host: String },
    /// Type raw AT commands, `exit` to quit
    Interactive,
}

fn parse_timer(value: &str) -> std::result::Result<u8, String> {
    modem::decode::parse_bits(value).map_err(|e| e.to_string())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let completion = if cli.drain_once {
        CompletionStrategy::DrainOnce
    } else {
        CompletionStrategy::QuietPeriod(Duration::from_millis(cli.quiet_ms))
    };
    let session_config = SessionConfig::new(ReaderConfig::default().with_completion(completion));
    let client_config = ClientConfig::default().with_apn(cli.apn.clone());

    let mut client = ModemClient::open(
        SerialSettings::new(cli.port.clone(), cli.baud),
        session_config,
        client_config,
    )
    .with_context(|| format!("opening modem on {}", cli.port))?;

    let result = run(&mut client, cli.command, cli.json).await;
    let closed = client.close().await;
    result?;
    closed?;
    Ok(())
}

async fn run<T: ModemTransport>(
    client: &mut ModemClient<T>,
    command: Commands,
    json: bool,
) -> Result<()> {
    match command {
        Commands::Check => {
            let status = client.check_modem().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print!("{}", status);
            }
        }
        Commands::PsmInfo => {
            let report = client.psm_info().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
        Commands::PsmEnable { tau, active_time } => {
            let urc = client.psm_enable(PsmSettings { tau, active_time }).await?;
            println!("{}", urc.text().trim());
        }
        Commands::PsmNow => {
            let urc = client.psm_now().await?;
            println!("{}", urc.text().trim());
        }
        Commands::EdrxInfo => match client.edrx_info().await? {
            Some(report) if json => println!("{}", serde_json::to_string_pretty(&report)?),
            Some(report) => print!("{}", report),
            None => println!("Access technology: None"),
        },
        Commands::EdrxEnable { mode, act, cycle } => {
            let settings = EdrxSettings {
                mode,
                access_technology: act,
                cycle,
            };
            let response = client.edrx_enable(settings).await?;
            println!("{}", response.text().trim());
        }
        Commands::Ping { host } => {
            let response = client.icmp_ping(&host).await?;
            println!("{}", response.text().trim());
        }
        Commands::Dns { host } => {
            let urc = client.dns_lookup(&host).await?;
            println!("{}", urc.text().trim());
        }
        Commands::HttpGet { host } => {
            let response = client.http_get(&host).await?;
            println!("{}", response.text().trim());
        }
        Commands::Interactive => {
            let stdin = BufReader::new(tokio::io::stdin());
            client.interactive(stdin, tokio::io::stdout()).await?;
        }
    }
    Ok(())
}

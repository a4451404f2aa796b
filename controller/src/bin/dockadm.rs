//! Administer remote SFP docking stations and plug devices.

use anyhow::ensure;
use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use dock_controller::Config;
use dock_controller::ConfigBuilder;
use dock_controller::DeviceKind;
use dock_controller::DiscoveryBroadcaster;
use dock_controller::Event;
use dock_controller::SessionManager;
use dock_decode::page::PAGE_SIZE;
use dock_decode::CalibrationMode;
use dock_decode::MemoryPage;
use dock_decode::PageId;
use dock_decode::SfpModule;
use dock_messages::MessageCode;
use dock_messages::ProtocolMessage;
use itertools::Itertools;
use slog::Drain;
use slog::Level;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::path::Path;
use std::path::PathBuf;
use tabled::Table;
use tabled::Tabled;

fn parse_log_level(s: &str) -> Result<Level, String> {
    s.parse().map_err(|_| String::from("invalid log level"))
}

/// Administer remote SFP docking stations and plug devices.
///
/// This tool probes the local broadcast domain for docking stations and
/// plug devices, accepts their sessions, and decodes the SFF-8472 memory
/// maps of docked modules.
#[derive(Parser)]
#[command(version, about, long_about)]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,

    /// The source IP address on which to listen for devices.
    #[arg(short, long, default_value_t = Ipv4Addr::UNSPECIFIED)]
    address: Ipv4Addr,

    /// The port used for sessions and discovery probes.
    #[arg(short, long, default_value_t = dock_messages::PORT)]
    port: u16,

    /// The interface whose broadcast address is used for discovery.
    #[arg(short, long)]
    interface: Option<String>,

    /// The discovery broadcast address, overriding any interface lookup.
    #[arg(short, long)]
    broadcast: Option<Ipv4Addr>,

    /// The log-level.
    #[arg(
        short,
        long,
        default_value_t = Level::Info,
        value_parser = parse_log_level
    )]
    log_level: Level,
}

#[derive(Subcommand)]
enum Cmd {
    /// Broadcast discovery probes and print each device that answers.
    Discover,

    /// Accept device sessions, sending heartbeats and printing events.
    Listen,

    /// Ask a connected docking station to clone its module's memory map.
    Clone {
        /// The address of the docking station.
        addr: String,
    },

    /// Decode a module memory map from raw page dumps.
    Decode {
        /// A file holding the 256 bytes of page 0xA0.
        #[arg(long)]
        a0: PathBuf,

        /// A file holding the 256 bytes of page 0xA2.
        #[arg(long)]
        a2: Option<PathBuf>,
    },
}

fn build_config(args: &Args) -> anyhow::Result<Config> {
    let mut builder =
        ConfigBuilder::new().address(args.address).port(args.port);
    if let Some(interface) = &args.interface {
        builder = builder.interface(interface);
    }
    if let Some(broadcast) = args.broadcast {
        builder = builder.broadcast(broadcast);
    }
    builder.build().context("failed to build controller configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = slog::LevelFilter::new(drain, args.log_level).fuse();
    let log = slog::Logger::root(drain, slog::o!());

    match &args.cmd {
        Cmd::Discover => {
            let config = build_config(&args)?;
            let (broadcaster, mut reply_rx) =
                DiscoveryBroadcaster::new(&config, log).await?;
            tokio::spawn(broadcaster.run());
            while let Some(reply) = reply_rx.recv().await {
                println!("{} {:?}", reply.addr, reply.code);
            }
        }
        Cmd::Listen => {
            let config = build_config(&args)?;
            let (broadcaster, mut reply_rx) =
                DiscoveryBroadcaster::new(&config, log.clone()).await?;
            tokio::spawn(broadcaster.run());
            // Devices connect back over TCP after acknowledging a probe.
            let (manager, mut event_rx) = SessionManager::new(&config, log).await?;
            let mut modules: HashMap<String, SfpModule> = HashMap::new();
            loop {
                tokio::select! {
                    Some(reply) = reply_rx.recv() => {
                        println!("discovered {} {:?}", reply.addr, reply.code);
                    }
                    Some(event) = event_rx.recv() => {
                        print_event(event.clone());
                        handle_event(&manager, &mut modules, event).await?;
                    }
                    else => break,
                }
            }
        }
        Cmd::Clone { addr } => {
            let config = build_config(&args)?;
            let (broadcaster, _reply_rx) =
                DiscoveryBroadcaster::new(&config, log.clone()).await?;
            tokio::spawn(broadcaster.run());
            let (manager, mut event_rx) = SessionManager::new(&config, log).await?;
            wait_for_connection(&mut event_rx, addr).await;
            let request = ProtocolMessage::simple(MessageCode::CloneMemory, "");
            manager.send(addr.clone(), request).await?;
            while let Some(event) = event_rx.recv().await {
                print_event(event.clone());
                if let Event::OperationResult { code, .. } = event {
                    ensure!(
                        code == MessageCode::CloneMemorySuccess,
                        "clone failed with {code:?}"
                    );
                    break;
                }
            }
        }
        Cmd::Decode { a0, a2 } => {
            let a0 = read_page(a0)?;
            let a2 = match a2 {
                Some(path) => read_page(path)?,
                None => MemoryPage::default(),
            };
            let module = SfpModule::new(a0, a2);
            print_identity(&module);
            if module.diagnostics_implemented() {
                print_monitors(&module);
            }
        }
    }
    Ok(())
}

// The register sets requested from a docking station: the identification
// page, the threshold and calibration region of the diagnostics page, and
// its real-time region.
const A0_INIT: RangeInclusive<u8> = 0..=95;
const A2_INIT: RangeInclusive<u8> = 0..=95;
const REAL_TIME: RangeInclusive<u8> = 96..=109;

// The indices a register-data acknowledgement's values correspond to.
fn request_indices(code: MessageCode) -> Option<RangeInclusive<u8>> {
    match code {
        MessageCode::DiagnosticInitA0Ack => Some(A0_INIT),
        MessageCode::DiagnosticInitA2Ack => Some(A2_INIT),
        MessageCode::RealTimeRefreshAck => Some(REAL_TIME),
        _ => None,
    }
}

// Seed a module's pages from docking stations as they connect, printing
// the decoded identity and monitors once the data is in.
async fn handle_event(
    manager: &SessionManager,
    modules: &mut HashMap<String, SfpModule>,
    event: Event,
) -> anyhow::Result<()> {
    match event {
        Event::DeviceConnected { kind: DeviceKind::DockingStation, addr } => {
            let requests = [
                (MessageCode::DiagnosticInitA0, PageId::A0, A0_INIT),
                (MessageCode::DiagnosticInitA2, PageId::A2, A2_INIT),
                (MessageCode::RealTimeRefresh, PageId::A2, REAL_TIME),
            ];
            for (code, page, indices) in requests {
                let message = ProtocolMessage::register_list(
                    code,
                    page.wire_page(),
                    indices.collect(),
                );
                manager.send(addr.clone(), message).await?;
            }
        }
        Event::RegisterData { addr, code, page, values } => {
            let (Some(indices), Some(id)) =
                (request_indices(code), PageId::from_wire_page(page))
            else {
                return Ok(());
            };
            let module = modules
                .entry(addr)
                .or_insert_with(|| SfpModule::new(MemoryPage::default(), MemoryPage::default()));
            module.install(id, indices.zip(values));
            match code {
                MessageCode::DiagnosticInitA0Ack => print_identity(module),
                MessageCode::RealTimeRefreshAck => print_monitors(module),
                _ => {}
            }
        }
        Event::DeviceDisconnected { addr, .. }
        | Event::DeviceUnresponsive { addr } => {
            modules.remove(&addr);
        }
        _ => {}
    }
    Ok(())
}

async fn wait_for_connection(
    event_rx: &mut tokio::sync::mpsc::Receiver<Event>,
    addr: &str,
) {
    while let Some(event) = event_rx.recv().await {
        print_event(event.clone());
        if matches!(&event, Event::DeviceConnected { addr: a, .. } if a == addr) {
            return;
        }
    }
}

fn print_event(event: Event) {
    match event {
        Event::DeviceConnected { kind, addr } => {
            println!("connected {addr} ({kind:?})");
        }
        Event::DeviceDisconnected { kind, addr } => {
            println!("disconnected {addr} ({kind:?})");
        }
        Event::RegisterData { addr, code, page, values } => {
            let hex = values.iter().map(|b| format!("0x{b:02x}")).join(",");
            println!("registers {addr} {code:?} page=0x{page:02x} [{hex}]");
        }
        Event::OperationResult { addr, code } => {
            println!("result {addr} {code:?}");
        }
        Event::RemoteIoError { addr, text } => {
            println!("I/O error {addr}: {text}");
        }
        Event::DeviceUnresponsive { addr } => {
            println!("unresponsive {addr}");
        }
    }
}

// Read one raw 256-byte page dump.
fn read_page(path: &Path) -> anyhow::Result<MemoryPage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read page from {}", path.display()))?;
    ensure!(
        bytes.len() == PAGE_SIZE,
        "page dump {} is {} bytes, expected {PAGE_SIZE}",
        path.display(),
        bytes.len(),
    );
    let mut page = [0u8; PAGE_SIZE];
    page.copy_from_slice(&bytes);
    Ok(MemoryPage::from(page))
}

#[derive(Tabled)]
struct Row {
    field: &'static str,
    value: String,
}

impl Row {
    fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self { field, value: value.into() }
    }
}

fn print_identity(module: &SfpModule) {
    let oui = module.vendor_oui();
    let rows = vec![
        Row::new("Identifier", module.identifier().to_string()),
        Row::new("Extended identifier", module.extended_identifier()),
        Row::new("Connector", module.connector_type().to_string()),
        Row::new("Compliance", module.transceiver_compliance().join(", ")),
        Row::new("Encoding", module.encoding()),
        Row::new(
            "Signaling rate",
            format!("{} MBd", u32::from(module.signaling_rate_nominal()) * 100),
        ),
        Row::new("Rate identifier", module.rate_identifier()),
        Row::new("Vendor", module.vendor_name()),
        Row::new(
            "Vendor OUI",
            format!("{:02x}:{:02x}:{:02x}", oui[0], oui[1], oui[2]),
        ),
        Row::new("Part number", module.vendor_part_number()),
        Row::new("Revision", module.vendor_revision()),
        Row::new("Serial number", module.vendor_serial_number()),
        Row::new("Date code", module.date_code()),
        Row::new("Wavelength", format!("{} nm", module.wavelength())),
        Row::new("Extended compliance", module.extended_compliance()),
        Row::new("Enhanced options", module.enhanced_options().join(", ")),
        Row::new("SFF-8472 revision", module.sff8472_revision()),
        Row::new(
            "Checksums",
            if module.checksums_consistent() { "consistent" } else { "INCONSISTENT" },
        ),
        Row::new("Calibration", format!("{:?}", module.calibration_mode())),
    ];
    println!("{}", Table::new(rows));
}

fn print_monitors(module: &SfpModule) {
    if module.calibration_mode() == CalibrationMode::Unknown {
        println!("diagnostics present but calibration is undetermined");
        return;
    }
    let reading = |result: Result<f64, dock_decode::Error>, units: &str| match result {
        Ok(value) => format!("{value:.4} {units}"),
        Err(e) => e.to_string(),
    };
    let rows = vec![
        Row::new("Temperature", reading(module.temperature(), "C")),
        Row::new("Supply voltage", reading(module.supply_voltage(), "V")),
        Row::new("Tx bias current", reading(module.tx_bias_current(), "mA")),
        Row::new("Tx power", reading(module.tx_power(), "uW")),
        Row::new("Rx power", reading(module.rx_power(), "uW")),
        Row::new("Laser temperature", reading(module.laser_temperature(), "C")),
        Row::new("TEC current", reading(module.tec_current(), "mA")),
    ];
    println!("{}", Table::new(rows));
}

#[cfg(test)]
mod tests {
    use super::read_page;
    use dock_decode::page::PAGE_SIZE;
    use std::io::Write;

    #[test]
    fn test_read_page() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xabu8; PAGE_SIZE]).unwrap();
        let page = read_page(file.path()).unwrap();
        assert_eq!(page.get(0), 0xab);
        assert_eq!(page.get(255), 0xab);

        file.write_all(&[0u8; 1]).unwrap();
        assert!(read_page(file.path()).is_err());
    }
}

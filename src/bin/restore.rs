//! Restore a container file onto an Alinco DJ-X100's channel memory.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use djx100_memtool::confirm::StdinConfirm;
use djx100_memtool::container::ContainerError;
use djx100_memtool::device::protocol::DEFAULT_BAUD_RATE;
use djx100_memtool::device::{DeviceError, DeviceSession, MemoryRegion};
use djx100_memtool::restore::{self, RestoreError, RestoreOptions};
use djx100_memtool::serial::SerialLink;

#[derive(Parser, Debug)]
#[command(name = "djx100-restore")]
#[command(about = "Alinco DJ-X100 **Unofficial** Memory Restore Tool")]
#[command(version)]
struct Args {
    /// Input file name
    #[arg(short, long)]
    input: PathBuf,

    /// Serial port name
    #[arg(short, long)]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baudrate: u32,

    /// Skip the CRC integrity check for the input file
    #[arg(long)]
    skip_crc_check: bool,

    /// Skip the device firmware version check
    #[arg(long)]
    skip_version_check: bool,
}

#[tokio::main]
async fn main() {
    env_logger::builder()
        .format_timestamp(None)
        .format_target(false)
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let file = match File::open(&args.input) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            eprintln!(
                "Error: The file '{}' does not exist. Please check the file name and try again.",
                args.input.display()
            );
            process::exit(1);
        }
        Err(e) => {
            eprintln!(
                "Error: {}. Could not open the file '{}' for reading. Please check the file permissions.",
                e,
                args.input.display()
            );
            process::exit(1);
        }
    };

    let options = RestoreOptions {
        skip_version_check: args.skip_version_check,
        skip_crc_check: args.skip_crc_check,
        allow_unsafe_region: false,
    };

    let port = args.port.clone();
    let baudrate = args.baudrate;
    let open_session = move || SerialLink::open(&port, baudrate).map(DeviceSession::new);

    let mut confirm = StdinConfirm;
    let result = restore::run(
        file,
        MemoryRegion::channel_memory(),
        open_session,
        &options,
        &mut confirm,
        |page, total| {
            print!("Restoring memory: {}/{}\r", page, total);
            let _ = io::stdout().flush();
        },
    )
    .await;

    match result {
        Ok(_) => {
            println!("\nMemory restore complete. Device has been restarted.");
        }
        Err(RestoreError::Aborted) => {
            println!("Aborted.");
        }
        Err(e) => {
            report_error(&e, &args.port);
            process::exit(1);
        }
    }
}

fn report_error(err: &RestoreError, port: &str) {
    match err {
        RestoreError::Serial(e) => {
            eprintln!(
                "Error: {}. Could not open port '{}'. Please check the port name and try again.",
                e, port
            );
        }
        _ => eprintln!("Error: {}", err),
    }

    match err {
        RestoreError::Device(DeviceError::FirmwareMismatch(_)) => {
            eprintln!(
                "If you want to skip the firmware version check, \
                 add --skip-version-check to the command line options."
            );
        }
        RestoreError::Container(ContainerError::ChecksumMismatch { .. }) => {
            eprintln!(
                "If you want to skip the CRC check, you can specify the \
                 --skip-crc-check option on the command line."
            );
        }
        _ => {}
    }
}

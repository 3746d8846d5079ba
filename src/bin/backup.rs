//! Back up the channel memory of an Alinco DJ-X100 to a container file.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use djx100_memtool::backup::{self, BackupError, BackupOptions};
use djx100_memtool::confirm::{Confirm, StdinConfirm};
use djx100_memtool::device::protocol::DEFAULT_BAUD_RATE;
use djx100_memtool::device::{DeviceError, DeviceSession, MemoryRegion};
use djx100_memtool::serial::SerialLink;

#[derive(Parser, Debug)]
#[command(name = "djx100-backup")]
#[command(about = "Alinco DJ-X100 **Unofficial** Memory Backup Tool")]
#[command(version)]
struct Args {
    /// Output file name
    #[arg(short, long)]
    output: PathBuf,

    /// Serial port name
    #[arg(short, long)]
    port: String,

    /// Overwrite the output file without confirmation
    #[arg(short, long)]
    force: bool,

    /// Baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baudrate: u32,

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

    let link = match SerialLink::open(&args.port, args.baudrate) {
        Ok(link) => link,
        Err(e) => {
            eprintln!(
                "Error: {}. Could not open port '{}'. Please check the port name and try again.",
                e, args.port
            );
            process::exit(1);
        }
    };
    let mut session = DeviceSession::new(link);

    let options = BackupOptions {
        skip_version_check: args.skip_version_check,
    };

    let output = args.output.clone();
    let force = args.force;
    let open_sink = move || {
        if !force && output.exists() {
            let prompt = format!(
                "The file '{}' already exists. Do you want to overwrite it? (y/N): ",
                output.display()
            );
            if !StdinConfirm.confirm(&prompt)? {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "overwrite declined",
                ));
            }
        }
        File::create(&output)
    };

    let progressed = Cell::new(false);
    let result = backup::run(
        &mut session,
        MemoryRegion::channel_memory(),
        open_sink,
        &options,
        |page, total| {
            progressed.set(true);
            print!("\rReading memory page {} of {}", page, total);
            let _ = io::stdout().flush();
        },
    )
    .await;

    match result {
        Ok(_) => {
            println!(
                "\nMemory backup completed successfully. Saved to: {}",
                args.output.display()
            );
        }
        Err(BackupError::CreateOutput(e)) if e.kind() == io::ErrorKind::Interrupted => {
            println!("Aborted.");
        }
        Err(BackupError::CreateOutput(e)) => {
            eprintln!(
                "Error: {}. Could not open the file '{}' for writing. Please check the file permissions.",
                e,
                args.output.display()
            );
            process::exit(1);
        }
        Err(e) => {
            if progressed.get() {
                println!();
            }
            report_error(&e);
            process::exit(1);
        }
    }
}

fn report_error(err: &BackupError) {
    eprintln!("Error: {}", err);
    if matches!(
        err,
        BackupError::Device(DeviceError::FirmwareMismatch(_))
    ) {
        eprintln!(
            "If you want to skip the firmware version check, \
             add --skip-version-check to the command line options."
        );
    }
}

//! Read command implementation

use indicatif::{ProgressBar, ProgressStyle};
use qspictl_core::bus::{BusAttachment, DataLines, QuadModeHooks};
use qspictl_core::protocol;
use qspictl_core::transport::SpiTransport;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Default chunk size for reading (4 KiB)
const READ_CHUNK_SIZE: usize = 4096;

/// Run the read command
///
/// The device is switched to quad mode once, read in chunks, then switched
/// back, so a long read costs two status register writes.
pub fn run_read<T, H>(
    bus: &mut BusAttachment<T, H>,
    addr: u32,
    length: usize,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>>
where
    T: SpiTransport,
    H: QuadModeHooks<T>,
{
    if bus.data_lines() != DataLines::Four {
        return Err(format!("{} is not wired for quad reads", bus.name()).into());
    }
    // Checked before allocating the buffer
    protocol::check_quad_read_range(addr, length)
        .map_err(|e| format!("Cannot read {} bytes at 0x{:06X}: {}", length, addr, e))?;

    let mut data = vec![0u8; length];

    let pb = ProgressBar::new(length as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    if let Err(e) =
        bus.read_quad_with_progress(addr, &mut data, READ_CHUNK_SIZE, |n| pb.inc(n as u64))
    {
        pb.abandon();
        return Err(e.into());
    }
    pb.finish_with_message("Read complete");

    let mut file = File::create(output)?;
    file.write_all(&data)?;

    println!("Wrote {} bytes to {:?}", data.len(), output);
    Ok(())
}

//! spidev transport
//!
//! Every [`SpiCommand`] becomes one `SPI_IOC_MESSAGE` with chip select held
//! across it: a single-width transfer carrying opcode, address, dummy bytes
//! and write data, then (for reads) a receive transfer whose width follows
//! the command's I/O mode.

use crate::config::LinuxSpiConfig;
use crate::error::{LinuxSpiError, Result};

use qspictl_core::error::{Error as CoreError, Result as CoreResult};
use qspictl_core::spi::{check_io_mode_supported, SpiCommand};
use qspictl_core::transport::{SpiTransport, TransportFeatures};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Kernel spidev buffer size parameter
const BUF_SIZE_SYSFS: &str = "/sys/module/spidev/parameters/bufsiz";

/// Largest opcode + address + dummy header we send
const MAX_HEADER_LEN: usize = 5;

/// `SPI_RX_QUAD` mode flag from `<linux/spi/spi.h>`
const SPI_RX_QUAD: u32 = 0x800;

mod ioctl {
    use nix::ioctl_write_ptr;

    pub const SPI_IOC_MAGIC: u8 = b'k';

    ioctl_write_ptr!(spi_ioc_wr_bits_per_word, SPI_IOC_MAGIC, 3, u8);
    ioctl_write_ptr!(spi_ioc_wr_max_speed_hz, SPI_IOC_MAGIC, 4, u32);
    ioctl_write_ptr!(spi_ioc_wr_mode32, SPI_IOC_MAGIC, 5, u32);

    /// SPI_IOC_MESSAGE(n)
    pub fn spi_ioc_message(n: usize) -> nix::sys::ioctl::ioctl_num_type {
        nix::request_code_write!(
            SPI_IOC_MAGIC,
            0,
            n * std::mem::size_of::<super::SpiIocTransfer>()
        )
    }
}

/// Kernel `struct spi_ioc_transfer`
#[repr(C)]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    pad: u8,
}

/// Describe one exchange as spidev transfers
///
/// A zero `tx_nbits`/`rx_nbits` would let the kernel pick; the widths are
/// always spelled out so a quad receive can never silently run single.
fn build_transfers(tx: &[u8], rx: &mut [u8], rx_nbits: u8, speed_hz: u32) -> Vec<SpiIocTransfer> {
    let mut transfers = vec![SpiIocTransfer {
        tx_buf: tx.as_ptr() as u64,
        len: tx.len() as u32,
        speed_hz,
        bits_per_word: 8,
        tx_nbits: 1,
        ..Default::default()
    }];
    if !rx.is_empty() {
        transfers.push(SpiIocTransfer {
            rx_buf: rx.as_mut_ptr() as u64,
            len: rx.len() as u32,
            speed_hz,
            bits_per_word: 8,
            rx_nbits,
            ..Default::default()
        });
    }
    transfers
}

/// Linux spidev transport
pub struct LinuxSpi {
    file: File,
    path: String,
    buf_size: usize,
    speed_hz: u32,
    quad: bool,
}

impl LinuxSpi {
    /// Open a spidev device with the given configuration
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxSpiError::NoDevice);
        }

        log::debug!("linux_spi: opening {}", config.device);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|source| LinuxSpiError::OpenFailed {
                path: config.device.clone(),
                source,
            })?;
        let fd = file.as_raw_fd();

        let mut mode = config.mode as u32;
        if config.quad {
            mode |= SPI_RX_QUAD;
        }
        // SAFETY: fd is an open spidev descriptor and the pointee outlives the call
        unsafe { ioctl::spi_ioc_wr_mode32(fd, &mode) }.map_err(|e| {
            LinuxSpiError::SetModeFailed {
                mode,
                source: e.into(),
            }
        })?;

        let bits: u8 = 8;
        // SAFETY: as above
        unsafe { ioctl::spi_ioc_wr_bits_per_word(fd, &bits) }.map_err(|e| {
            LinuxSpiError::SetBitsPerWordFailed {
                bits,
                source: e.into(),
            }
        })?;

        let speed = config.speed_hz;
        // SAFETY: as above
        unsafe { ioctl::spi_ioc_wr_max_speed_hz(fd, &speed) }.map_err(|e| {
            LinuxSpiError::SetSpeedFailed {
                speed,
                source: e.into(),
            }
        })?;

        let buf_size = kernel_buf_size();
        log::info!(
            "linux_spi: opened {} (mode={}, speed={} kHz, quad={})",
            config.device,
            config.mode,
            speed / 1000,
            config.quad
        );
        log::debug!("linux_spi: kernel buffer size {} bytes", buf_size);

        Ok(Self {
            file,
            path: config.device.clone(),
            buf_size,
            speed_hz: speed,
            quad: config.quad,
        })
    }

    /// Open a device with default settings
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&LinuxSpiConfig::new(device))
    }

    /// Device path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current clock speed in Hz
    pub fn speed_hz(&self) -> u32 {
        self.speed_hz
    }

    fn transfer(&mut self, tx: &[u8], rx: &mut [u8], rx_nbits: u8) -> Result<()> {
        let len = tx.len().max(rx.len());
        if len > self.buf_size {
            return Err(LinuxSpiError::TooLong {
                len,
                max: self.buf_size,
            });
        }

        let transfers = build_transfers(tx, rx, rx_nbits, self.speed_hz);
        let request = ioctl::spi_ioc_message(transfers.len());
        // SAFETY: the transfer array and the buffers it points to stay
        // borrowed until the ioctl returns
        let ret = unsafe { libc::ioctl(self.file.as_raw_fd(), request, transfers.as_ptr()) };
        if ret < 0 {
            return Err(LinuxSpiError::TransferFailed(std::io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl SpiTransport for LinuxSpi {
    fn features(&self) -> TransportFeatures {
        if self.quad {
            TransportFeatures::QUAD_IN
        } else {
            TransportFeatures::empty()
        }
    }

    fn max_read_len(&self) -> usize {
        self.buf_size.saturating_sub(MAX_HEADER_LEN)
    }

    fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> CoreResult<()> {
        check_io_mode_supported(cmd.io_mode, self.features())?;

        let header_len = cmd.header_len();
        let mut tx = vec![0u8; header_len + cmd.write_data.len()];
        cmd.encode_header(&mut tx);
        tx[header_len..].copy_from_slice(cmd.write_data);

        let rx_nbits = cmd.io_mode.data_lines();
        self.transfer(&tx, cmd.read_buf, rx_nbits).map_err(|e| {
            log::debug!("linux_spi: opcode 0x{:02X}: {}", cmd.opcode, e);
            CoreError::Transport
        })
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(us as u64));
    }
}

/// Read the spidev buffer size from sysfs, falling back to the page size
fn kernel_buf_size() -> usize {
    match std::fs::read_to_string(BUF_SIZE_SYSFS) {
        Ok(content) => match content.trim().parse::<usize>() {
            Ok(size) if size > 0 => return size,
            _ => log::warn!("linux_spi: invalid buffer size in {}", BUF_SIZE_SYSFS),
        },
        Err(_) => log::debug!("linux_spi: cannot read {}, using page size", BUF_SIZE_SYSFS),
    }

    // SAFETY: sysconf has no preconditions
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page_size > 0 {
        page_size as usize
    } else {
        4096
    }
}

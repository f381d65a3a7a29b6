//! Attached flash device

use super::QuadModeHooks;
use crate::error::{Error, Result};
use crate::protocol;
use crate::transport::{SpiTransport, TransportFeatures};
use maybe_async::maybe_async;

/// Maximum length of an attachment name in bytes
pub const MAX_NAME_LEN: usize = 16;

/// Wire mode the device was last left in by its attachment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WireMode {
    /// Single-wire operation, quad disabled
    #[default]
    Single,
    /// Quad-wire operation, quad enabled
    Quad,
    /// A transition failed part way; re-query the device
    Unknown,
}

/// Number of data lines the device is wired with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLines {
    /// Standard SPI
    One,
    /// Dual SPI
    Two,
    /// Quad SPI
    Four,
}

impl DataLines {
    /// Number of lines
    pub const fn count(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }

    /// Convert a line count, if it is a valid width
    pub const fn from_count(lines: u8) -> Option<Self> {
        match lines {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            4 => Some(Self::Four),
            _ => None,
        }
    }
}

/// A flash device attached to a bus with its quad mode hooks
pub struct BusAttachment<T, H> {
    name: heapless::String<MAX_NAME_LEN>,
    transport: T,
    hooks: H,
    data_lines: DataLines,
    mode: WireMode,
}

impl<T: SpiTransport, H: QuadModeHooks<T>> BusAttachment<T, H> {
    /// Attach a device under `name`
    ///
    /// A four-line attachment requires a transport that can clock quad data
    /// phases. The device is assumed to start in single mode; the hooks are
    /// not called here.
    pub fn attach(name: &str, transport: T, data_lines: DataLines, hooks: H) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        let mut dev_name = heapless::String::new();
        dev_name.push_str(name).map_err(|_| Error::InvalidName)?;

        if data_lines == DataLines::Four
            && !transport.features().intersects(TransportFeatures::QUAD)
        {
            log::error!("{}: transport has no quad support", name);
            return Err(Error::IoModeNotSupported);
        }

        log::info!("attached {} ({} data lines)", name, data_lines.count());
        Ok(Self {
            name: dev_name,
            transport,
            hooks,
            data_lines,
            mode: WireMode::Single,
        })
    }
}

impl<T, H> BusAttachment<T, H> {
    /// Device name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wired data line count
    pub fn data_lines(&self) -> DataLines {
        self.data_lines
    }

    /// Wire mode the device was last left in
    pub fn wire_mode(&self) -> WireMode {
        self.mode
    }

    /// Borrow the transport for transfers outside the quad helpers
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Detach, returning the transport and hooks
    pub fn into_parts(self) -> (T, H) {
        (self.transport, self.hooks)
    }
}

#[maybe_async]
impl<T: SpiTransport, H: QuadModeHooks<T>> BusAttachment<T, H> {
    /// Run the enter hook ahead of a sequence of quad transfers
    pub async fn begin_quad(&mut self) -> Result<()> {
        if self.data_lines != DataLines::Four {
            return Err(Error::IoModeNotSupported);
        }
        match self.hooks.enter_quad(&mut self.transport).await {
            Ok(()) => {
                self.mode = WireMode::Quad;
                Ok(())
            }
            Err(e) => {
                self.mode = WireMode::Unknown;
                log::warn!("{}: enter quad failed: {}", self.name, e);
                Err(e)
            }
        }
    }

    /// Run the exit hook after a sequence of quad transfers
    pub async fn end_quad(&mut self) -> Result<()> {
        if self.data_lines != DataLines::Four {
            return Err(Error::IoModeNotSupported);
        }
        match self.hooks.exit_quad(&mut self.transport).await {
            Ok(()) => {
                self.mode = WireMode::Single;
                Ok(())
            }
            Err(e) => {
                self.mode = WireMode::Unknown;
                log::warn!("{}: exit quad failed: {}", self.name, e);
                Err(e)
            }
        }
    }

    /// Read `buf.len()` bytes at `addr` as one complete quad sequence
    ///
    /// Brackets a quad output read with [`begin_quad`](Self::begin_quad) and
    /// [`end_quad`](Self::end_quad). The exit hook runs even if the read
    /// fails; the read error takes precedence.
    pub async fn read_quad(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        let len = buf.len();
        self.read_quad_with_progress(addr, buf, len, |_| {}).await
    }

    /// Like [`read_quad`](Self::read_quad), reporting each completed
    /// `chunk_len` slice to `progress`
    ///
    /// The enter and exit hooks run once for the whole buffer. A range that
    /// does not fit the 3-byte address space is rejected before the enter
    /// hook runs.
    pub async fn read_quad_with_progress<F: FnMut(usize)>(
        &mut self,
        addr: u32,
        buf: &mut [u8],
        chunk_len: usize,
        mut progress: F,
    ) -> Result<()> {
        protocol::check_quad_read_range(addr, buf.len())?;

        self.begin_quad().await?;
        let read = self.read_chunks(addr, buf, chunk_len, &mut progress).await;
        let exit = self.end_quad().await;

        match read {
            Ok(()) => exit,
            Err(e) => {
                if let Err(exit_err) = exit {
                    log::warn!("{}: exit after failed read: {}", self.name, exit_err);
                }
                Err(e)
            }
        }
    }

    async fn read_chunks<F: FnMut(usize)>(
        &mut self,
        addr: u32,
        buf: &mut [u8],
        chunk_len: usize,
        progress: &mut F,
    ) -> Result<()> {
        let mut chunk_addr = addr;
        for chunk in buf.chunks_mut(chunk_len.max(1)) {
            protocol::read_quad_out(&mut self.transport, chunk_addr, chunk).await?;
            progress(chunk.len());
            // Range already checked against the whole buffer
            chunk_addr += chunk.len() as u32;
        }
        Ok(())
    }
}

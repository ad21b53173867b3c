//! MCP3208 Command Framing
//!
//! The converter speaks a 3-byte exchange per sample: the host sends
//! `[start, single-ended | channel, padding]` and the low 12 bits of the
//! reply carry the conversion. Only the framing lives here; the byte
//! transport (SPI device node, vendor library, test double) comes in via
//! `SpiTransport`.

use crate::error::PlatformError;
use crate::traits::{AdcChannel, SpiTransport};

/// Start bit, first command byte
const START: u8 = 0x01;
/// Single-ended mode flag in the second command byte
const SINGLE_ENDED: u8 = 0x80;
/// Channels available on the chip
const CHANNEL_COUNT: u8 = 8;

/// 12-bit SPI ADC behind any byte transport
pub struct Mcp3208<T: SpiTransport> {
    transport: T,
}

impl<T: SpiTransport> Mcp3208<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Consume the adapter and hand the transport back
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Command frame addressing `channel`
    fn command(channel: u8) -> [u8; 3] {
        [START, SINGLE_ENDED | (channel << 4), 0x00]
    }
}

impl<T: SpiTransport> AdcChannel for Mcp3208<T> {
    fn read_sample(&mut self, channel: u8) -> Result<u16, PlatformError> {
        if channel >= CHANNEL_COUNT {
            return Err(PlatformError::NoSuchChannel(channel));
        }

        let tx = Self::command(channel);
        let mut rx = [0u8; 3];
        self.transport.transfer(&tx, &mut rx)?;

        Ok((u16::from(rx[1] & 0x0F) << 8) | u16::from(rx[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Transport double that records commands and replays canned replies
    struct FakeSpi {
        sent: Vec<[u8; 3]>,
        reply: [u8; 3],
        fail: bool,
    }

    impl FakeSpi {
        fn replying(reply: [u8; 3]) -> Self {
            Self {
                sent: Vec::new(),
                reply,
                fail: false,
            }
        }
    }

    impl SpiTransport for FakeSpi {
        fn transfer(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<(), PlatformError> {
            if self.fail {
                return Err(PlatformError::Transport("bus stuck".into()));
            }
            self.sent.push([tx[0], tx[1], tx[2]]);
            rx.copy_from_slice(&self.reply);
            Ok(())
        }
    }

    #[test]
    fn test_command_framing_per_channel() {
        // Channel codes 0x80, 0x90, 0xa0, 0xb0 for channels 0..4
        let mut adc = Mcp3208::new(FakeSpi::replying([0, 0, 0]));
        for ch in 0..4 {
            adc.read_sample(ch).unwrap();
        }

        let spi = adc.into_transport();
        assert_eq!(spi.sent[0], [0x01, 0x80, 0x00]);
        assert_eq!(spi.sent[1], [0x01, 0x90, 0x00]);
        assert_eq!(spi.sent[2], [0x01, 0xa0, 0x00]);
        assert_eq!(spi.sent[3], [0x01, 0xb0, 0x00]);
    }

    #[test]
    fn test_twelve_bit_extraction() {
        // Reply high nibble beyond bit 11 must be masked off
        let mut adc = Mcp3208::new(FakeSpi::replying([0xff, 0xfa, 0xce]));
        assert_eq!(adc.read_sample(0).unwrap(), 0xace);

        let mut adc = Mcp3208::new(FakeSpi::replying([0x00, 0x0f, 0xff]));
        assert_eq!(adc.read_sample(0).unwrap(), 4095);
    }

    #[test]
    fn test_invalid_channel_rejected() {
        let mut adc = Mcp3208::new(FakeSpi::replying([0, 0, 0]));
        assert!(matches!(
            adc.read_sample(8),
            Err(PlatformError::NoSuchChannel(8))
        ));
    }

    #[test]
    fn test_transport_error_propagates() {
        let mut spi = FakeSpi::replying([0, 0, 0]);
        spi.fail = true;
        let mut adc = Mcp3208::new(spi);
        assert!(matches!(
            adc.read_sample(0),
            Err(PlatformError::Transport(_))
        ));
    }
}

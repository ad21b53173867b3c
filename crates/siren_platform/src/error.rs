//! Platform Error Types

use thiserror::Error;

/// Errors from the hardware-facing layer
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("ADC transport failed: {0}")]
    Transport(String),

    #[error("Channel {0} does not exist on this ADC")]
    NoSuchChannel(u8),

    #[error("Hardware initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Replay source exhausted")]
    ReplayExhausted,

    #[error("Replay source unreadable: {0}")]
    ReplayDecode(String),

    #[error("Replay source has {got} channels, need {need}")]
    ReplayChannelMismatch { need: usize, got: usize },

    #[error("Indicator update failed: {0}")]
    Indicator(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlatformError::Transport("SPI transfer timed out".into());
        assert!(err.to_string().contains("SPI transfer"));

        let err = PlatformError::NoSuchChannel(7);
        assert!(err.to_string().contains('7'));
    }
}

//! Inbound commands to the application service.

/// Indicator selection written by the central to the LED characteristic.
///
/// `1` red, `2` green, `3` blue; any other byte switches all three off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedCommand {
    #[default]
    Off,
    Red,
    Green,
    Blue,
}

impl LedCommand {
    pub const fn from_byte(raw: u8) -> Self {
        match raw {
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Blue,
            _ => Self::Off,
        }
    }

    /// `(red, green, blue)` channels to light.
    pub const fn channels(self) -> (bool, bool, bool) {
        match self {
            Self::Off => (false, false, false),
            Self::Red => (true, false, false),
            Self::Green => (false, true, false),
            Self::Blue => (false, false, true),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Off => "LEDs off",
            Self::Red => "Red LED on",
            Self::Green => "Green LED on",
            Self::Blue => "Blue LED on",
        }
    }
}

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    SetIndicator(LedCommand),
}

impl AppCommand {
    /// Interpret a raw LED characteristic write.
    pub const fn from_led_write(raw: u8) -> Self {
        Self::SetIndicator(LedCommand::from_byte(raw))
    }
}

//! SSD1306 transport over I2C
//!
//! Driver for 128x64 SSD1306 controllers in horizontal addressing mode.
//! Every I2C transfer starts with a control byte: `0x00` for a run of
//! commands, `0x40` for display RAM data. Transfers are split so no single
//! write carries more than [`I2cConfig::max_chunk`] payload bytes.

use oledmenu_hal::i2c::I2cConfig;
use oledmenu_hal::I2cBus;

use crate::backend::DisplayTransport;

/// Control byte preceding a command run
const CONTROL_COMMAND: u8 = 0x00;

/// Control byte preceding display RAM data
const CONTROL_DATA: u8 = 0x40;

/// SSD1306 commands
#[allow(dead_code)]
pub mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_PAGE_START: u8 = 0xB0;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_ADDRESSING_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
}

/// Power-up register sequence, ending with the display switched on
pub const INIT_SEQUENCE: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_LOW_COLUMN,
    cmd::SET_HIGH_COLUMN,
    cmd::SET_START_LINE,
    cmd::SET_PAGE_START,
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_SEG_REMAP,    // Flip horizontally
    cmd::SET_MUX_RATIO,
    0x3F, // 64 lines
    cmd::SET_COM_SCAN_DEC, // Flip vertically
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_CLOCK_DIV,
    0x80,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::SET_CHARGE_PUMP,
    0x14, // Enable charge pump
    cmd::SET_NORMAL,
    cmd::SET_ADDRESSING_MODE,
    0x00, // Horizontal
    cmd::DISPLAY_ON,
];

/// SSD1306 on an I2C bus
pub struct Ssd1306<I2C> {
    i2c: I2C,
    config: I2cConfig,
}

impl<I2C: I2cBus> Ssd1306<I2C> {
    /// Create a transport with the default address and chunk size
    pub fn new(i2c: I2C) -> Self {
        Self::with_config(i2c, I2cConfig::default())
    }

    pub fn with_config(i2c: I2C, config: I2cConfig) -> Self {
        Self { i2c, config }
    }

    pub fn config(&self) -> I2cConfig {
        self.config
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_chunked(&mut self, control: u8, payload: &[u8]) -> Result<(), I2C::Error> {
        let max = self.config.max_chunk.max(1);
        let mut packet = [0u8; 33];
        for chunk in payload.chunks(max.min(packet.len() - 1)) {
            packet[0] = control;
            packet[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c.write(self.config.address, &packet[..=chunk.len()])?;
        }
        Ok(())
    }
}

impl<I2C: I2cBus> DisplayTransport for Ssd1306<I2C> {
    type Error = I2C::Error;

    fn write_register_sequence(&mut self, registers: &[u8]) -> Result<(), Self::Error> {
        self.write_chunked(CONTROL_COMMAND, registers)
    }

    fn write_pixel_block(&mut self, pixels: &[u8]) -> Result<(), Self::Error> {
        self.write_chunked(CONTROL_DATA, pixels)
    }
}

extern crate rppal;
extern crate std;

use crate::config;
use crate::layout;
use crate::result;

/// A two-row sixteen-column character surface. `render` replaces both rows;
/// `cleanup` blanks the surface and releases the device.
pub trait Screen {
    fn render(&mut self, line1: &str, line2: &str) -> result::SubsignResult<()>;
    fn cleanup(&mut self) -> result::SubsignResult<()>;
}

pub fn create_screen(config: &config::Config) -> result::SubsignResult<Box<dyn Screen>> {
    if config.use_console {
        return Ok(Box::new(ConsoleScreen{}));
    }
    return Ok(Box::new(LcdScreen::new(config.lcd_address)?));
}

// HD44780 wired through a PCF8574 I2C backpack. The expander's low nibble
// carries the control bits, the high nibble carries half a data byte.
const LCD_RS: u8 = 0x01;
const LCD_ENABLE: u8 = 0x04;
const LCD_BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06; // cursor moves right, no shift
const CMD_DISPLAY_OFF: u8 = 0x08;
const CMD_DISPLAY_ON: u8 = 0x0C; // display on, cursor off, blink off
const CMD_FUNCTION_SET: u8 = 0x28; // 4-bit bus, 2 lines, 5x8 font
const CMD_SET_DDRAM_ADDR: u8 = 0x80;

const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

pub struct LcdScreen {
    i2c: rppal::i2c::I2c,
}

impl LcdScreen {
    pub fn new(address: u16) -> result::SubsignResult<LcdScreen> {
        let mut i2c = rppal::i2c::I2c::new()?;
        i2c.set_slave_address(address)?;

        let mut lcd = LcdScreen{i2c: i2c};
        lcd.init()?;
        info!("LCD initialized at I2C address 0x{:02x}", address);
        return Ok(lcd);
    }

    fn init(&mut self) -> result::SubsignResult<()> {
        std::thread::sleep(std::time::Duration::from_millis(50));

        // Force 8-bit mode three times, then switch to 4-bit mode.
        self.write_nibble(0x30, false)?;
        std::thread::sleep(std::time::Duration::from_millis(5));
        self.write_nibble(0x30, false)?;
        std::thread::sleep(std::time::Duration::from_millis(1));
        self.write_nibble(0x30, false)?;
        std::thread::sleep(std::time::Duration::from_millis(1));
        self.write_nibble(0x20, false)?;
        std::thread::sleep(std::time::Duration::from_millis(1));

        self.send_command(CMD_FUNCTION_SET)?;
        self.send_command(CMD_DISPLAY_ON)?;
        self.send_command(CMD_CLEAR)?;
        std::thread::sleep(std::time::Duration::from_millis(2));
        self.send_command(CMD_ENTRY_MODE)?;

        return Ok(());
    }

    fn write_nibble(&mut self, bits: u8, is_data: bool) -> result::SubsignResult<()> {
        let mut out = (bits & 0xF0) | LCD_BACKLIGHT;
        if is_data {
            out |= LCD_RS;
        }
        self.i2c.write(&[out])?;
        self.i2c.write(&[out | LCD_ENABLE])?;
        self.i2c.write(&[out])?;
        std::thread::sleep(std::time::Duration::from_micros(100));
        return Ok(());
    }

    fn write_byte(&mut self, byte: u8, is_data: bool) -> result::SubsignResult<()> {
        self.write_nibble(byte & 0xF0, is_data)?;
        self.write_nibble(byte << 4, is_data)?;
        return Ok(());
    }

    fn send_command(&mut self, command: u8) -> result::SubsignResult<()> {
        return self.write_byte(command, false);
    }

    fn write_row(&mut self, row: usize, text: &str) -> result::SubsignResult<()> {
        self.send_command(CMD_SET_DDRAM_ADDR | ROW_OFFSETS[row])?;
        for byte in text.bytes().take(layout::LINE_WIDTH) {
            self.write_byte(byte, true)?;
        }
        return Ok(());
    }

    fn clear(&mut self) -> result::SubsignResult<()> {
        self.send_command(CMD_CLEAR)?;
        std::thread::sleep(std::time::Duration::from_millis(2));
        return Ok(());
    }
}

impl Screen for LcdScreen {
    fn render(&mut self, line1: &str, line2: &str) -> result::SubsignResult<()> {
        self.clear()?;
        self.write_row(0, line1)?;
        self.write_row(1, line2)?;
        return Ok(());
    }

    fn cleanup(&mut self) -> result::SubsignResult<()> {
        self.clear()?;
        self.send_command(CMD_DISPLAY_OFF)?;
        // Backlight off.
        self.i2c.write(&[0x00])?;
        return Ok(());
    }
}

/// Console stand-in for the LCD: the same 16-character lines in a box.
pub struct ConsoleScreen {}

impl Screen for ConsoleScreen {
    fn render(&mut self, line1: &str, line2: &str) -> result::SubsignResult<()> {
        println!("{}", boxed(line1, line2));
        return Ok(());
    }

    fn cleanup(&mut self) -> result::SubsignResult<()> {
        return Ok(());
    }
}

fn boxed(line1: &str, line2: &str) -> String {
    let border = "─".repeat(layout::LINE_WIDTH);
    return format!("┌{}┐\n│{:<16}│\n│{:<16}│\n└{}┘",
                   border, line1, line2, border);
}

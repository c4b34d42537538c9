//! ILI9341 registers, panel geometry and the power-up sequence.

use crate::init_table::InitTable;

/// Panel width in pixels, portrait orientation.
pub const WIDTH: u16 = 240;
/// Panel height in pixels, portrait orientation.
pub const HEIGHT: u16 = 320;

/// Time the controller needs after a software reset, in ms.
pub const SOFT_RESET_SETTLE_MS: u32 = 5;
/// Time the controller needs after entering or leaving sleep, in ms.
pub const SLEEP_SETTLE_MS: u32 = 120;

pub const SWRESET: u8 = 0x01;
pub const SLPIN: u8 = 0x10;
pub const SLPOUT: u8 = 0x11;
pub const INVOFF: u8 = 0x20;
pub const INVON: u8 = 0x21;
pub const GAMMASET: u8 = 0x26;
pub const DISPOFF: u8 = 0x28;
pub const DISPON: u8 = 0x29;
pub const CASET: u8 = 0x2A;
pub const PASET: u8 = 0x2B;
pub const RAMWR: u8 = 0x2C;
pub const MADCTL: u8 = 0x36;
pub const VSCRSADD: u8 = 0x37;
pub const PIXFMT: u8 = 0x3A;
pub const FRMCTR1: u8 = 0xB1;
pub const DFUNCTR: u8 = 0xB6;
pub const PWCTR1: u8 = 0xC0;
pub const PWCTR2: u8 = 0xC1;
pub const VMCTR1: u8 = 0xC5;
pub const VMCTR2: u8 = 0xC7;
pub const GMCTRP1: u8 = 0xE0;
pub const GMCTRN1: u8 = 0xE1;

#[rustfmt::skip]
const POWER_UP: &[u8] = &[
    0xEF, 3, 0x03, 0x80, 0x02,
    0xCF, 3, 0x00, 0xC1, 0x30,
    0xED, 4, 0x64, 0x03, 0x12, 0x81,
    0xE8, 3, 0x85, 0x00, 0x78,
    0xCB, 5, 0x39, 0x2C, 0x00, 0x34, 0x02,
    0xF7, 1, 0x20,
    0xEA, 2, 0x00, 0x00,
    PWCTR1, 1, 0x23,                // VRH[5:0]
    PWCTR2, 1, 0x10,                // SAP[2:0], BT[3:0]
    VMCTR1, 2, 0x3E, 0x28,
    VMCTR2, 1, 0x86,
    MADCTL, 1, 0x48,                // MX | BGR
    VSCRSADD, 1, 0x00,
    PIXFMT, 1, 0x55,                // 16 bits per pixel
    FRMCTR1, 2, 0x00, 0x18,
    DFUNCTR, 3, 0x08, 0x82, 0x27,
    0xF2, 1, 0x00,                  // 3Gamma off
    GAMMASET, 1, 0x01,
    GMCTRP1, 15, 0x0F, 0x31, 0x2B, 0x0C, 0x0E, 0x08,
        0x4E, 0xF1, 0x37, 0x07, 0x10, 0x03, 0x0E, 0x09, 0x00,
    GMCTRN1, 15, 0x00, 0x0E, 0x14, 0x03, 0x11, 0x07,
        0x31, 0xC1, 0x48, 0x08, 0x0F, 0x0C, 0x31, 0x36, 0x0F,
    SLPOUT, 0x80,
    DISPON, 0x80,
    0x00,
];

/// Vendor power-up sequence for ILI9341 panels in 16 bit colour.
pub static POWER_UP_TABLE: InitTable<'static> = InitTable::new(POWER_UP);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_up_table_is_well_formed() {
        assert_eq!(POWER_UP_TABLE.validate(), Ok(22));
    }

    #[test]
    fn power_up_table_settles_after_sleep_out_and_display_on() {
        let mut flagged = POWER_UP_TABLE
            .frames()
            .filter_map(Result::ok)
            .filter(|frame| frame.requires_delay)
            .map(|frame| frame.opcode);

        assert_eq!(flagged.next(), Some(SLPOUT));
        assert_eq!(flagged.next(), Some(DISPON));
        assert_eq!(flagged.next(), None);
    }
}

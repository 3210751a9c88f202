//! Baud rate table
//!
//! The SET_BAUD command takes an index into the module's fixed table of
//! rates rather than the rate itself. Rates outside the table cannot be
//! requested.

/// Rate the module listens at after reset
pub const BOOTSTRAP_BAUD: u32 = 9600;

/// Supported rates, indexed by their SET_BAUD parameter
const BAUD_TABLE: [u32; 20] = [
    110, 300, 600, 1200, 2400, 4800, 9600, 14_400, 19_200, 31_250, 38_400, 56_000, 57_600,
    115_200, 128_000, 256_000, 300_000, 375_000, 500_000, 600_000,
];

/// SET_BAUD index for a rate, `None` if the module cannot run at it
pub fn baud_index(baud_rate: u32) -> Option<u8> {
    BAUD_TABLE
        .iter()
        .position(|&rate| rate == baud_rate)
        .map(|index| index as u8)
}

/// Rate for a SET_BAUD index
pub fn baud_rate(index: u8) -> Option<u32> {
    BAUD_TABLE.get(index as usize).copied()
}

// Used event codes (input events as standardized in the linux kernel)
// See https://github.com/torvalds/linux/blob/master/include/uapi/linux/input-event-codes.h

// Event types
pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_MSC: u16 = 0x04;

// Misc events. The sensor drivers report the raw hardware code here
pub const MSC_SCAN: u16 = 0x04;

// Keys (synthesized navigation output)
pub const KEY_HOMEPAGE: u16 = 0xac; // = 172
pub const KEY_BACK: u16 = 0x9e; // = 158
pub const KEY_APPSELECT: u16 = 0x244; // = 580, "app switch" / recents

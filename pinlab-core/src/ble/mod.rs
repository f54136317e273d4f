//! BLE custom service descriptor
//!
//! Identifiers and the registration sequence for a one-byte vendor
//! service. The BLE stack itself lives outside this crate; it is reached
//! through [`GattRegistry`].

pub mod service;
pub mod uuid;

pub use service::{
    BleUuid, CccdSecurity, CharHandles, CharProperties, CharacteristicParams, CustomService,
    CustomServiceInit, GattRegistry, SecurityMode, CUSTOM_SERVICE_BASE, CUSTOM_SERVICE_UUID,
    CUSTOM_VALUE_CHAR_UUID,
};
pub use uuid::{Uuid128, UuidParseError};

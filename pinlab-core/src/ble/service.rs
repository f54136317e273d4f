//! Custom service: one readable, writable, notifiable byte

use super::uuid::Uuid128;

/// Vendor base UUID `8C864B49-9A27-472F-A928-BD9C544C748E`
pub const CUSTOM_SERVICE_BASE: Uuid128 = Uuid128::from_le_bytes([
    0x8E, 0x74, 0x4C, 0x54, 0x9C, 0xBD, 0x28, 0xA9, 0x2F, 0x47, 0x27, 0x9A, 0x49, 0x4B, 0x86, 0x8C,
]);

/// Service alias on [`CUSTOM_SERVICE_BASE`]
pub const CUSTOM_SERVICE_UUID: u16 = 0x1400;

/// Value characteristic alias on [`CUSTOM_SERVICE_BASE`]
pub const CUSTOM_VALUE_CHAR_UUID: u16 = 0x1401;

/// Length of the custom value
pub const CUSTOM_VALUE_LEN: u16 = 1;

/// Access requirement for one attribute permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SecurityMode {
    NoAccess,
    #[default]
    Open,
    /// Encrypted link, no MITM protection
    Encrypted,
    /// Encrypted link with MITM protection
    EncryptedMitm,
    /// LE Secure Connections pairing required
    EncryptedLesc,
}

/// Permissions of a characteristic value and its CCCD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CccdSecurity {
    pub read: SecurityMode,
    pub write: SecurityMode,
    pub cccd_write: SecurityMode,
}

impl CccdSecurity {
    /// Everything open
    pub const OPEN: Self = Self {
        read: SecurityMode::Open,
        write: SecurityMode::Open,
        cccd_write: SecurityMode::Open,
    };
}

/// Options for [`CustomService::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CustomServiceInit {
    pub initial_value: u8,
    pub value_security: CccdSecurity,
}

/// A UUID as the stack knows it: registered base index plus 16-bit alias
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BleUuid {
    pub uuid_type: u8,
    pub alias: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharProperties {
    pub read: bool,
    pub write: bool,
    pub write_without_response: bool,
    pub notify: bool,
    pub indicate: bool,
}

/// Attribute handles the stack assigned to one characteristic
///
/// Handles the characteristic does not have are 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharHandles {
    pub value: u16,
    pub user_desc: u16,
    pub cccd: u16,
    pub sccd: u16,
}

/// Everything needed to add one characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharacteristicParams<'a> {
    pub uuid: BleUuid,
    pub properties: CharProperties,
    pub security: CccdSecurity,
    /// Largest value the attribute can hold
    pub max_len: u16,
    pub initial_value: &'a [u8],
}

/// GATT server operations the BLE stack provides
pub trait GattRegistry {
    type Error;

    /// Register a 128-bit base, returning the uuid type index for aliases
    fn add_vendor_uuid(&mut self, base: &Uuid128) -> Result<u8, Self::Error>;

    /// Add a primary service, returning its handle
    fn add_primary_service(&mut self, uuid: BleUuid) -> Result<u16, Self::Error>;

    /// Add a characteristic to `service_handle`
    fn add_characteristic(
        &mut self,
        service_handle: u16,
        params: &CharacteristicParams<'_>,
    ) -> Result<CharHandles, Self::Error>;
}

/// State of a registered custom service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CustomService {
    pub service_handle: u16,
    pub value_handles: CharHandles,
    /// Current connection, `None` when not connected
    pub conn_handle: Option<u16>,
    pub uuid_type: u8,
}

impl CustomService {
    /// Register the service and its value characteristic
    ///
    /// Stack errors are passed through unchanged; nothing is retried.
    pub fn init<R: GattRegistry>(stack: &mut R, init: &CustomServiceInit) -> Result<Self, R::Error> {
        let uuid_type = stack.add_vendor_uuid(&CUSTOM_SERVICE_BASE)?;

        let service_handle = stack.add_primary_service(BleUuid {
            uuid_type,
            alias: CUSTOM_SERVICE_UUID,
        })?;

        let initial = [init.initial_value];
        let value_handles = stack.add_characteristic(
            service_handle,
            &CharacteristicParams {
                uuid: BleUuid {
                    uuid_type,
                    alias: CUSTOM_VALUE_CHAR_UUID,
                },
                properties: CharProperties {
                    read: true,
                    write: true,
                    notify: true,
                    ..CharProperties::default()
                },
                security: init.value_security,
                max_len: CUSTOM_VALUE_LEN,
                initial_value: &initial,
            },
        )?;

        Ok(Self {
            service_handle,
            value_handles,
            conn_handle: None,
            uuid_type,
        })
    }

    pub fn on_connected(&mut self, conn_handle: u16) {
        self.conn_handle = Some(conn_handle);
    }

    pub fn on_disconnected(&mut self) {
        self.conn_handle = None;
    }

    pub fn is_connected(&self) -> bool {
        self.conn_handle.is_some()
    }

    /// Full 128-bit UUID of the service
    pub fn service_uuid(&self) -> Uuid128 {
        CUSTOM_SERVICE_BASE.with_alias(CUSTOM_SERVICE_UUID)
    }

    /// Full 128-bit UUID of the value characteristic
    pub fn value_uuid(&self) -> Uuid128 {
        CUSTOM_SERVICE_BASE.with_alias(CUSTOM_VALUE_CHAR_UUID)
    }
}

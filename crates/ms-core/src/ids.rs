use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Identity of a plant device.
///
/// Assigned once when the device set is configured and never reused.
/// Zero is not a valid id, which keeps `Option<DeviceId>` the same size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DeviceId(NonZeroU32);

impl DeviceId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for DeviceId {
    type Error = CoreError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(CoreError::InvalidDeviceId { value })
    }
}

impl From<DeviceId> for u32 {
    fn from(id: DeviceId) -> Self {
        id.get()
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.get())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

//! Device availability checks

use crate::{BiometricSensor, LockScreen};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why biometric authentication cannot run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnavailableReason {
    /// No sensor hardware
    NoHardware,
    /// Hardware present but nothing enrolled
    NoEnrollment,
    /// No secure lock screen configured
    InsecureLockScreen,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHardware => write!(f, "no biometric hardware"),
            Self::NoEnrollment => write!(f, "no biometric enrolled"),
            Self::InsecureLockScreen => write!(f, "secure lock screen not set up"),
        }
    }
}

/// Snapshot of what the device supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Sensor hardware detected
    pub hardware_present: bool,
    /// At least one biometric enrolled
    pub enrolled: bool,
    /// Secure lock screen configured
    pub lock_screen_secure: bool,
}

impl DeviceCapabilities {
    /// Query the sensor and lock screen
    pub fn detect(sensor: &dyn BiometricSensor, lock_screen: &dyn LockScreen) -> Self {
        Self {
            hardware_present: sensor.is_present(),
            enrolled: sensor.has_enrollment(),
            lock_screen_secure: lock_screen.is_secure(),
        }
    }

    /// First missing requirement, checked as hardware, enrollment, lock screen
    ///
    /// # Errors
    ///
    /// Returns the reason biometric authentication cannot run.
    pub fn check(&self) -> Result<(), UnavailableReason> {
        if !self.hardware_present {
            return Err(UnavailableReason::NoHardware);
        }
        if !self.enrolled {
            return Err(UnavailableReason::NoEnrollment);
        }
        if !self.lock_screen_secure {
            return Err(UnavailableReason::InsecureLockScreen);
        }
        Ok(())
    }

    /// Whether every requirement holds
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.check().is_ok()
    }
}

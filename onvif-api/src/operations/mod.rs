//! ONVIF operations organized by service
//!
//! Each operation is a unit struct implementing
//! [`OnvifOperation`](crate::OnvifOperation) with its typed request and
//! response alongside.

pub mod device;
pub mod events;
pub mod media;
pub mod ptz;

// Re-export commonly used operations
pub use device::{GetCapabilitiesOperation, GetDeviceInformationOperation, GetServicesOperation};
pub use media::{GetProfilesOperation, GetStreamUri2Operation, GetStreamUriOperation};
pub use ptz::{
    ContinuousMoveOperation, GetPresetsOperation, GetStatusOperation, GotoHomePositionOperation,
    GotoPresetOperation, StopOperation,
};

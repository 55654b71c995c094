//! E1AP (3GPP TS 38.463) bindings for a representative set of messages
//!
//! The interface between the control-plane and user-plane halves of a gNB
//! central unit. Only a handful of procedures are modelled here; they are
//! enough to exercise every part of the runtime, and new ones are added by
//! declaring their IE containers with [`protocol_ies!`](crate::protocol_ies)
//! and listing them in [`pdu`].

pub mod ies;
pub mod pdu;

use num_enum::{IntoPrimitive, TryFromPrimitive};

pub use ies::*;
pub use pdu::{E1apPdu, InitiatingMessage, SuccessfulOutcome, UnsuccessfulOutcome};

/// `ProtocolIE-ID` values used by the containers of this module
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
#[repr(u16)]
pub enum ProtocolIeId {
    Cause = 0,
    CriticalityDiagnostics = 1,
    GnbCuCpUeE1apId = 2,
    GnbCuUpUeE1apId = 3,
    TransactionId = 57,
    SubscriberProfileIdForRfp = 83,
    AdditionalRrmPriorityIndex = 84,
}

/// `ProcedureCode` values of the E1AP elementary procedures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
#[repr(u8)]
pub enum ProcedureCode {
    Reset = 0,
    ErrorIndication = 1,
    PrivateMessage = 2,
    GnbCuUpE1Setup = 3,
    GnbCuCpE1Setup = 4,
    GnbCuUpConfigurationUpdate = 5,
    GnbCuCpConfigurationUpdate = 6,
    E1Release = 7,
    BearerContextSetup = 8,
    BearerContextModification = 9,
    BearerContextModificationRequired = 10,
    BearerContextRelease = 11,
    BearerContextReleaseRequest = 12,
    BearerContextInactivityNotification = 13,
}

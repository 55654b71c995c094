//! IE value types and protocol-IE containers

use crate::ie::{Criticality, ExtensionContainer, Message, RawIe};
use crate::int::RangedInt;
use crate::seq::SeqOf;
use crate::string::BitString;
use crate::{choice, enumerated, protocol_ies, Decode, Encode};

use super::ProtocolIeId;

/// `GNB-CU-CP-UE-E1AP-ID ::= INTEGER (0..4294967295)`
pub type GnbCuCpUeE1apId = RangedInt<0, 4294967295>;

/// `GNB-CU-UP-UE-E1AP-ID ::= INTEGER (0..4294967295)`
pub type GnbCuUpUeE1apId = RangedInt<0, 4294967295>;

/// `TransactionID ::= INTEGER (0..255, ...)`
pub type TransactionId = RangedInt<0, 255, true>;

/// `SubscriberProfileIDforRFP ::= INTEGER (1..256, ...)`
pub type SubscriberProfileIdForRfp = RangedInt<1, 256, true>;

/// `AdditionalRRMPriorityIndex ::= BIT STRING (SIZE(32))`
pub type AdditionalRrmPriorityIndex = BitString<32, 32>;

/// `maxnoofErrors`
pub const MAX_NOOF_ERRORS: usize = 256;

enumerated! {
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub enum CauseRadioNetwork {
        Unspecified,
        UnknownOrAlreadyAllocatedGnbCuCpUeE1apId,
        UnknownOrAlreadyAllocatedGnbCuUpUeE1apId,
        UnknownOrInconsistentPairOfUeE1apId,
        InteractionWithOtherProcedure,
        PpdcpCountWrapAround,
        NotSupportedQciValue,
        NotSupported5qiValue,
        EncryptionAlgorithmsNotSupported,
        IntegrityProtectionAlgorithmsNotSupported,
        UpIntegrityProtectionNotPossible,
        UpConfidentialityProtectionNotPossible,
        MultiplePduSessionIdInstances,
        UnknownPduSessionId,
        MultipleQosFlowIdInstances,
        UnknownQosFlowId,
        MultipleDrbIdInstances,
        UnknownDrbId,
        InvalidQosCombination,
        ProcedureCancelled,
        NormalRelease,
        NoRadioResourcesAvailable,
        ActionDesirableForRadioReasons,
        ResourcesNotAvailableForTheSlice,
        PdcpConfigurationNotSupported,
        ...,
        UeDlMaxIpDataRateReason,
        UpIntegrityProtectionFailure,
        ReleaseDueToPreEmption,
    }
}

enumerated! {
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub enum CauseTransport {
        Unspecified,
        TransportResourceUnavailable,
        ...,
        UnknownTnlAddressForIab,
    }
}

enumerated! {
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub enum CauseProtocol {
        TransferSyntaxError,
        AbstractSyntaxErrorReject,
        AbstractSyntaxErrorIgnoreAndNotify,
        MessageNotCompatibleWithReceiverState,
        SemanticError,
        AbstractSyntaxErrorFalselyConstructedMessage,
        Unspecified,
        ...
    }
}

enumerated! {
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub enum CauseMisc {
        ControlProcessingOverload,
        NotEnoughUserPlaneProcessingResources,
        HardwareFailure,
        OmIntervention,
        Unspecified,
        ...
    }
}

choice! {
    /// `Cause`; the last alternative carries a single IE of `Cause-ExtIEs`
    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub enum Cause {
        RadioNetwork(CauseRadioNetwork),
        Transport(CauseTransport),
        Protocol(CauseProtocol),
        Misc(CauseMisc),
        ChoiceExtension(RawIe),
    }
}

enumerated! {
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub enum TriggeringMessage {
        InitiatingMessage,
        SuccessfulOutcome,
        UnsuccessfulOutcome,
    }
}

enumerated! {
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub enum TypeOfError {
        NotUnderstood,
        Missing,
        ...
    }
}

/// Element of `CriticalityDiagnostics-IE-List`
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
#[per(extensible)]
pub struct CriticalityDiagnosticsIeItem {
    pub ie_criticality: Criticality,
    pub ie_id: u16,
    pub type_of_error: TypeOfError,
    pub ie_extensions: Option<ExtensionContainer>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Encode, Decode)]
#[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
#[per(extensible)]
pub struct CriticalityDiagnostics {
    pub procedure_code: Option<u8>,
    pub triggering_message: Option<TriggeringMessage>,
    pub procedure_criticality: Option<Criticality>,
    pub transaction_id: Option<TransactionId>,
    pub ies_criticality_diagnostics: Option<SeqOf<CriticalityDiagnosticsIeItem, 1, MAX_NOOF_ERRORS>>,
    pub ie_extensions: Option<ExtensionContainer>,
}

protocol_ies! {
    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub struct BearerContextReleaseCmdIes {
        mandatory gnb_cu_cp_ue_e1ap_id: GnbCuCpUeE1apId = (ProtocolIeId::GnbCuCpUeE1apId, Reject),
        mandatory gnb_cu_up_ue_e1ap_id: GnbCuUpUeE1apId = (ProtocolIeId::GnbCuUpUeE1apId, Reject),
        mandatory cause: Cause = (ProtocolIeId::Cause, Ignore),
    }
}

protocol_ies! {
    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub struct BearerContextSetupFailIes {
        mandatory gnb_cu_cp_ue_e1ap_id: GnbCuCpUeE1apId = (ProtocolIeId::GnbCuCpUeE1apId, Reject),
        optional gnb_cu_up_ue_e1ap_id: GnbCuUpUeE1apId = (ProtocolIeId::GnbCuUpUeE1apId, Ignore),
        mandatory cause: Cause = (ProtocolIeId::Cause, Ignore),
        optional crit_diagnostics: CriticalityDiagnostics = (ProtocolIeId::CriticalityDiagnostics, Ignore),
    }
}

protocol_ies! {
    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub struct BearerContextModFailIes {
        mandatory gnb_cu_cp_ue_e1ap_id: GnbCuCpUeE1apId = (ProtocolIeId::GnbCuCpUeE1apId, Reject),
        mandatory gnb_cu_up_ue_e1ap_id: GnbCuUpUeE1apId = (ProtocolIeId::GnbCuUpUeE1apId, Reject),
        mandatory cause: Cause = (ProtocolIeId::Cause, Ignore),
        optional crit_diagnostics: CriticalityDiagnostics = (ProtocolIeId::CriticalityDiagnostics, Ignore),
    }
}

protocol_ies! {
    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub struct ResetAckIes {
        mandatory transaction_id: TransactionId = (ProtocolIeId::TransactionId, Reject),
        optional crit_diagnostics: CriticalityDiagnostics = (ProtocolIeId::CriticalityDiagnostics, Ignore),
    }
}

protocol_ies! {
    /// The subset of `EUTRAN-BearerContextModificationRequest` that carries scalar IEs
    #[derive(Clone, Debug, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub struct EutranBearerContextModRequest {
        optional subscriber_profile_id_for_rfp: SubscriberProfileIdForRfp =
            (ProtocolIeId::SubscriberProfileIdForRfp, Ignore),
        optional additional_rrm_priority_index: AdditionalRrmPriorityIndex =
            (ProtocolIeId::AdditionalRrmPriorityIndex, Ignore),
    }
}

pub type BearerContextReleaseCommand = Message<BearerContextReleaseCmdIes>;
pub type BearerContextSetupFailure = Message<BearerContextSetupFailIes>;
pub type BearerContextModificationFailure = Message<BearerContextModFailIes>;
pub type ResetAcknowledge = Message<ResetAckIes>;

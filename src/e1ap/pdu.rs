//! `E1AP-PDU` and its three elementary-procedure messages
//!
//! Each of `InitiatingMessage`, `SuccessfulOutcome` and `UnsuccessfulOutcome`
//! is a `SEQUENCE { procedureCode, criticality, value }` whose value is an
//! open type selected by the procedure code. Here each is modelled as an enum
//! with one variant per procedure, so that the code and criticality are
//! implied by the variant rather than stored alongside it.

use crate::choice;
use crate::conv::{target::Target, Decode, Encode};
use crate::dynamic::{with_length_prefixed, with_window};
use crate::error::EncodeResult;
use crate::ie::Criticality;
use crate::parse::error::{ParseError, TagError, TokenError};
use crate::parse::{ParseResult, Parser};

use super::ies::{BearerContextModificationFailure, BearerContextReleaseCommand, BearerContextSetupFailure, ResetAcknowledge};
use super::ProcedureCode;

fn unknown_procedure<T>(code: u8) -> ParseError {
    tracing::error!(
        "Procedure code {} is not a known {}",
        code,
        std::any::type_name::<T>()
    );
    TokenError::InvalidTag(TagError::with_type::<T>(u64::from(code), None)).into()
}

macro_rules! procedures {
    (
        $(#[$m:meta])*
        pub enum $name:ident {
            $( $variant:ident($ty:ty) = ($code:ident, $crit:ident) ),+ $(,)?
        }
    ) => {
        $(#[$m])*
        pub enum $name {
            $( $variant($ty), )+
        }

        impl $name {
            pub fn procedure_code(&self) -> ProcedureCode {
                match self {
                    $( Self::$variant(_) => ProcedureCode::$code, )+
                }
            }

            pub fn criticality(&self) -> Criticality {
                match self {
                    $( Self::$variant(_) => Criticality::$crit, )+
                }
            }
        }

        impl Encode for $name {
            fn write_to<U: Target>(&self, buf: &mut U) -> EncodeResult<usize> {
                let mut n = u8::from(self.procedure_code()).write_to(buf)?;
                n += self.criticality().write_to(buf)?;
                n += match self {
                    $( Self::$variant(val) => with_length_prefixed(buf, |scratch| val.write_to(scratch))?, )+
                };
                Ok(n + crate::resolve_zero!(buf))
            }
        }

        impl Decode for $name {
            fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
                let code = u8::parse(p)?;
                let criticality = Criticality::parse(p)?;
                let procedure = ProcedureCode::try_from(code).map_err(|_| unknown_procedure::<Self>(code))?;
                let ret = match procedure {
                    $( ProcedureCode::$code => Self::$variant(with_window(p, <$ty>::parse)?), )+
                    #[allow(unreachable_patterns)]
                    _ => return Err(unknown_procedure::<Self>(code)),
                };
                if criticality != ret.criticality() {
                    tracing::debug!(
                        "Procedure {:?} carries criticality {:?}, expected {:?}",
                        procedure,
                        criticality,
                        ret.criticality()
                    );
                }
                Ok(ret)
            }
        }
    };
}

procedures! {
    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub enum InitiatingMessage {
        BearerContextReleaseCommand(BearerContextReleaseCommand) = (BearerContextRelease, Reject),
    }
}

procedures! {
    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub enum SuccessfulOutcome {
        ResetAcknowledge(ResetAcknowledge) = (Reset, Reject),
    }
}

procedures! {
    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub enum UnsuccessfulOutcome {
        BearerContextSetupFailure(BearerContextSetupFailure) = (BearerContextSetup, Reject),
        BearerContextModificationFailure(BearerContextModificationFailure) = (BearerContextModification, Reject),
    }
}

choice! {
    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde_impls", derive(serde::Serialize))]
    pub enum E1apPdu {
        InitiatingMessage(InitiatingMessage),
        SuccessfulOutcome(SuccessfulOutcome),
        UnsuccessfulOutcome(UnsuccessfulOutcome),
        ...
    }
}

impl E1apPdu {
    pub fn procedure_code(&self) -> ProcedureCode {
        match self {
            E1apPdu::InitiatingMessage(msg) => msg.procedure_code(),
            E1apPdu::SuccessfulOutcome(msg) => msg.procedure_code(),
            E1apPdu::UnsuccessfulOutcome(msg) => msg.procedure_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::error::DecodeError;
    use crate::e1ap::ies::*;
    use crate::ie::Message;
    use crate::int::RangedInt;

    fn release_command() -> E1apPdu {
        E1apPdu::InitiatingMessage(InitiatingMessage::BearerContextReleaseCommand(Message::new(
            BearerContextReleaseCmdIes {
                gnb_cu_cp_ue_e1ap_id: RangedInt::new(7),
                gnb_cu_up_ue_e1ap_id: RangedInt::new(42),
                cause: Cause::RadioNetwork(CauseRadioNetwork::NormalRelease),
            },
        )))
    }

    #[test]
    fn release_command_pdu() {
        let pdu = release_command();
        assert_eq!(pdu.procedure_code(), ProcedureCode::BearerContextRelease);
        let bytes = pdu.to_bytes().unwrap();
        // choice 000, procedure code 11, criticality reject, 21-octet value
        assert_eq!(&bytes[..4], &[0x00, 0x0b, 0x00, 0x15]);
        assert_eq!(bytes.len(), 4 + 0x15);
        assert_eq!(E1apPdu::decode(bytes), pdu);
    }

    #[test]
    fn outcome_pdus() {
        let ack = E1apPdu::SuccessfulOutcome(SuccessfulOutcome::ResetAcknowledge(Message::new(ResetAckIes {
            transaction_id: RangedInt::new(5),
            crit_diagnostics: None,
        })));
        let bytes = ack.to_bytes().unwrap();
        assert_eq!(bytes, vec![0x20, 0x00, 0x00, 0x09, 0x00, 0x00, 0x01, 0x00, 0x39, 0x00, 0x02, 0x00, 0x05]);
        assert_eq!(E1apPdu::decode(bytes), ack);

        let failure = E1apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::BearerContextSetupFailure(Message::new(
            BearerContextSetupFailIes {
                gnb_cu_cp_ue_e1ap_id: RangedInt::new(1),
                gnb_cu_up_ue_e1ap_id: Some(RangedInt::new(2)),
                cause: Cause::Transport(CauseTransport::TransportResourceUnavailable),
                crit_diagnostics: Some(CriticalityDiagnostics {
                    procedure_code: Some(ProcedureCode::BearerContextSetup.into()),
                    ..Default::default()
                }),
            },
        )));
        assert_eq!(failure.procedure_code(), ProcedureCode::BearerContextSetup);
        assert_eq!(E1apPdu::decode(failure.to_bytes().unwrap()), failure);
    }

    #[test]
    fn unknown_procedure_code() {
        // initiating message with procedure code 200
        let bytes = vec![0x00, 0xc8, 0x00, 0x01, 0x00];
        assert!(matches!(
            E1apPdu::try_decode(bytes),
            Err(DecodeError::Parse(ParseError::Token(TokenError::InvalidTag(_))))
        ));
        // Reset is only modelled as a successful outcome
        let bytes = vec![0x00, 0x00, 0x00, 0x01, 0x00];
        assert!(matches!(
            E1apPdu::try_decode(bytes),
            Err(DecodeError::Parse(ParseError::Token(TokenError::InvalidTag(_))))
        ));
    }

    #[test]
    fn unknown_pdu_extension() {
        assert!(matches!(
            E1apPdu::try_decode(vec![0x80, 0x01, 0x00]),
            Err(DecodeError::Parse(ParseError::Token(TokenError::InvalidChoice(_))))
        ));
    }
}

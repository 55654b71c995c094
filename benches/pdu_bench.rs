use criterion::{black_box, criterion_group, criterion_main, Criterion};

use asn1_per::e1ap::*;
use asn1_per::ie::Message;
use asn1_per::{BitCounter, Decode, Encode, EncodeLength, RangedInt, StrictBuilder};

fn setup_failure() -> E1apPdu {
    E1apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome::BearerContextSetupFailure(Message::new(
        BearerContextSetupFailIes {
            gnb_cu_cp_ue_e1ap_id: RangedInt::new(0x1234_5678),
            gnb_cu_up_ue_e1ap_id: Some(RangedInt::new(42)),
            cause: Cause::RadioNetwork(CauseRadioNetwork::UnknownDrbId),
            crit_diagnostics: Some(CriticalityDiagnostics {
                procedure_code: Some(ProcedureCode::BearerContextSetup.into()),
                triggering_message: Some(TriggeringMessage::InitiatingMessage),
                ..Default::default()
            }),
        },
    )))
}

fn encode_bench(c: &mut Criterion) {
    let pdu = setup_failure();
    c.bench_function("e1ap_pdu_encode", |b| {
        b.iter(|| black_box(pdu.encode::<StrictBuilder>().unwrap()))
    });
    c.bench_function("e1ap_pdu_enc_bits", |b| {
        b.iter(|| black_box(pdu.encode::<BitCounter>().unwrap()))
    });
    c.bench_function("e1ap_pdu_enc_len", |b| b.iter(|| black_box(pdu.enc_bits().unwrap())));
}

fn decode_bench(c: &mut Criterion) {
    let bytes = setup_failure().to_bytes().unwrap();
    c.bench_function("e1ap_pdu_decode", |b| {
        b.iter(|| black_box(E1apPdu::try_decode(bytes.as_slice()).unwrap()))
    });
}

criterion_group! {
    name = pdu_benches;
    config = Criterion::default();
    targets = encode_bench, decode_bench
}

criterion_main!(pdu_benches);

use std::process::ExitCode;

use asn1_per::e1ap::E1apPdu;
use asn1_per::util::hex_of_bytes;
use asn1_per::{Decode, Encode, Variant};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Decodes one hex-encoded E1AP PDU, prints it, and checks that it re-encodes to the same octets.
fn transcode(hex: &str, variant: Variant) -> Result<(), String> {
    let pdu = E1apPdu::try_decode_with(hex, variant).map_err(|err| format!("decode failed: {}", err))?;
    println!("{:#?}", pdu);
    let octets = match variant {
        Variant::Aligned => pdu.to_bytes(),
        Variant::Unaligned => pdu.to_bytes_unaligned(),
    }
    .map_err(|err| format!("re-encode failed: {}", err))?;
    let again = hex_of_bytes(octets);
    if !again.eq_ignore_ascii_case(hex) {
        tracing::warn!("Re-encoding differs from the input: {}", again);
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    let mut variant = Variant::Aligned;
    let mut inputs = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--uper" => variant = Variant::Unaligned,
            "--aper" => variant = Variant::Aligned,
            _ => inputs.push(arg),
        }
    }
    if inputs.is_empty() {
        eprintln!("usage: asn1-per [--aper|--uper] <hex-encoded E1AP PDU>...");
        return ExitCode::from(2);
    }

    let mut status = ExitCode::SUCCESS;
    for hex in inputs.iter() {
        if let Err(msg) = transcode(hex, variant) {
            eprintln!("{}: {}", hex, msg);
            status = ExitCode::FAILURE;
        }
    }
    status
}

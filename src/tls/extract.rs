//! Certificate extraction utilities.

use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::time::ASN1Time;

/// Extracts DNS Subject Alternative Names from an X.509 certificate.
///
/// IP addresses, email addresses and other name forms are ignored.
pub fn extract_certificate_sans(cert: &x509_parser::certificate::X509Certificate<'_>) -> Vec<String> {
    let mut sans = Vec::new();

    for ext in cert.extensions() {
        if let ParsedExtension::SubjectAlternativeName(ref san) = ext.parsed_extension() {
            for general_name in &san.general_names {
                if let GeneralName::DNSName(dns_name) = general_name {
                    sans.push(dns_name.to_string());
                }
            }
        }
    }

    sans
}

/// Maps a public key algorithm OID to its common name.
///
/// Unknown OIDs are returned unchanged.
pub fn key_algorithm_name(oid: &str) -> String {
    match oid {
        "1.2.840.113549.1.1.1" => "RSA".to_string(),
        "1.2.840.10045.2.1" => "ECDSA".to_string(),
        "1.3.101.112" => "Ed25519".to_string(),
        "1.3.101.113" => "Ed448".to_string(),
        other => other.to_string(),
    }
}

/// Formats an ASN.1 time as an RFC 3339 UTC timestamp.
pub fn asn1_time_to_rfc3339(time: &ASN1Time) -> Option<String> {
    chrono::DateTime::from_timestamp(time.timestamp(), 0)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}

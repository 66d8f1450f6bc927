//! TLS/SSL certificate information extraction.
//!
//! This module connects to HTTPS endpoints and extracts certificate details:
//! - Certificate subject and issuer
//! - Validity period (not before/after dates)
//! - Subject Alternative Names (SANs)
//! - Cipher suite, key algorithm and TLS version
//!
//! Uses `tokio-rustls` for async TLS connections and `x509-parser` for certificate parsing.

mod extract;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use rustls::pki_types::ServerName;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::{TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS};

pub use extract::{asn1_time_to_rfc3339, extract_certificate_sans, key_algorithm_name};

/// Leaf certificate and session details for one HTTPS endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateInfo {
    pub subject: String,
    pub issuer: String,
    pub valid_from: String,
    pub valid_to: String,
    pub subject_alternative_names: Vec<String>,
    pub serial_number: String,
    pub key_algorithm: String,
    pub tls_version: String,
    pub cipher_suite: Option<String>,
}

/// Retrieves SSL/TLS certificate information for a host.
///
/// Establishes a TLS connection (verified against the webpki roots) and reads
/// the leaf certificate presented by the server.
///
/// # Arguments
///
/// * `host` - The host name to connect to (e.g., "example.com")
/// * `port` - TCP port, normally 443
///
/// # Errors
///
/// Returns an error if:
/// - The host name is not a valid server name
/// - TCP connection fails or times out
/// - TLS handshake fails or times out
/// - No certificate was presented, or it cannot be parsed
pub async fn get_ssl_certificate_info(host: &str, port: u16) -> Result<CertificateInfo> {
    debug!("Attempting to get SSL info for {host}:{port}");

    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let server_name = ServerName::try_from(host.to_string())
        .with_context(|| format!("Invalid server name: {host}"))?;

    let sock = match tokio::time::timeout(
        Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
        TcpStream::connect((host, port)),
    )
    .await
    {
        Ok(Ok(sock)) => sock,
        Ok(Err(e)) => {
            debug!("Failed to connect to {host}:{port} - {e}");
            return Err(anyhow::anyhow!("Failed to connect to {}:{}", host, port));
        }
        Err(_) => {
            return Err(anyhow::anyhow!(
                "TCP connection timeout for {}:{} ({}s)",
                host,
                port,
                TCP_CONNECT_TIMEOUT_SECS
            ));
        }
    };

    let connector = TlsConnector::from(Arc::new(config));
    let tls_stream = match tokio::time::timeout(
        Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        connector.connect(server_name, sock),
    )
    .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            debug!("TLS connection failed for {host}: {e}");
            return Err(anyhow::anyhow!("TLS connection failed for {}: {}", host, e));
        }
        Err(_) => {
            return Err(anyhow::anyhow!(
                "TLS handshake timeout for {} ({}s)",
                host,
                TLS_HANDSHAKE_TIMEOUT_SECS
            ));
        }
    };

    let session = tls_stream.get_ref().1;
    let tls_version = session
        .protocol_version()
        .map(|v| format!("{v:?}"))
        .unwrap_or_else(|| "Unknown".to_string());
    let cipher_suite = session
        .negotiated_cipher_suite()
        .map(|cs| format!("{:?}", cs.suite()));

    let der = session
        .peer_certificates()
        .and_then(|certs| certs.first())
        .with_context(|| format!("No certificate presented by {host}"))?;

    let (_, cert) = x509_parser::parse_x509_certificate(der.as_ref())
        .map_err(|e| anyhow::anyhow!("Certificate parse error for {}: {}", host, e))?;
    let tbs_cert = &cert.tbs_certificate;

    let sans = extract_certificate_sans(&cert);
    if !sans.is_empty() {
        debug!("Found {} SAN(s) for {}: {:?}", sans.len(), host, sans);
    }

    Ok(CertificateInfo {
        subject: tbs_cert.subject.to_string(),
        issuer: tbs_cert.issuer.to_string(),
        valid_from: asn1_time_to_rfc3339(&tbs_cert.validity.not_before)
            .context("Invalid not_before")?,
        valid_to: asn1_time_to_rfc3339(&tbs_cert.validity.not_after)
            .context("Invalid not_after")?,
        subject_alternative_names: sans,
        serial_number: tbs_cert.raw_serial_as_string(),
        key_algorithm: key_algorithm_name(&tbs_cert.subject_pki.algorithm.algorithm.to_id_string()),
        tls_version,
        cipher_suite,
    })
}

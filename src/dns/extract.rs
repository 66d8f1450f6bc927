//! DNS record extraction utilities.
//!
//! Picks SPF and DMARC policies out of TXT record collections.

/// Extracts SPF record from TXT records.
///
/// SPF records start with "v=spf1".
///
/// # Arguments
///
/// * `txt_records` - Vector of TXT record strings
///
/// # Returns
///
/// The first SPF record found, or `None` if no SPF record exists.
pub fn extract_spf_record(txt_records: &[String]) -> Option<String> {
    txt_records
        .iter()
        .find(|txt| txt.trim().starts_with("v=spf1"))
        .map(|s| s.trim().to_string())
}

/// Extracts DMARC record from TXT records.
///
/// DMARC records live at `_dmarc.<domain>` and start with "v=DMARC1".
///
/// # Arguments
///
/// * `txt_records` - Vector of TXT record strings
///
/// # Returns
///
/// The first DMARC record found, or `None` if no DMARC record exists.
pub fn extract_dmarc_record(txt_records: &[String]) -> Option<String> {
    txt_records
        .iter()
        .find(|txt| txt.trim().starts_with("v=DMARC1"))
        .map(|s| s.trim().to_string())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_spf_and_dmarc() {
        let records = vec![
            "google-site-verification=abc".to_string(),
            "  v=spf1 include:_spf.example.com ~all ".to_string(),
        ];
        assert_eq!(
            extract_spf_record(&records).as_deref(),
            Some("v=spf1 include:_spf.example.com ~all")
        );
        assert_eq!(extract_dmarc_record(&records), None);

        let dmarc = vec!["v=DMARC1; p=reject".to_string()];
        assert_eq!(
            extract_dmarc_record(&dmarc).as_deref(),
            Some("v=DMARC1; p=reject")
        );
    }
}

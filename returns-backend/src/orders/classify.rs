use returns_common::TrackingRecord;

/// Carrier status codes that only occur on reverse shipments.
///
/// Taken from the carrier's tracking reference as it stood when this list
/// was written; revalidate against their current status-code table before
/// relying on it for anything beyond display filtering.
pub const REVERSE_STATUS_CODES: &[&str] = &[
    "R001", "R002", "R003", "R004", "R011", "R085", "R086", "R087", "R088", "R100", "R1000",
    "R101", "R102", "R103", "R104", "R106", "R107", "R109", "R1100", "R1101", "R1102",
    "R1103", "R111", "R112", "R113", "R114", "R117", "R118", "R119", "R120", "R1200",
    "R1201", "R1202", "R1203", "R1204", "R1205", "R1206", "R1207", "R1208", "R121",
    "R122", "R123", "R124", "R125", "R126", "R127", "R128", "R129", "R130", "R131",
    "R200", "R201", "R202", "R203", "R204", "R205", "R206", "R300", "R400", "R600", "R85",
];

const REVERSE_KEYWORDS: &[&str] = &["REVERSE", "RETURN", "EXCHANGE"];

pub fn is_reverse_status_code(code: &str) -> bool {
    !code.is_empty() && REVERSE_STATUS_CODES.contains(&code)
}

fn mentions_reverse(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let upper = text.to_uppercase();
    REVERSE_KEYWORDS.iter().any(|kw| upper.contains(kw))
}

/// Heuristic return-order check.
///
/// A record counts as a return when any of these hold:
/// - its order type is `REVERSE`
/// - its latest status code, or any history status code, is a known reverse code
/// - its latest status, or any history status or remark, mentions
///   REVERSE / RETURN / EXCHANGE
pub fn is_reverse_order(record: &TrackingRecord) -> bool {
    if record.ordertype == "REVERSE" {
        return true;
    }

    if is_reverse_status_code(&record.latest_status_code)
        || record
            .tracking_history
            .iter()
            .any(|h| is_reverse_status_code(&h.status_code))
    {
        return true;
    }

    mentions_reverse(&record.latest_status)
        || record
            .tracking_history
            .iter()
            .any(|h| mentions_reverse(&h.status) || mentions_reverse(&h.remarks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use returns_common::TrackingEvent;

    fn record(ordertype: &str, code: &str, status: &str) -> TrackingRecord {
        TrackingRecord {
            airwaybilno: "1".into(),
            orderno: "O-1".into(),
            ordertype: ordertype.into(),
            latest_status_code: code.into(),
            latest_status: status.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_allow_list_size() {
        assert_eq!(REVERSE_STATUS_CODES.len(), 61);
    }

    #[test]
    fn test_reverse_order_type_wins_regardless_of_status() {
        assert!(is_reverse_order(&record("REVERSE", "", "")));
        assert!(is_reverse_order(&record("REVERSE", "501", "DELIVERED")));
    }

    #[test]
    fn test_known_code_without_order_type() {
        assert!(is_reverse_order(&record("", "R087", "APPROVED")));
        assert!(is_reverse_order(&record("", "R85", "")));
        assert!(!is_reverse_order(&record("", "R999", "APPROVED")));
    }

    #[test]
    fn test_history_codes_and_keywords() {
        let mut r = record("FORWARD", "501", "DELIVERED");
        assert!(!is_reverse_order(&r));

        r.tracking_history.push(TrackingEvent {
            status: "IN TRANSIT".into(),
            status_code: "R200".into(),
            ..Default::default()
        });
        assert!(is_reverse_order(&r));

        let mut r = record("FORWARD", "99", "PICKED UP");
        r.tracking_history.push(TrackingEvent {
            status: "PICKED UP".into(),
            remarks: "customer wants an exchange".into(),
            ..Default::default()
        });
        assert!(is_reverse_order(&r));
    }

    #[test]
    fn test_latest_status_keyword_is_case_insensitive() {
        assert!(is_reverse_order(&record("", "", "Return to origin")));
        assert!(!is_reverse_order(&record("", "", "Out for delivery")));
    }
}

use crate::model::{FetchError, PhoneRecord, QueryFields};
use crate::parser::Ip138Parser;

/// Folds one fetch outcome into a uniform record. A page that fetched fine
/// but yielded no recognizable fields still counts as a success; only
/// transport problems mark a record as failed.
pub fn normalize(
    phone: &str,
    fetched: Result<String, FetchError>,
    parser: &Ip138Parser,
) -> PhoneRecord {
    match fetched {
        Ok(html) => PhoneRecord {
            phone: phone.to_string(),
            success: true,
            fields: parser.extract(&html),
            error: None,
        },
        Err(e) => PhoneRecord {
            phone: phone.to_string(),
            success: false,
            fields: QueryFields::default(),
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_becomes_failed_record() {
        let parser = Ip138Parser::new();
        let record = normalize("13800138000", Err(FetchError::HttpStatus(404)), &parser);
        assert_eq!(record.phone, "13800138000");
        assert!(!record.success);
        assert_eq!(record.error.as_deref(), Some("HTTP错误: 404"));
        assert!(record.fields.is_empty());
    }

    #[test]
    fn network_error_message_is_passed_through() {
        let parser = Ip138Parser::new();
        let record = normalize(
            "13900139000",
            Err(FetchError::Network("connection refused".to_string())),
            &parser,
        );
        assert!(!record.success);
        assert_eq!(record.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn fetched_page_is_extracted_into_fields() {
        let parser = Ip138Parser::new();
        let html = r#"
            <table>
              <tr><td>查询结果</td><td></td></tr>
              <tr><td>归属地</td><td>北京</td></tr>
            </table>"#;
        let record = normalize("13800138000", Ok(html.to_string()), &parser);
        assert!(record.success);
        assert_eq!(record.error, None);
        assert_eq!(record.fields.location.as_deref(), Some("北京"));
    }

    #[test]
    fn unparseable_page_is_still_a_success() {
        let parser = Ip138Parser::new();
        let record = normalize("13800138000", Ok("<html></html>".to_string()), &parser);
        assert!(record.success);
        assert!(record.fields.is_empty());
        assert_eq!(record.error, None);
    }
}

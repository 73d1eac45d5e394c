// ip138.com-specific HTML parsing
//
// The upstream markup is undocumented and shifts without notice, so the
// extractor runs three heuristics in decreasing order of confidence:
// structured table rows, then known CSS classes, then loose text patterns.
// The first one to produce anything wins outright; outputs are never merged
// across strategies.
use crate::model::QueryFields;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Marker phrase identifying a result table on the page.
const RESULT_MARKER: &str = "查询结果";

pub struct Ip138Parser {
    phone_re: Regex,
    location_re: Regex,
    operator_re: Regex,
}

impl Ip138Parser {
    pub fn new() -> Self {
        Self {
            phone_re: Regex::new(r"手机号码[:：]\s*(\S+)").unwrap(),
            location_re: Regex::new(r"归属地[:：]\s*([^\n]+)").unwrap(),
            operator_re: Regex::new(r"运营商[:：]\s*([^\n]+)").unwrap(),
        }
    }

    pub fn extract(&self, html: &str) -> QueryFields {
        let document = Html::parse_document(html);

        let fields = self.parse_by_table(&document);
        if !fields.is_empty() {
            return fields;
        }

        let fields = self.parse_by_class(&document);
        if !fields.is_empty() {
            return fields;
        }

        self.parse_by_pattern(&document)
    }

    /// Strategy 1: scan result tables row by row, reading the first cell as a
    /// label and the second as its value. Later marker tables overwrite
    /// earlier keys, matching how the page repeats its summary table.
    fn parse_by_table(&self, document: &Html) -> QueryFields {
        let table_sel = Selector::parse("table").unwrap();
        let row_sel = Selector::parse("tr").unwrap();
        let cell_sel = Selector::parse("td, th").unwrap();

        let mut fields = QueryFields::default();

        for table in document.select(&table_sel) {
            let table_text: String = table.text().collect();
            if !table_text.contains(RESULT_MARKER) {
                continue;
            }

            for row in table.select(&row_sel) {
                let cells: Vec<ElementRef> = row.select(&cell_sel).collect();
                if cells.len() < 2 {
                    continue;
                }

                let label = element_text(cells[0]).replace(' ', "");
                let value = element_text(cells[1]);

                // First match wins; a label carrying several markers lands on
                // the earliest branch.
                if label.contains("归属地") {
                    fields.location = Some(value);
                } else if label.contains("运营商") {
                    fields.operator = Some(value);
                } else if label.contains("区号") {
                    fields.area_code = Some(value);
                } else if label.contains("邮编") {
                    fields.zip_code = Some(value);
                }
            }
        }

        fields
    }

    /// Strategy 2: known CSS classes. The page has never carried classed
    /// area-code or zip-code nodes, so those two fields are out of reach here.
    fn parse_by_class(&self, document: &Html) -> QueryFields {
        let phone_sel = Selector::parse(".phone-number").unwrap();
        let location_sel = Selector::parse(".location").unwrap();
        let operator_sel = Selector::parse(".operator").unwrap();

        QueryFields {
            phone: document.select(&phone_sel).next().map(element_text),
            location: document.select(&location_sel).next().map(element_text),
            operator: document.select(&operator_sel).next().map(element_text),
            ..QueryFields::default()
        }
    }

    /// Strategy 3: flatten the whole document to text and pattern-match
    /// label/value lines. Last resort, loosest evidence.
    fn parse_by_pattern(&self, document: &Html) -> QueryFields {
        let text: String = document.root_element().text().collect();

        QueryFields {
            phone: capture(&self.phone_re, &text),
            location: capture(&self.location_re, &text),
            operator: capture(&self.operator_re, &text),
            ..QueryFields::default()
        }
    }
}

/// Concatenated text of an element with every segment trimmed, so markup
/// indentation never leaks into labels or values.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].to_string())
}

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{BillCategory, BillItem, Taka};

/// Display format for bill dates, e.g. `05-03-25`.
pub const BILL_DATE_FORMAT: &str = "%d-%m-%y";

/// Bill dates are entered as `YYYY-MM-DD`.
pub fn parse_bill_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("a bill needs at least one entry")]
    EmptyBill,
    #[error("failed to render bill document: {0}")]
    Render(#[from] std::fmt::Error),
}

/// One printed line of the bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRow {
    pub serial: String,
    pub name: String,
    pub card_no: String,
    pub designation: String,
    pub taka: Taka,
    pub remarks: String,
}

/// Finalized input for a renderer: label, formatted date, and rows in bill order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillDocument {
    pub category_label: String,
    pub date: String,
    pub rows: Vec<DocumentRow>,
    pub total: u64,
}

impl BillDocument {
    pub fn new(
        category: BillCategory,
        date: NaiveDate,
        items: &[BillItem],
    ) -> Result<Self, DocumentError> {
        if items.is_empty() {
            return Err(DocumentError::EmptyBill);
        }

        let rows = items
            .iter()
            .enumerate()
            .map(|(index, item)| DocumentRow {
                serial: format!("{:02}", index + 1),
                name: item.name.clone(),
                card_no: item.card_no.clone(),
                designation: item.designation.clone(),
                taka: item.taka,
                remarks: item.remarks.clone(),
            })
            .collect();

        Ok(Self {
            category_label: category.label().to_string(),
            date: date.format(BILL_DATE_FORMAT).to_string(),
            rows,
            total: items.iter().map(|item| u64::from(item.taka)).sum(),
        })
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "{}_{}.{extension}",
            self.category_label.replace(' ', "_"),
            self.date
        )
    }
}

/// Produces the final document bytes. Page layout belongs to the implementation.
pub trait BillRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn extension(&self) -> &'static str;
    fn render(&self, document: &BillDocument) -> Result<Vec<u8>, DocumentError>;
}

/// Fixed-width plain-text bill.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextBillRenderer;

impl BillRenderer for TextBillRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, document: &BillDocument) -> Result<Vec<u8>, DocumentError> {
        let mut out = String::new();
        writeln!(out, "{} BILL", document.category_label)?;
        writeln!(out, "Date: {}", document.date)?;
        writeln!(out)?;
        writeln!(
            out,
            "{:<4} {:<28} {:<10} {:<18} {:>8}  {}",
            "SL", "Name", "Card No", "Designation", "Amount", "Remarks"
        )?;
        for row in &document.rows {
            writeln!(
                out,
                "{:<4} {:<28} {:<10} {:<18} {:>8}  {}",
                row.serial, row.name, row.card_no, row.designation, row.taka, row.remarks
            )?;
        }
        writeln!(out)?;
        writeln!(out, "Total: {} Tk ({} entries)", document.total, document.rows.len())?;
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::domain::BillItemId;

    fn item(name: &str, taka: Taka) -> BillItem {
        BillItem {
            id: BillItemId::next(),
            name: name.to_string(),
            card_no: "1".to_string(),
            designation: "S/O".to_string(),
            taka,
            remarks: String::new(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 5).expect("valid date")
    }

    #[test]
    fn builds_rows_with_serials_and_total() {
        let items = vec![item("Alice", 800), item("Bob", 600)];
        let document =
            BillDocument::new(BillCategory::Holiday, date(), &items).expect("document builds");

        assert_eq!(document.date, "05-03-25");
        assert_eq!(document.category_label, "HOLIDAY");
        assert_eq!(document.rows[0].serial, "01");
        assert_eq!(document.rows[1].name, "Bob");
        assert_eq!(document.total, 1400);
        assert_eq!(document.file_name("txt"), "HOLIDAY_05-03-25.txt");
    }

    #[test]
    fn rejects_empty_bills() {
        let error = BillDocument::new(BillCategory::Tiffin, date(), &[]).expect_err("empty bill");
        assert!(matches!(error, DocumentError::EmptyBill));
    }

    #[test]
    fn text_renderer_lists_every_row() {
        let items = vec![item("Alice", 50)];
        let document = BillDocument::new(BillCategory::NightEntertainment, date(), &items)
            .expect("document builds");
        let bytes = TextBillRenderer.render(&document).expect("renders");
        let text = String::from_utf8(bytes).expect("utf-8");

        assert!(text.starts_with("NIGHT ENTERTAINMENT BILL\nDate: 05-03-25"));
        assert!(text.contains("01   Alice"));
        assert!(text.contains("Total: 50 Tk (1 entries)"));
        assert_eq!(
            document.file_name(TextBillRenderer.extension()),
            "NIGHT_ENTERTAINMENT_05-03-25.txt"
        );
    }
}

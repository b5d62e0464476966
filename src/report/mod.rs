//! Monthly PDF export. Selection and totals are computed up front so the
//! summary can also be shown in the TUI; the PDF itself is a plain A4
//! table drawn with the built-in Helvetica fonts.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_decimal::Decimal;

use crate::filter::sort_by_due_date_desc;
use crate::models::{format_wire_date, Transaction, TransactionType};
use crate::ui::util::{format_amount, truncate};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 14.0;
const ROW_HEIGHT: f32 = 7.0;
const TABLE_TOP: f32 = 250.0;
// 28 rows of 7mm from 250mm down always leaves room for the totals block.
const ROWS_PER_PAGE: usize = 28;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August",
    "September", "October", "November", "December",
];

#[derive(Debug, Clone)]
pub(crate) struct MonthlyReport {
    pub(crate) year: i32,
    pub(crate) month: u32,
    pub(crate) rows: Vec<Transaction>,
    pub(crate) total_income: Decimal,
    pub(crate) total_expense: Decimal,
    pub(crate) net_balance: Decimal,
}

impl MonthlyReport {
    /// Select the rows whose due date falls in the given month and total
    /// them. Rows without a due date never qualify. No status filter:
    /// pending and cancelled rows appear and count like any other.
    pub(crate) fn build(transactions: &[Transaction], year: i32, month: u32) -> Self {
        let mut rows: Vec<Transaction> = transactions
            .iter()
            .filter(|t| t.due_year_month() == Some((year, month)))
            .cloned()
            .collect();
        sort_by_due_date_desc(&mut rows);

        let mut total_income = Decimal::ZERO;
        let mut total_expense = Decimal::ZERO;
        for row in &rows {
            match row.kind {
                TransactionType::Income => total_income += row.amount,
                TransactionType::Expense => total_expense += row.amount,
            }
        }

        Self {
            year,
            month,
            rows,
            total_income,
            total_expense,
            net_balance: total_income - total_expense,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn default_filename(&self) -> String {
        format!("nextmove-report-{:02}-{}.pdf", self.month, self.year)
    }

    pub(crate) fn period_label(&self) -> String {
        let name = MONTH_NAMES
            .get(self.month as usize - 1)
            .copied()
            .unwrap_or("Unknown");
        format!("{name} {}", self.year)
    }

    /// Page chunks for the table body. The last chunk is never empty, so
    /// the document never ends on a blank page.
    fn paginate(&self) -> Vec<&[Transaction]> {
        self.rows.chunks(ROWS_PER_PAGE).collect()
    }

    pub(crate) fn write_pdf(&self, path: &Path) -> Result<()> {
        let title = format!("NextMove Report - {}", self.period_label());
        let (doc, first_page, first_layer) =
            PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .context("Failed to load PDF font")?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .context("Failed to load PDF font")?;

        let chunks = self.paginate();
        let mut layer = doc.get_page(first_page).get_layer(first_layer);
        self.draw_header(&layer, &font, &bold);
        draw_table_header(&layer, &bold);

        if chunks.is_empty() {
            layer.use_text(
                "No transactions for this month",
                10.0,
                Mm(MARGIN),
                Mm(TABLE_TOP - ROW_HEIGHT),
                &font,
            );
        }

        let mut y = TABLE_TOP - ROW_HEIGHT;
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                let (page, new_layer) =
                    doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
                layer = doc.get_page(page).get_layer(new_layer);
                self.draw_header(&layer, &font, &bold);
                draw_table_header(&layer, &bold);
                y = TABLE_TOP - ROW_HEIGHT;
            }
            for row in *chunk {
                draw_row(&layer, &font, row, y);
                y -= ROW_HEIGHT;
            }
        }

        self.draw_totals(&layer, &font, &bold, y - ROW_HEIGHT);

        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        doc.save(&mut BufWriter::new(file))
            .context("Failed to write PDF")?;
        Ok(())
    }

    fn draw_header(&self, layer: &PdfLayerReference, font: &IndirectFontRef, bold: &IndirectFontRef) {
        layer.use_text("NextMove", 18.0, Mm(MARGIN), Mm(PAGE_HEIGHT - 20.0), bold);
        layer.use_text(
            format!("Monthly report - {}", self.period_label()),
            12.0,
            Mm(MARGIN),
            Mm(PAGE_HEIGHT - 28.0),
            font,
        );
    }

    fn draw_totals(
        &self,
        layer: &PdfLayerReference,
        font: &IndirectFontRef,
        bold: &IndirectFontRef,
        y: f32,
    ) {
        layer.use_text("Totals", 11.0, Mm(MARGIN), Mm(y), bold);
        layer.use_text(
            format!("Income:  {}", format_amount(self.total_income)),
            10.0,
            Mm(MARGIN),
            Mm(y - ROW_HEIGHT),
            font,
        );
        layer.use_text(
            format!("Expense: {}", format_amount(self.total_expense)),
            10.0,
            Mm(MARGIN),
            Mm(y - 2.0 * ROW_HEIGHT),
            font,
        );
        layer.use_text(
            format!("Net:     {}", format_amount(self.net_balance)),
            10.0,
            Mm(MARGIN),
            Mm(y - 3.0 * ROW_HEIGHT),
            font,
        );
    }
}

// Column x positions in mm.
const COL_TYPE: f32 = MARGIN;
const COL_TITLE: f32 = 38.0;
const COL_DESC: f32 = 80.0;
const COL_AMOUNT: f32 = 122.0;
const COL_STATUS: f32 = 152.0;
const COL_DUE: f32 = 178.0;

fn draw_table_header(layer: &PdfLayerReference, bold: &IndirectFontRef) {
    let y = Mm(TABLE_TOP);
    layer.use_text("Type", 10.0, Mm(COL_TYPE), y, bold);
    layer.use_text("Title", 10.0, Mm(COL_TITLE), y, bold);
    layer.use_text("Description", 10.0, Mm(COL_DESC), y, bold);
    layer.use_text("Amount", 10.0, Mm(COL_AMOUNT), y, bold);
    layer.use_text("Status", 10.0, Mm(COL_STATUS), y, bold);
    layer.use_text("Due date", 10.0, Mm(COL_DUE), y, bold);
}

fn draw_row(layer: &PdfLayerReference, font: &IndirectFontRef, row: &Transaction, y: f32) {
    let y = Mm(y);
    let due = row
        .due_date
        .as_deref()
        .map(format_wire_date)
        .unwrap_or_default();
    layer.use_text(row.kind.label(), 9.0, Mm(COL_TYPE), y, font);
    layer.use_text(truncate(row.display_title(), 15), 9.0, Mm(COL_TITLE), y, font);
    layer.use_text(truncate(&row.description, 15), 9.0, Mm(COL_DESC), y, font);
    layer.use_text(format_amount(row.amount), 9.0, Mm(COL_AMOUNT), y, font);
    layer.use_text(row.status.as_str(), 9.0, Mm(COL_STATUS), y, font);
    layer.use_text(due, 9.0, Mm(COL_DUE), y, font);
}

#[cfg(test)]
mod tests;

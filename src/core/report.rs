//! Event report generation.
//!
//! [`build_event_report`] gathers everything an invoice-style summary needs and
//! [`render_event_pdf`] lays it out as an A4 PDF using the built-in Helvetica fonts.

use crate::{
    core::event::{EventDetail, get_event_detail},
    entities::{client, event, payment, sub_event},
    errors::{Error, Result},
};
use chrono::Utc;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use sea_orm::DatabaseConnection;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_LEFT: Mm = Mm(20.0);
const MARGIN_TOP: Mm = Mm(280.0);
const MARGIN_BOTTOM: Mm = Mm(20.0);
const LINE_HEIGHT: Mm = Mm(5.0);

/// Everything shown on an event report.
#[derive(Debug, Clone)]
pub struct EventReport {
    /// The event
    pub event: event::Model,
    /// Owning client, if still on file
    pub client: Option<client::Model>,
    /// Phases in start order
    pub sub_events: Vec<sub_event::Model>,
    /// Payments, oldest first
    pub payments: Vec<payment::Model>,
    /// Sum of payments
    pub received: f64,
    /// Budget minus received
    pub pending: f64,
}

impl From<EventDetail> for EventReport {
    fn from(detail: EventDetail) -> Self {
        Self {
            event: detail.event,
            client: detail.client,
            sub_events: detail.sub_events,
            payments: detail.payments,
            received: detail.received_total,
            pending: detail.pending_balance,
        }
    }
}

/// Loads the data for an event report.
pub async fn build_event_report(db: &DatabaseConnection, event_id: i64) -> Result<EventReport> {
    get_event_detail(db, event_id).await.map(EventReport::from)
}

/// Formats a rupee amount like "Rs. 1,25,000.00" using Indian digit grouping.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let grouped = if whole.len() <= 3 {
        whole.to_string()
    } else {
        let (head, last_three) = whole.split_at(whole.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            groups.push(right);
            rest = left;
        }
        groups.push(rest);
        groups.reverse();
        format!("{},{last_three}", groups.join(","))
    };

    format!("{sign}Rs. {grouped}.{fraction}")
}

fn pdf_error(e: impl std::fmt::Display) -> Error {
    Error::Report {
        message: e.to_string(),
    }
}

/// Writes lines top to bottom, starting a new page when the current one is full.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: Mm,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: MARGIN_TOP,
            pages: 1,
        })
    }

    fn ensure_room(&mut self, height: Mm) {
        if self.y - height < MARGIN_BOTTOM {
            self.pages += 1;
            let (page, layer) =
                self.doc
                    .add_page(PAGE_WIDTH, PAGE_HEIGHT, format!("Layer {}", self.pages));
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = MARGIN_TOP;
        }
    }

    /// Writes cells at the given x offsets on one line.
    fn row(&mut self, cells: &[(Mm, String)], size: f32, bold: bool) {
        self.ensure_room(LINE_HEIGHT);
        let font = if bold { &self.bold } else { &self.font };
        for (x, text) in cells {
            self.layer.use_text(text.as_str(), size, *x, self.y, font);
        }
        self.y = self.y - LINE_HEIGHT;
    }

    fn line(&mut self, text: impl Into<String>, size: f32, bold: bool) {
        self.row(&[(MARGIN_LEFT, text.into())], size, bold);
    }

    fn gap(&mut self, height: Mm) {
        self.y = self.y - height;
    }

    /// Document bytes and the number of pages written.
    fn finish(self) -> Result<(Vec<u8>, usize)> {
        let bytes = self.doc.save_to_bytes().map_err(pdf_error)?;
        Ok((bytes, self.pages))
    }
}

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%d %b %Y").to_string())
}

/// Renders an event report as PDF bytes.
pub fn render_event_pdf(report: &EventReport, company_name: &str) -> Result<Vec<u8>> {
    render_document(report, company_name).map(|(bytes, _)| bytes)
}

fn render_document(report: &EventReport, company_name: &str) -> Result<(Vec<u8>, usize)> {
    let title = format!("{company_name} - {}", report.event.name);
    let mut page = PageWriter::new(&title)?;

    page.line(company_name, 18.0, true);
    page.gap(Mm(2.0));
    page.line(
        format!("Event report generated {}", Utc::now().format("%d %b %Y %H:%M UTC")),
        9.0,
        false,
    );
    page.gap(Mm(4.0));

    page.line(report.event.name.clone(), 14.0, true);
    if let Some(client) = &report.client {
        page.line(format!("Client: {} ({})", client.name, client.phone), 10.0, false);
    }
    page.line(
        format!("Payment due: {}", date_or_dash(report.event.payment_date)),
        10.0,
        false,
    );
    if !report.event.notes.is_empty() {
        page.line(format!("Notes: {}", report.event.notes), 10.0, false);
    }
    page.gap(Mm(3.0));

    let value_x = Mm(70.0);
    for (label, amount) in [
        ("Total budget", report.event.total_budget),
        ("Received", report.received),
        ("Pending", report.pending),
    ] {
        page.row(
            &[(MARGIN_LEFT, label.to_string()), (value_x, format_currency(amount))],
            11.0,
            label == "Pending",
        );
    }
    page.gap(Mm(5.0));

    if !report.sub_events.is_empty() {
        page.line("Phases", 13.0, true);
        let columns = [MARGIN_LEFT, Mm(70.0), Mm(105.0), Mm(135.0), Mm(165.0)];
        page.row(
            &[
                (columns[0], "Name".to_string()),
                (columns[1], "Budget".to_string()),
                (columns[2], "Start".to_string()),
                (columns[3], "Wind-up".to_string()),
                (columns[4], "Status".to_string()),
            ],
            10.0,
            true,
        );
        for phase in &report.sub_events {
            page.row(
                &[
                    (columns[0], phase.name.clone()),
                    (columns[1], format_currency(phase.budget)),
                    (columns[2], date_or_dash(phase.start_date)),
                    (columns[3], date_or_dash(phase.windup_date)),
                    (columns[4], format!("{:?}", phase.status)),
                ],
                9.0,
                false,
            );
            if !phase.address.is_empty() {
                page.row(&[(Mm(25.0), format!("Venue: {}", phase.address))], 8.0, false);
            }
        }
        page.gap(Mm(5.0));
    }

    page.line("Payment history", 13.0, true);
    if report.payments.is_empty() {
        page.line("No payments recorded", 9.0, false);
    } else {
        let columns = [MARGIN_LEFT, Mm(70.0), Mm(120.0)];
        page.row(
            &[
                (columns[0], "Date".to_string()),
                (columns[1], "Type".to_string()),
                (columns[2], "Amount".to_string()),
            ],
            10.0,
            true,
        );
        for payment in &report.payments {
            page.row(
                &[
                    (columns[0], payment.date.format("%d %b %Y").to_string()),
                    (columns[1], format!("{:?}", payment.payment_type)),
                    (columns[2], format_currency(payment.amount)),
                ],
                9.0,
                false,
            );
        }
    }

    tracing::debug!(event_id = report.event.id, pages = page.pages, "rendered event report");
    page.finish()
}

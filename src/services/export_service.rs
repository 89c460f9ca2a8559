//! Printable layout of an itinerary: title, summary block, one row per day
//! and the total. Renderers turn the layout into bytes.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use thiserror::Error;

use crate::models::trip::{ItineraryResult, TripParameters};

pub const CURRENCY: &str = "LKR";

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRow {
    pub day: u32,
    pub activity: String,
    pub accommodation: f64,
    pub transport: f64,
    pub daily_total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryDocument {
    pub title: String,
    pub summary: Vec<(String, String)>,
    pub rows: Vec<DocumentRow>,
    pub total: f64,
}

impl ItineraryDocument {
    pub fn from_result(title: &str, params: &TripParameters, result: &ItineraryResult) -> Self {
        let interests = params
            .interests
            .iter()
            .map(|interest| interest.label())
            .collect::<Vec<_>>()
            .join(", ");

        let mut vehicle = format!("{} ({})", result.vehicle.model, result.vehicle.vehicle_type);
        if let Some(class) = &result.vehicle.vehicle_class {
            vehicle.push_str(&format!(", {}", class));
        }

        let mut summary = vec![
            ("Days".to_string(), params.days.to_string()),
            ("Guests".to_string(), params.guests.to_string()),
            ("Interests".to_string(), interests),
            (
                "Hotel".to_string(),
                format!(
                    "{}, {} ({} star, {})",
                    result.hotel.hotel_name,
                    result.hotel.city,
                    result.hotel.stars,
                    result.hotel.category
                ),
            ),
            ("Vehicle".to_string(), vehicle),
            (
                "Budget".to_string(),
                format!("{} {:.2}", CURRENCY, params.budget),
            ),
        ];
        if result.over_budget {
            summary.push((
                "Note".to_string(),
                "Estimated cost exceeds the stated budget".to_string(),
            ));
        }

        let rows = result
            .days
            .iter()
            .map(|plan| DocumentRow {
                day: plan.day,
                activity: plan.activity.clone(),
                accommodation: plan.accommodation_cost,
                transport: plan.transport_cost,
                daily_total: plan.daily_total,
            })
            .collect();

        Self {
            title: title.to_string(),
            summary,
            rows,
            total: result.total_cost,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to render PDF: {0}")]
    Pdf(#[from] printpdf::Error),
}

pub trait DocumentRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn file_extension(&self) -> &'static str;
    fn render(&self, document: &ItineraryDocument) -> Result<Vec<u8>, ExportError>;
}

/// Renderer for a `?format=` value; anything but `txt` gets a PDF.
pub fn renderer_for(format: Option<&str>) -> Box<dyn DocumentRenderer> {
    match format.map(str::trim) {
        Some(f) if f.eq_ignore_ascii_case("txt") || f.eq_ignore_ascii_case("text") => {
            Box::new(TextRenderer)
        }
        _ => Box::new(PdfRenderer),
    }
}

/// Fixed-width plain text.
pub struct TextRenderer;

const ACTIVITY_WIDTH: usize = 36;

impl DocumentRenderer for TextRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, document: &ItineraryDocument) -> Result<Vec<u8>, ExportError> {
        Ok(render_text(document).into_bytes())
    }
}

fn render_text(document: &ItineraryDocument) -> String {
    let mut out = String::new();

    out.push_str(&document.title);
    out.push('\n');
    out.push_str(&"=".repeat(document.title.chars().count()));
    out.push_str("\n\n");

    let label_width = document
        .summary
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0);
    for (label, value) in &document.summary {
        out.push_str(&format!("{:<width$}  {}\n", format!("{}:", label), value, width = label_width + 1));
    }
    out.push('\n');

    let header = format!(
        "{:<5} {:<aw$} {:>13} {:>11} {:>11}",
        "Day",
        "Activity",
        "Accommodation",
        "Transport",
        "Total",
        aw = ACTIVITY_WIDTH
    );
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"-".repeat(header.len()));
    out.push('\n');

    for row in &document.rows {
        out.push_str(&format!(
            "{:<5} {:<aw$} {:>13.2} {:>11.2} {:>11.2}\n",
            row.day,
            truncate(&row.activity, ACTIVITY_WIDTH),
            row.accommodation,
            row.transport,
            row.daily_total,
            aw = ACTIVITY_WIDTH
        ));
    }

    out.push_str(&"-".repeat(header.len()));
    out.push('\n');
    out.push_str(&format!("Total: {} {:.2}\n", CURRENCY, document.total));

    out
}

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 5.0;
const BODY_FONT_SIZE: f32 = 9.0;
const TITLE_FONT_SIZE: f32 = 16.0;

/// A4 pages set in Courier so the fixed-width table lines up.
pub struct PdfRenderer;

struct PdfCursor {
    doc: printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PdfCursor {
    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        if self.y < MARGIN_MM {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Itinerary");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        self.layer.use_text(text, size, Mm(MARGIN_MM), Mm(self.y), font);
        self.y -= LINE_HEIGHT_MM;
    }
}

impl DocumentRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, document: &ItineraryDocument) -> Result<Vec<u8>, ExportError> {
        let (doc, page, layer) = PdfDocument::new(
            document.title.as_str(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Itinerary",
        );
        let title_font = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let body_font = doc.add_builtin_font(BuiltinFont::Courier)?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut cursor = PdfCursor {
            doc,
            layer,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        };
        cursor.line(&document.title, TITLE_FONT_SIZE, &title_font);
        cursor.y -= LINE_HEIGHT_MM;

        // title and underline are already set above
        for line in render_text(document).lines().skip(2) {
            cursor.line(line, BODY_FONT_SIZE, &body_font);
        }

        Ok(cursor.doc.save_to_bytes()?)
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// `"My Kandy Trip"` -> `"my-kandy-trip.txt"`
pub fn attachment_filename(title: &str, extension: &str) -> String {
    let mut slug = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let slug = if slug.is_empty() { "itinerary" } else { slug };
    format!("{}.{}", slug, extension)
}

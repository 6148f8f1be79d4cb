use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::fs::File;
use std::io::Write;
use std::path::Path;

// Helvetica glyph width approximation, in points per point of font size
const CHAR_WIDTH: f32 = 0.55;

/// Builds a PDF of titled, paginated tables (A4 landscape, Helvetica).
pub struct PdfDocument {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    page_refs: Vec<Ref>,
    next_id: i32,

    page_w: f32,
    page_h: f32,
    margin: f32,
    row_h: f32,

    font_size: f32,
    title_font_size: f32,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            font_id,
            page_refs: Vec::new(),
            next_id: 4,

            page_w: 842.0,
            page_h: 595.0,
            margin: 36.0,
            row_h: 18.0,

            font_size: 8.0,
            title_font_size: 13.0,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    /// Register a page and return the id its content stream must be written to.
    fn add_page(&mut self) -> Ref {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();
        self.page_refs.push(page_id);

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, self.page_w, self.page_h))
            .contents(content_id);
        page.resources().fonts().pair(Name(b"F1"), self.font_id);

        content_id
    }

    fn text(&self, content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
        let encoded = latin1(text);
        content.begin_text();
        content.set_font(Name(b"F1"), size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(&encoded));
        content.end_text();
    }

    fn fill_band(&self, content: &mut Content, y: f32, width: f32, gray: f32) {
        content.save_state();
        content.set_fill_rgb(gray, gray, gray + 0.03);
        content.rect(self.margin, y, width, self.row_h);
        content.fill_nonzero();
        content.restore_state();
    }

    fn row(&self, content: &mut Content, y: f32, widths: &[f32], cells: &[String]) {
        let mut x = self.margin;
        for (cell, &w) in cells.iter().zip(widths) {
            let fit = fit_to_width(cell, w - 6.0, self.font_size);
            self.text(content, x + 3.0, y + 5.5, self.font_size, &fit);

            content.save_state();
            content.set_stroke_rgb(0.65, 0.65, 0.65);
            content.rect(x, y, w, self.row_h);
            content.stroke();
            content.restore_state();

            x += w;
        }
    }

    /// Column widths from header and cell lengths, scaled down to the page.
    fn column_widths(&self, headers: &[String], rows: &[Vec<String>]) -> Vec<f32> {
        let unit = self.font_size * CHAR_WIDTH;
        let mut widths: Vec<f32> = headers
            .iter()
            .map(|h| h.chars().count() as f32 * unit + 8.0)
            .collect();

        for row in rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = w.max(cell.chars().count() as f32 * unit + 8.0);
            }
        }

        let available = self.page_w - 2.0 * self.margin;
        let total: f32 = widths.iter().sum();
        if total > available {
            let scale = available / total;
            widths.iter_mut().for_each(|w| *w *= scale);
        }
        widths
    }

    /// Append one table, starting on a new page and continuing on as many
    /// pages as its rows need. The header row repeats on every page.
    pub fn add_table(&mut self, title: &str, headers: &[String], rows: &[Vec<String>]) {
        let widths = self.column_widths(headers, rows);
        let table_w: f32 = widths.iter().sum();
        let top = self.page_h - self.margin - 30.0;

        let mut remaining = rows;
        let mut page_no = 1;

        loop {
            let content_id = self.add_page();
            let mut content = Content::new();

            let heading = if page_no == 1 {
                title.to_string()
            } else {
                format!("{title} (cont.)")
            };
            self.text(&mut content, self.margin, self.page_h - self.margin - 8.0, self.title_font_size, &heading);
            self.text(
                &mut content,
                self.page_w - self.margin - 50.0,
                self.margin - 20.0,
                self.font_size,
                &format!("Page {page_no}"),
            );

            let mut y = top;
            self.fill_band(&mut content, y, table_w, 0.85);
            self.row(&mut content, y, &widths, headers);
            y -= self.row_h;

            let mut used = 0;
            for (i, cells) in remaining.iter().enumerate() {
                if y < self.margin {
                    break;
                }
                if i % 2 == 0 {
                    self.fill_band(&mut content, y, table_w, 0.95);
                }
                self.row(&mut content, y, &widths, cells);
                y -= self.row_h;
                used += 1;
            }

            self.pdf.stream(content_id, &content.finish());

            remaining = &remaining[used..];
            if remaining.is_empty() {
                break;
            }
            page_no += 1;
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    pub fn save(mut self, path: &Path) -> std::io::Result<()> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .count(self.page_refs.len() as i32)
            .kids(self.page_refs.iter().copied());

        let bytes = self.pdf.finish();
        let mut f = File::create(path)?;
        f.write_all(&bytes)?;
        Ok(())
    }
}

/// Helvetica's built-in encoding covers Latin-1 only; other characters become '?'.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .collect()
}

fn fit_to_width(text: &str, width: f32, size: f32) -> String {
    let max_chars = (width / (size * CHAR_WIDTH)).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut s: String = text.chars().take(max_chars.saturating_sub(2)).collect();
    s.push_str("..");
    s
}

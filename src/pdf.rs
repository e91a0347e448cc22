//! PDF Export Module
//! Writes a single-page PDF with one embedded JPEG image.
//!
//! Uses direct object/xref generation: a page the size of the image
//! (96 dpi pixels to 72 dpi points) fully covered by a DCTDecode XObject.

/// Points per pixel at 96 dpi.
const PT_PER_PX: f64 = 0.75;

/// PDF generator for chart exports
pub struct PdfWriter;

impl PdfWriter {
    /// Wrap JPEG bytes of a `width_px` x `height_px` image into a one-page PDF.
    pub fn single_image_page(jpeg: &[u8], width_px: u32, height_px: u32) -> Vec<u8> {
        let page_w = width_px as f64 * PT_PER_PX;
        let page_h = height_px as f64 * PT_PER_PX;
        let content = format!("q\n{:.2} 0 0 {:.2} 0 0 cm\n/Im0 Do\nQ\n", page_w, page_h);

        let mut out: Vec<u8> = Vec::with_capacity(jpeg.len() + 1024);
        let mut offsets: Vec<usize> = Vec::with_capacity(5);

        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        // 1. Catalog
        offsets.push(out.len());
        out.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        // 2. Page tree
        offsets.push(out.len());
        out.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

        // 3. Page
        offsets.push(out.len());
        out.extend_from_slice(
            format!(
                "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /XObject << /Im0 4 0 R >> >> /Contents 5 0 R >>\nendobj\n",
                page_w, page_h
            )
            .as_bytes(),
        );

        // 4. Image
        offsets.push(out.len());
        out.extend_from_slice(
            format!(
                "4 0 obj\n<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream\n",
                width_px,
                height_px,
                jpeg.len()
            )
            .as_bytes(),
        );
        out.extend_from_slice(jpeg);
        out.extend_from_slice(b"\nendstream\nendobj\n");

        // 5. Content stream
        offsets.push(out.len());
        out.extend_from_slice(
            format!(
                "5 0 obj\n<< /Length {} >>\nstream\n{}endstream\nendobj\n",
                content.len(),
                content
            )
            .as_bytes(),
        );

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                offsets.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );

        out
    }
}

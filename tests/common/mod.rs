//! Shared fixtures: in-memory EPUB and PDF builders.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use tracing_subscriber::EnvFilter;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Route library logs to the test output when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Wrap a body fragment into a standalone XHTML document.
pub fn xhtml(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\"><body>{body}</body></html>\n"
    )
}

/// Build an EPUB 2 container whose spine lists `chapters` in order.
pub fn build_epub(chapters: &[String]) -> Vec<u8> {
    build_epub_with_extras(chapters, &[])
}

/// Like [`build_epub`], plus `(file name, xhtml)` documents that appear in
/// the manifest but not in the spine.
pub fn build_epub_with_extras(chapters: &[String], extras: &[(&str, String)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut add = |name: &str, data: &[u8]| {
        zip.start_file(name, stored).expect("start zip entry");
        zip.write_all(data).expect("write zip entry");
    };

    add("mimetype", b"application/epub+zip");
    add(
        "META-INF/container.xml",
        br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#,
    );

    let mut manifest = String::new();
    let mut spine = String::new();
    let mut nav = String::new();
    for (i, _) in chapters.iter().enumerate() {
        let n = i + 1;
        manifest.push_str(&format!(
            "    <item id=\"c{n}\" href=\"c{n}.xhtml\" media-type=\"application/xhtml+xml\"/>\n"
        ));
        spine.push_str(&format!("    <itemref idref=\"c{n}\"/>\n"));
        nav.push_str(&format!(
            "    <navPoint id=\"n{n}\" playOrder=\"{n}\"><navLabel><text>Chapter {n}</text></navLabel><content src=\"c{n}.xhtml\"/></navPoint>\n"
        ));
    }
    for (i, (name, _)) in extras.iter().enumerate() {
        manifest.push_str(&format!(
            "    <item id=\"x{i}\" href=\"{name}\" media-type=\"application/xhtml+xml\"/>\n"
        ));
    }

    let opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Fixture</dc:title>
    <dc:identifier id="bookid">urn:uuid:00000000-0000-0000-0000-000000000001</dc:identifier>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>
"#
    );
    add("OEBPS/content.opf", opf.as_bytes());

    let ncx = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="urn:uuid:00000000-0000-0000-0000-000000000001"/></head>
  <docTitle><text>Fixture</text></docTitle>
  <navMap>
{nav}  </navMap>
</ncx>
"#
    );
    add("OEBPS/toc.ncx", ncx.as_bytes());

    for (i, chapter) in chapters.iter().enumerate() {
        add(&format!("OEBPS/c{}.xhtml", i + 1), chapter.as_bytes());
    }
    for (name, body) in extras {
        add(&format!("OEBPS/{name}"), body.as_bytes());
    }

    zip.finish().expect("finish zip").into_inner()
}

/// A two-page PDF with a three-entry outline:
///
/// ```text
/// Chapter 1      → page 1
///   Section 1.1  → page 2
/// Chapter 2      → page 2
/// ```
pub fn build_pdf() -> Vec<u8> {
    let page1 = "BT /F1 24 Tf 72 700 Td (Hello first page) Tj ET";
    let page2 = "BT /F1 24 Tf 72 700 Td (Second page text) Tj ET";

    let objects = vec![
        "<< /Type /Catalog /Pages 2 0 R /Outlines 5 0 R /PageMode /UseOutlines >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R 4 0 R] /Count 2 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 9 0 R >> >> /Contents 10 0 R >>"
            .to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 9 0 R >> >> /Contents 11 0 R >>"
            .to_string(),
        "<< /Type /Outlines /First 6 0 R /Last 8 0 R /Count 3 >>".to_string(),
        "<< /Title (Chapter 1) /Parent 5 0 R /Next 8 0 R /First 7 0 R /Last 7 0 R \
         /Count 1 /Dest [3 0 R /Fit] >>"
            .to_string(),
        "<< /Title (Section 1.1) /Parent 6 0 R /Dest [4 0 R /Fit] >>".to_string(),
        "<< /Title (Chapter 2) /Parent 5 0 R /Prev 6 0 R /Dest [4 0 R /Fit] >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", page1.len(), page1),
        format!("<< /Length {} >>\nstream\n{}\nendstream", page2.len(), page2),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_at = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for off in offsets {
        out.push_str(&format!("{:010} 00000 n \n", off));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    out.into_bytes()
}

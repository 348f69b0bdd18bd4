//! Synthetic statement PDFs built with lopdf.

use lopdf::{dictionary, Document, Object, Stream};

/// A text run placed at `(x, y)` in PDF user space.
pub type Run<'a> = (i64, i64, &'a str);

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}

/// One page per entry, each run drawn with Helvetica 9pt.
pub fn statement_pdf(pages: &[Vec<Run<'_>>]) -> Vec<u8> {
    let streams: Vec<String> = pages
        .iter()
        .map(|runs| {
            runs.iter()
                .map(|(x, y, text)| format!("BT /F1 9 Tf {x} {y} Td ({}) Tj ET\n", escape(text)))
                .collect()
        })
        .collect();
    pdf_with_content(&streams)
}

/// One page per raw content stream, `/F1` bound to Helvetica.
pub fn pdf_with_content(streams: &[String]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut page_ids = Vec::new();
    for content in streams {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.clone().into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        page_ids.push(page_id);
    }

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        "Count" => Object::Integer(page_ids.len() as i64),
    });
    for &page_id in &page_ids {
        if let Ok(dict) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Title, period banner, column header and footer around `rows`.
pub fn with_boilerplate<'a>(rows: &[Run<'a>]) -> Vec<Run<'a>> {
    let mut runs = vec![
        (40, 800, "Pockets Transactions History"),
        (40, 785, "Menampilkan transaksi 17 Jun 2021 - 12 Des 2025"),
        (40, 770, "Tanggal & waktu"),
        (120, 770, "Sumber/Tujuan"),
        (250, 770, "Rincian"),
        (350, 770, "Catatan"),
        (450, 770, "Jumlah"),
        (520, 770, "Saldo"),
    ];
    runs.extend_from_slice(rows);
    runs.push((40, 30, "Halaman 1 dari 1"));
    runs
}

//! # Pipeline Tests
//!
//! End-to-end checks from template lines to text, HTML and ESC/POS bytes.

use pretty_assertions::assert_eq;

use tagprint::TagprintError;
use tagprint::ir::{FsAssets, Planner};
use tagprint::layout::Document;
use tagprint::layout::formatters::char_len;
use tagprint::markup::{repair, to_repaired};
use tagprint::protocol::codepage::Codepage;
use tagprint::rich::{Block, RichDocument};

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// ============================================================================
// LAYOUT
// ============================================================================

#[test]
fn header_and_justify_run_share_column_offsets() {
    let template = [
        "<T>Header",
        "Qty|Item|Price",
        "<J>1|Widget|$5.00",
        "<J>12|Gadget|$120.00",
    ];
    let doc = Document::build(&template, 20);
    let lines = doc.text_lines();

    assert_eq!(
        lines,
        vec![
            "░░░░ H e a d e r ░░░",
            "Qty|Item|Price",
            "1     Widget   $5.00",
            "12    Gadget $120.00",
        ]
    );

    let (a, b) = (&lines[2], &lines[3]);
    assert_eq!(a.find("Widget"), b.find("Gadget"));
    assert_eq!(char_len(a), 20);
    assert_eq!(char_len(b), 20);
    assert!(doc.diagnostics().is_empty());
}

#[test]
fn non_justify_formatters_fill_the_width() {
    let template = ["<L>left", "<R>right", "<C>mid", "<T>Ti", "<F>=", "plain"];
    let doc = Document::build(&template, 16);
    for (line, text) in doc.lines().iter().zip(doc.text_lines()) {
        if line.tag.kind != tagprint::template::TagKind::Generic {
            assert_eq!(char_len(&text), 16, "{:?}", text);
        }
    }
}

#[test]
fn center_expands_and_fills_the_label() {
    let doc = Document::build(&["<C>abc", "<C>Total"], 10);
    assert_eq!(doc.text_lines(), vec!["░░░a b c░░", "░T o t a l"]);
}

#[test]
fn justify_run_with_fewer_cells_keeps_column_offsets() {
    let doc = Document::build(&["<J>a|b|c", "<J>x|y"], 20);
    let lines = doc.text_lines();
    assert_eq!(lines, vec!["a                b c", "x                y  "]);
    assert_eq!(lines[0].find('b'), lines[1].find('y'));
    assert!(lines.iter().all(|l| char_len(l) == 20));
}

#[test]
fn left_overflow_truncates_to_width() {
    let doc = Document::build(&["<L>This line is far too long for the paper"], 10);
    assert_eq!(doc.text_lines(), vec!["This line "]);
    assert!(matches!(
        doc.diagnostics(),
        [TagprintError::WidthOverflow { width: 10, .. }]
    ));
}

#[test]
fn flatten_has_no_control_lines() {
    let template = [
        "<EB>",
        "<L>Total",
        "<DB>",
        "<BEEP:2,5>",
        "<DRAWER>",
        "<XCT:27,64>",
        "<LF:2>",
        "<WAIT:10>",
        "<CUT>",
    ];
    let doc = Document::build(&template, 8);
    assert_eq!(doc.flatten().lines().collect::<Vec<_>>(), vec!["Total   "]);
}

// ============================================================================
// PROTOCOL
// ============================================================================

#[test]
fn beep_encodes_its_parameters_verbatim() {
    let alone = Document::build(&["<BEEP:2,5>"], 20).to_bytes();
    let surrounded = Document::build(&["<L>before", "<BEEP:2,5>", "<C>after"], 20).to_bytes();

    let beep = [0x1B, 0x42, 0x02, 0x05];
    assert!(alone.ends_with(&beep));
    assert!(contains(&surrounded, &beep));
}

#[test]
fn job_starts_with_init_and_codepage() {
    let assets = FsAssets::new(".");
    let doc = Document::build(&["<L>€"], 4);
    let bytes = Planner::new(Codepage::from_id(1252), 576, &assets)
        .plan(&doc)
        .to_bytes();
    assert_eq!(&bytes[..5], &[0x1B, 0x40, 0x1B, 0x74, 16]);
    assert!(contains(&bytes, &[0x80, b' ', b' ', b' ', 0x0A]));
}

#[test]
fn raster_encoding_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let img = image::GrayImage::from_fn(40, 30, |x, y| {
        image::Luma([if (x / 4 + y / 4) % 2 == 0 { 0 } else { 255 }])
    });
    img.save(dir.path().join("logo.png")).unwrap();

    let doc = Document::build(&["<BMP:logo.png>", "<CUT>"], 20);
    let assets = FsAssets::new(dir.path());
    let planner = Planner::new(Codepage::Cp437, 576, &assets);

    let first = planner.plan(&doc).to_bytes();
    let second = planner.plan(&doc).to_bytes();
    assert_eq!(first, second);
    // 40 columns, two 24-row bands
    assert_eq!(first.windows(5).filter(|w| *w == [0x1B, b'*', 33, 40, 0]).count(), 2);
}

#[test]
fn missing_bitmap_skips_only_the_image() {
    let dir = tempfile::tempdir().unwrap();
    let doc = Document::build(&["<BMP:nope.png>", "<L>still here"], 12);
    let assets = FsAssets::new(dir.path());
    let plan = Planner::new(Codepage::Cp437, 576, &assets).plan(&doc);

    assert!(matches!(plan.skipped.as_slice(), [TagprintError::AssetMissing { .. }]));
    assert!(contains(&plan.to_bytes(), b"still here"));
}

#[test]
fn oversized_qr_shrinks_to_the_paper() {
    let assets = FsAssets::new(".");
    let doc = Document::build(&["<QR:M,12>hello"], 10);
    let job = Planner::new(Codepage::Cp437, 100, &assets).plan(&doc).encode();
    let bytes = job.to_bytes();

    assert!(job.skipped.is_empty());
    let widths: Vec<usize> = bytes
        .windows(5)
        .filter(|w| w[..3] == [0x1B, b'*', 33])
        .map(|w| u16::from_le_bytes([w[3], w[4]]) as usize)
        .collect();
    assert!(!widths.is_empty());
    assert!(widths.iter().all(|&w| w <= 100), "{:?}", widths);
}

// ============================================================================
// MARKUP
// ============================================================================

#[test]
fn unbalanced_bold_is_reopened_inside_paragraph() {
    let repaired = repair("<b>hello<p>world</p>");
    let root = &repaired.root;

    let p = root.elements().find(|e| e.name == "p").unwrap();
    let b = p.elements().next().unwrap();
    assert_eq!(b.name, "b");
    assert_eq!(b.text(), "world");

    // The bold around "hello" is a sibling of the paragraph
    let names: Vec<&str> = root.elements().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["b", "p"]);
}

#[test]
fn bold_directives_become_bold_runs() {
    let doc = Document::build(&["<EB>", "<C>Total", "<DB>", "<L>thanks"], 20);
    let repaired = to_repaired(&doc);
    assert!(repaired.issues.is_empty());

    let rich = RichDocument::from_markup(&repaired.root);
    match &rich.blocks[..] {
        [
            Block::Paragraph { runs: first, .. },
            Block::Paragraph { runs: second, .. },
        ] => {
            assert!(first.iter().all(|r| r.bold));
            assert!(second.iter().all(|r| !r.bold));
        }
        other => panic!("unexpected blocks: {:?}", other),
    }
}

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use kotoba_types::{AnalysisResult, GrammarToken, ImageSource};

use crate::view::ResultView;

const TABLE_WIDTH: u16 = 100;

pub fn render_header() -> String {
    "KotobaLens · Smart Analyzer\n".to_string()
}

pub fn render_idle() -> String {
    let mut out = String::new();
    out.push_str("Analyze Patterns.\n");
    out.push_str(
        "Snap a photo to identify significant grammatical structures, verbs, and complex patterns in any Japanese text.\n\n",
    );
    out.push_str("  [c] Open Camera    [u <path>] Upload Image    [q] Quit\n");
    out
}

pub fn render_capturing(ready: Option<(u32, u32)>) -> String {
    match ready {
        Some((width, height)) => {
            format!("Camera ready ({width}x{height}).  [s] Snap    [x] Cancel\n")
        }
        None => "Opening camera...  [x] Cancel\n".to_string(),
    }
}

pub fn render_analyzing(source: &ImageSource) -> String {
    format!("Identifying Grammar... ({source})\nScanning for verbs and significant structures\n")
}

pub fn render_error(message: &str) -> String {
    format!("Analysis Failed\n{message}\n\n  [r] Try Again\n")
}

pub fn render_result(view: &ResultView) -> String {
    let result = view.result();
    let mut out = String::new();

    out.push_str("TRANSLATION\n");
    out.push_str(&format!("\"{}\"\n\n", result.translation));

    let marker = if view.original_expanded() { "[-]" } else { "[+]" };
    out.push_str(&format!("SOURCE TEXT {marker}  [o] toggle\n"));
    if view.original_expanded() {
        for line in result.original_text.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out.push('\n');

    out.push_str(&format!(
        "SIGNIFICANT GRAMMAR    {} items\n",
        result.tokens.len()
    ));

    if result.tokens.is_empty() {
        out.push_str("No complex grammatical structures identified.\n");
    } else {
        out.push_str(&token_table(view.page_tokens(), view.page_start()).to_string());
        out.push('\n');
    }

    if view.shows_pagination() {
        out.push_str(&render_pagination(view));
    }

    out.push_str("\n  [r] New Scan\n");
    out
}

/// Whole result on one screen, for non-interactive output
pub fn render_report(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("TRANSLATION\n\"{}\"\n\n", result.translation));
    out.push_str("SOURCE TEXT\n");
    for line in result.original_text.lines() {
        out.push_str(&format!("  {line}\n"));
    }
    out.push_str(&format!(
        "\nSIGNIFICANT GRAMMAR    {} items\n",
        result.tokens.len()
    ));
    if result.tokens.is_empty() {
        out.push_str("No complex grammatical structures identified.\n");
    } else {
        out.push_str(&token_table(&result.tokens, 0).to_string());
        out.push('\n');
    }
    out
}

fn token_table(tokens: &[GrammarToken], start: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(TABLE_WIDTH)
        .set_header(vec!["#", "Surface", "Reading", "Definition", "Notes"]);

    for (offset, token) in tokens.iter().enumerate() {
        table.add_row(vec![
            (start + offset + 1).to_string(),
            token.surface.clone(),
            token.reading.clone(),
            token.definition.clone(),
            token.notes.clone().unwrap_or_default(),
        ]);
    }

    table
}

/// Disabled controls are drawn as a dot
fn render_pagination(view: &ResultView) -> String {
    let prev = if view.has_prev() { "< [p]" } else { "  ·  " };
    let next = if view.has_next() { "[n] >" } else { "  ·  " };
    format!(
        "{prev}   {} / {}   {next}\n",
        view.current_page(),
        view.total_pages()
    )
}

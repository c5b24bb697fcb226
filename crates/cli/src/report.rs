use pyscope_tagger::TagIndex;

/// Render the outline as indented text, one tag per line
pub fn render_outline(index: &TagIndex) -> String {
    let width = index
        .line_numbers
        .last()
        .map_or(1, |line| line.to_string().len());

    let mut out = String::new();
    for (depth, tag) in index.outline() {
        out.push_str(&format!(
            "{:>width$}: {}{} ({})\n",
            tag.line_number,
            "  ".repeat(depth),
            tag.full_name,
            tag.kind
        ));
    }
    out
}

//! Markdown table rendering with measured column widths.

/// Column alignment, mirrored in the markdown separator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Builds a markdown table with columns padded to their widest cell.
/// Missing alignments default to left.
pub fn build_markdown_table(headers: &[&str], rows: &[Vec<String>], alignments: &[Align]) -> String {
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let align_of = |i: usize| alignments.get(i).copied().unwrap_or(Align::Left);

    let header_cells: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad(h, widths[i], Align::Left))
        .collect();

    let separator_cells: Vec<String> = (0..cols)
        .map(|i| match align_of(i) {
            Align::Center => format!(":{}:", "-".repeat(widths[i].saturating_sub(2).max(1))),
            Align::Right => format!("{}:", "-".repeat(widths[i].saturating_sub(1).max(1))),
            Align::Left => "-".repeat(widths[i]),
        })
        .collect();

    let mut lines = vec![
        format!("| {} |", header_cells.join(" | ")),
        format!("| {} |", separator_cells.join(" | ")),
    ];
    for row in rows {
        let cells: Vec<String> = (0..cols)
            .map(|i| {
                let text = row.get(i).map(String::as_str).unwrap_or("");
                pad(text, widths[i], align_of(i))
            })
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    lines.join("\n")
}

/// Clips long status text to `max_length` characters with an ellipsis.
pub fn clip_status(status: &str, max_length: usize) -> String {
    if status.chars().count() <= max_length {
        return status.to_owned();
    }
    let keep = max_length.saturating_sub(3);
    let clipped: String = status.chars().take(keep).collect();
    format!("{clipped}...")
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let diff = width.saturating_sub(text.chars().count());
    match align {
        Align::Left => format!("{text}{}", " ".repeat(diff)),
        Align::Right => format!("{}{text}", " ".repeat(diff)),
        Align::Center => {
            let left = diff / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(diff - left))
        }
    }
}

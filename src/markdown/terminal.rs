//! ANSI presentation of styled documents

use colored::{ColoredString, Colorize};

use crate::markdown::style::{FontWeight, StyledDocument, StyledRun};

/// Write a document for a terminal.
///
/// With `colorize` off the plain text is returned. Otherwise each run gets
/// true-colour foreground/background and bold or italic attributes; line
/// breaks stay unstyled so backgrounds do not bleed past line ends.
pub fn to_ansi(doc: &StyledDocument, colorize: bool) -> String {
    if !colorize {
        return doc.plain_text();
    }

    let mut out = String::new();
    for run in &doc.runs {
        for piece in run.text.split_inclusive('\n') {
            let (line, newline) = match piece.strip_suffix('\n') {
                Some(line) => (line, "\n"),
                None => (piece, ""),
            };
            if !line.is_empty() {
                out.push_str(&paint(line, run).to_string());
            }
            out.push_str(newline);
        }
    }
    out
}

fn paint(text: &str, run: &StyledRun) -> ColoredString {
    let style = &run.style;
    let fg = style.foreground;
    let mut painted = text.truecolor(fg.r, fg.g, fg.b);
    if let Some(bg) = style.background {
        painted = painted.on_truecolor(bg.r, bg.g, bg.b);
    }
    if style.weight >= FontWeight::Semibold {
        painted = painted.bold();
    }
    if style.italic {
        painted = painted.italic();
    }
    painted
}

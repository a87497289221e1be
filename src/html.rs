//! Low-level markup helpers and a generic table reader
//!
//! The decay search pages are loosely structured HTML, so these are
//! deliberately naive string-level helpers rather than a full DOM. Tag and
//! attribute matching is ASCII case-insensitive.

/// Case-insensitive substring search from a byte offset
pub(crate) fn find_ci(s: &str, pattern: &str, from: usize) -> Option<usize> {
    let haystack = s.get(from..)?.to_ascii_lowercase();
    haystack
        .find(&pattern.to_ascii_lowercase())
        .map(|i| i + from)
}

/// Find the next complete `<tag ...> ... </tag>` block from `from` onwards
///
/// Returns the byte range covering the whole block, including both the
/// opening and closing tags. The character after the tag name must end the
/// name, so searching for `u` will not stop at `<ul>`.
pub(crate) fn next_tag_block(s: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let open_pattern = format!("<{tag}");
    let close_pattern = format!("</{tag}");

    let mut position = from;
    loop {
        let start = find_ci(s, &open_pattern, position)?;
        let after_name = start + open_pattern.len();
        match s.as_bytes().get(after_name) {
            Some(b) if *b == b'>' || *b == b'/' || b.is_ascii_whitespace() => {
                let open_end = s[start..].find('>')? + start + 1;
                let close = find_ci(s, &close_pattern, open_end)?;
                let end = s[close..].find('>')? + close + 1;
                return Some((start, end));
            }
            Some(_) => position = after_name,
            None => return None,
        }
    }
}

/// Remove every `<...>` tag, decode common entities, collapse whitespace
pub(crate) fn strip_tags(s: &str) -> String {
    let mut text = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    collapse_whitespace(&decode_entities(&text))
}

/// Minimal entity decoding, just the ones seen on the decay pages
fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// Collapse whitespace runs into single spaces and trim
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !previous_space {
                out.push(' ');
            }
            previous_space = true;
        } else {
            out.push(ch);
            previous_space = false;
        }
    }
    out.trim().to_string()
}

/// Read the first `<table>` in a markup fragment into rows of text cells
///
/// Every `<tr>` becomes one row and every `<td>`/`<th>` one cell, in
/// document order, with tags stripped from the cell content. An empty vector
/// means the fragment contains no table at all.
pub(crate) fn table_rows(fragment: &str) -> Vec<Vec<String>> {
    let Some((table_start, table_end)) = next_tag_block(fragment, "table", 0) else {
        return Vec::new();
    };
    let table = &fragment[table_start..table_end];

    let mut rows = Vec::new();
    let mut position = 0;
    while let Some((row_start, row_end)) = next_tag_block(table, "tr", position) {
        let row = &table[row_start..row_end];
        position = row_end;

        let mut cells = Vec::new();
        let mut cell_position = 0;
        while let Some((cell_start, cell_end)) = next_cell(row, cell_position) {
            cells.push(strip_tags(&row[cell_start..cell_end]));
            cell_position = cell_end;
        }
        if !cells.is_empty() {
            rows.push(cells);
        }
    }
    rows
}

/// Next `<td>` or `<th>` block, whichever comes first
fn next_cell(row: &str, from: usize) -> Option<(usize, usize)> {
    let td = next_tag_block(row, "td", from);
    let th = next_tag_block(row, "th", from);
    match (td, th) {
        (Some(a), Some(b)) => Some(if a.0 < b.0 { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

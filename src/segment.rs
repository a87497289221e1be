//! Splits a fetched decay search page into heading-delimited blocks
//!
//! NuDat marks every section of a decay dataset with an underlined heading.
//! Rather than walking the document tree, an artificial splitter token is
//! inserted in front of every heading marker and the whole page is split on
//! it, which tolerates the loosely nested markup the site actually serves.

// internal modules
use crate::html;

// external crates
use chrono::Utc;

/// Token inserted immediately before every heading marker
const DATASET_SPLITTER: &str = "NNDC_DATASET_SPLITTER";

/// Ordered heading/markup blocks from one fetched document
///
/// Produced once per fetch and consumed exactly once by dataset assembly.
/// Never persisted.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    /// `(heading, markup block)` pairs in document order
    ///
    /// Each block starts at its heading marker and runs up to the next one,
    /// so the tables belonging to a heading sit inside its block.
    pub blocks: Vec<(String, String)>,
    /// UTC timestamp for the whole fetch
    pub downloaded_at: String,
}

impl RawDataset {
    /// Markup block for a heading, if the page had one
    pub fn block(&self, heading: &str) -> Option<&str> {
        self.blocks
            .iter()
            .find(|(h, _)| h == heading)
            .map(|(_, b)| b.as_str())
    }
}

/// Segment raw page markup into heading-labelled blocks
///
/// Blocks whose heading starts with "Result" are navigation noise and are
/// discarded. The final block is preserved even when the document ends
/// without a trailing marker. A page without any heading markers yields an
/// empty block list; deciding what that means is left to the caller.
pub fn segment(markup: &str) -> RawDataset {
    let mut tagged = String::with_capacity(markup.len() + DATASET_SPLITTER.len() * 8);
    let mut position = 0;
    while let Some((start, end)) = html::next_tag_block(markup, "u", position) {
        tagged.push_str(&markup[position..start]);
        tagged.push_str(DATASET_SPLITTER);
        tagged.push_str(&markup[start..end]);
        position = end;
    }
    tagged.push_str(&markup[position..]);

    let mut blocks = Vec::new();
    for portion in tagged.split(DATASET_SPLITTER).skip(1) {
        let Some((heading_start, heading_end)) = html::next_tag_block(portion, "u", 0) else {
            continue;
        };
        let heading = html::strip_tags(&portion[heading_start..heading_end]);
        if heading.starts_with("Result") {
            continue;
        }
        blocks.push((heading, portion.to_string()));
    }

    RawDataset {
        blocks,
        downloaded_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<html><body>\
        <u>Result: 1 dataset</u> found\
        <u>Dataset #1: 60CO B- decay</u><p>summary</p>\
        <u>Gamma and X-ray radiation</u><table><tr><td>G</td></tr></table>\
        <u>Citation</u> Nuclear Data Sheets\
        </body></html>";

    #[test]
    fn headings_in_document_order() {
        let raw = segment(PAGE);
        let headings: Vec<&str> = raw.blocks.iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(
            headings,
            vec![
                "Dataset #1: 60CO B- decay",
                "Gamma and X-ray radiation",
                "Citation"
            ]
        );
    }

    #[test]
    fn result_blocks_are_discarded() {
        let raw = segment(PAGE);
        assert!(raw.blocks.iter().all(|(h, _)| !h.starts_with("Result")));
    }

    #[test]
    fn blocks_carry_their_markup() {
        let raw = segment(PAGE);
        let block = raw.block("Gamma and X-ray radiation").unwrap();
        assert!(block.contains("<table>"));
        // the block stops at the next heading
        assert!(!block.contains("Nuclear Data Sheets"));
    }

    #[test]
    fn final_block_is_preserved() {
        let raw = segment(PAGE);
        let block = raw.block("Citation").unwrap();
        assert!(block.contains("Nuclear Data Sheets"));
        assert!(block.contains("</html>"));
    }

    #[test]
    fn page_without_markers_is_empty() {
        let raw = segment("<html><body>No datasets were found</body></html>");
        assert!(raw.blocks.is_empty());
        assert!(!raw.downloaded_at.is_empty());
    }
}

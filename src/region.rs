use crate::source::CodeLine;

/// Where a line's hash comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashSlot {
    /// Before the first code line, or a comment at brace depth zero
    None,
    /// A comment inside an open block: blank placeholder, no new hash
    Placeholder,
    /// Hash of the inclusive line range `start..=end`
    Region { start: usize, end: usize },
}

/// The result of scanning one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRegion {
    pub index: usize,
    /// Brace depth after this line; negative when `}` outnumber `{`
    pub depth: i64,
    pub slot: HashSlot,
}

/// Assign every code body line the region its hash covers.
///
/// Braces are counted textually, including those inside string literals
/// and comments. A `}` pops the line of its matching `{` and the region
/// for the current line then reaches back to it; when a line holds several
/// `}`, the last one popped wins. A `}` with nothing to pop leaves the
/// region at the current line.
pub fn scan_regions(lines: &[CodeLine]) -> Vec<LineRegion> {
    let mut depth: i64 = 0;
    let mut open: Vec<usize> = Vec::new();
    let mut started = false;

    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let mut start = index;
            for c in line.text.chars() {
                match c {
                    '{' => {
                        depth += 1;
                        open.push(index);
                    }
                    '}' => {
                        depth -= 1;
                        if let Some(opened) = open.pop() {
                            start = opened;
                        }
                    }
                    _ => {}
                }
            }

            if !line.is_comment {
                started = true;
            }

            let slot = if !started {
                HashSlot::None
            } else if line.is_comment {
                if depth != 0 {
                    HashSlot::Placeholder
                } else {
                    HashSlot::None
                }
            } else {
                HashSlot::Region { start, end: index }
            };

            LineRegion { index, depth, slot }
        })
        .collect()
}

//! Visual line grouping over page fragments.

use std::collections::BTreeMap;

use crate::model::{FontStyle, Position, TextFragment};
use crate::text::{clean_text, is_spaceless_script_char};

/// A text line composed of fragments sharing a baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// 0-based page index
    pub page: usize,
    /// Line text, fragments joined left to right
    pub text: String,
    /// Topmost fragment edge
    pub top: f32,
    /// Leftmost fragment edge
    pub left: f32,
    /// Baseline of the first fragment
    pub baseline: f32,
    /// Dominant style (most characters)
    pub style: FontStyle,
}

impl TextLine {
    /// Build a line from fragments already known to share a baseline.
    pub fn from_fragments(page: usize, mut fragments: Vec<&TextFragment>) -> Option<Self> {
        if fragments.is_empty() {
            return None;
        }

        fragments.sort_by(|a, b| a.x.total_cmp(&b.x));

        let top = fragments.iter().map(|f| f.y).fold(f32::INFINITY, f32::min);
        let left = fragments[0].x;
        let baseline = fragments[0].baseline();

        let mut chars_by_style: BTreeMap<FontStyle, usize> = BTreeMap::new();
        for fragment in &fragments {
            *chars_by_style.entry(fragment.style()).or_insert(0) +=
                fragment.text.chars().filter(|c| !c.is_whitespace()).count();
        }
        // Most characters; on a tie the larger (then bold) style, being last in order
        let style = chars_by_style
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(style, _)| *style)?;

        Some(Self {
            page,
            text: clean_text(&join_fragments(&fragments)),
            top,
            left,
            baseline,
            style,
        })
    }

    /// Document position of the line's top-left corner.
    pub fn position(&self) -> Position {
        Position::new(self.page, self.top, self.left)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Join fragments with spaces where the horizontal gap calls for one.
///
/// No space is inserted between adjacent CJK characters.
fn join_fragments(fragments: &[&TextFragment]) -> String {
    let mut result = String::new();

    for (i, fragment) in fragments.iter().enumerate() {
        if i == 0 {
            result.push_str(&fragment.text);
            continue;
        }

        let prev = fragments[i - 1];
        let gap = fragment.x - (prev.x + prev.effective_width());

        let char_count = fragment.text.chars().count();
        let avg_char_width = if char_count > 0 && fragment.width > 0.0 {
            fragment.width / char_count as f32
        } else {
            fragment.font_size * 0.5
        };

        // Gaps over 20% of a character width separate words
        let wide_gap = gap > avg_char_width * 0.2;

        let prev_last = prev.text.chars().last();
        let curr_first = fragment.text.chars().next();
        let both_spaceless = prev_last.is_some_and(is_spaceless_script_char)
            && curr_first.is_some_and(is_spaceless_script_char);
        let has_space = prev_last.is_some_and(char::is_whitespace)
            || curr_first.is_some_and(char::is_whitespace);

        if wide_gap && !both_spaceless && !has_space {
            result.push(' ');
        }
        result.push_str(&fragment.text);
    }

    result
}

/// Group one page's fragments into lines, top to bottom.
///
/// A fragment joins the current line when its baseline lies within
/// `tolerance × font size` of the line's first baseline.
pub fn group_lines(page: usize, fragments: &[TextFragment], tolerance: f32) -> Vec<TextLine> {
    let mut sorted: Vec<&TextFragment> = fragments
        .iter()
        .filter(|f| !f.text.trim().is_empty())
        .collect();
    sorted.sort_by(|a, b| {
        a.baseline()
            .total_cmp(&b.baseline())
            .then_with(|| a.x.total_cmp(&b.x))
    });

    let mut lines = Vec::new();
    let mut current: Vec<&TextFragment> = Vec::new();
    let mut current_baseline: Option<f32> = None;

    for fragment in sorted {
        let baseline = fragment.baseline();
        match current_baseline {
            Some(y) if (baseline - y).abs() <= fragment.font_size * tolerance => {
                current.push(fragment);
            }
            _ => {
                if let Some(line) = TextLine::from_fragments(page, std::mem::take(&mut current)) {
                    lines.push(line);
                }
                current_baseline = Some(baseline);
                current.push(fragment);
            }
        }
    }

    if let Some(line) = TextLine::from_fragments(page, current) {
        lines.push(line);
    }

    lines.retain(|line| !line.is_empty());
    lines
}

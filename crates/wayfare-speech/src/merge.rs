//! Incremental reconciliation of partial recognition results.
//!
//! The recognizer revises earlier output as more audio arrives: it may
//! replace a span of previously emitted segments (`pgs: rpl` with a range),
//! re-emit a grown version of everything so far, or repeat text it already
//! sent. The accumulator applies each result in arrival order and keeps the
//! segment map contiguous, so ascending-key concatenation is always the
//! best-known transcript prefix.

use std::collections::BTreeMap;

use crate::protocol::ResultText;

/// Running reconstruction of the transcript.
///
/// Segments are whole-replaced, never partially overwritten. One
/// accumulator belongs to exactly one streaming session; inbound results
/// are applied serially.
#[derive(Debug, Default)]
pub struct TranscriptAccumulator {
    segments: BTreeMap<usize, String>,
}

impl TranscriptAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one decoded partial result.
    ///
    /// An explicit replace range takes precedence; otherwise the fragment is
    /// matched against the current text to absorb growth and discard
    /// redundant repeats. The substring-discard step can also drop a
    /// genuinely repeated word — kept as-is for compatibility with the
    /// recognizer's emission patterns.
    pub fn apply(&mut self, result: &ResultText) {
        let fragment = result.fragment();
        if fragment.is_empty() {
            return;
        }

        if let Some((start, end)) = result.replace_range() {
            self.replace(start, end, fragment);
            return;
        }

        let current = self.text();
        if !current.is_empty() {
            if fragment.starts_with(&current) {
                // Grown re-emission of everything so far: supersedes the map.
                self.segments.clear();
                let _ = self.segments.insert(0, fragment);
                return;
            }
            if current.ends_with(&fragment) || current.contains(&fragment) {
                return;
            }
        }

        let _ = self.segments.insert(self.segments.len(), fragment);
    }

    /// Remove segments in `[start, end]`, re-index the remainder
    /// contiguously from 0, and append the fragment as the new tail.
    fn replace(&mut self, start: usize, end: usize, fragment: String) {
        let retained: Vec<String> = std::mem::take(&mut self.segments)
            .into_iter()
            .filter(|(index, _)| *index < start || *index > end)
            .map(|(_, text)| text)
            .collect();

        for (index, text) in retained.into_iter().enumerate() {
            let _ = self.segments.insert(index, text);
        }
        let _ = self.segments.insert(self.segments.len(), fragment);
    }

    /// Concatenation of all segments in ascending key order.
    #[must_use]
    pub fn text(&self) -> String {
        self.segments.values().map(String::as_str).collect()
    }

    /// Number of segments currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether no text has been accumulated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CandidateWord, WordSlice};

    fn result(fragment: &str) -> ResultText {
        ResultText {
            ws: vec![WordSlice {
                cw: vec![CandidateWord {
                    w: fragment.to_string(),
                }],
            }],
            ..ResultText::default()
        }
    }

    fn replace_result(fragment: &str, start: i64, end: i64) -> ResultText {
        ResultText {
            pgs: Some("rpl".to_string()),
            rg: Some(vec![start.into(), end.into()]),
            ..result(fragment)
        }
    }

    #[test]
    fn empty_fragment_is_a_no_op() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("你好"));
        acc.apply(&ResultText::default());
        assert_eq!(acc.text(), "你好");
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn first_fragment_appends() {
        let mut acc = TranscriptAccumulator::new();
        assert!(acc.is_empty());
        acc.apply(&result("你好"));
        assert_eq!(acc.text(), "你好");
    }

    #[test]
    fn growth_is_absorbed_into_a_single_segment() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("你"));
        acc.apply(&result("你好"));
        acc.apply(&result("你好世界"));
        assert_eq!(acc.text(), "你好世界");
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn growth_absorbs_across_multiple_segments() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("早上"));
        acc.apply(&result("去公园"));
        assert_eq!(acc.len(), 2);
        // New fragment starts with the full current text.
        acc.apply(&result("早上去公园散步"));
        assert_eq!(acc.text(), "早上去公园散步");
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn substring_fragment_is_discarded() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("今天天气很好"));
        acc.apply(&result("天气"));
        assert_eq!(acc.text(), "今天天气很好");
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn suffix_fragment_is_discarded() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("今天天气很好"));
        acc.apply(&result("很好"));
        assert_eq!(acc.text(), "今天天气很好");
    }

    #[test]
    fn novel_fragment_appends_as_new_segment() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("今天天气"));
        acc.apply(&result("适合出门"));
        assert_eq!(acc.text(), "今天天气适合出门");
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn replace_removes_range_reindexes_and_appends() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("早上"));
        acc.apply(&result("去了"));
        acc.apply(&result("公园"));
        assert_eq!(acc.len(), 3);

        acc.apply(&replace_result("上午", 0, 1));
        // {0:"早上",1:"去了",2:"公园"} → remove 0..=1 → {0:"公园"} → append
        assert_eq!(acc.text(), "公园上午");
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn replace_whole_map() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("你号"));
        acc.apply(&replace_result("你好", 0, 0));
        assert_eq!(acc.text(), "你好");
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn replace_range_beyond_map_just_appends() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("你好"));
        acc.apply(&replace_result("世界", 5, 9));
        assert_eq!(acc.text(), "你好世界");
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn replace_takes_precedence_over_growth() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("你好"));
        // Fragment grows the current text AND carries a replace range:
        // the replace instruction wins.
        acc.apply(&replace_result("你好世界", 0, 0));
        assert_eq!(acc.text(), "你好世界");
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn replace_on_empty_map_appends() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&replace_result("你好", 0, 3));
        assert_eq!(acc.text(), "你好");
    }

    #[test]
    fn malformed_replace_falls_back_to_growth_handling() {
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("你好"));
        let mut bad = result("你好世界");
        bad.pgs = Some("rpl".to_string());
        bad.rg = Some(vec![0.into()]); // one element: not a valid range
        acc.apply(&bad);
        assert_eq!(acc.text(), "你好世界");
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn coincidental_repeat_is_dropped_by_design() {
        // Known tradeoff: a genuinely repeated word is indistinguishable
        // from a redundant partial and gets discarded.
        let mut acc = TranscriptAccumulator::new();
        acc.apply(&result("好"));
        acc.apply(&result("好"));
        assert_eq!(acc.text(), "好");
        assert_eq!(acc.len(), 1);
    }
}

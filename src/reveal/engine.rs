use rand::Rng;
use serde::Serialize;
use std::ops::Range;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

/// Shortest delay between two revealed characters.
pub const MIN_STEP_MS: u64 = 30;
/// Longest delay between two revealed characters.
pub const MAX_STEP_MS: u64 = 80;
/// How often group styles are re-rolled while revealing.
pub const FLICKER_INTERVAL_MS: u64 = 350;
/// Number of trailing characters shown in the fresh style.
pub const FRESH_TAIL: usize = 3;
/// Smallest and largest flicker group.
pub const GROUP_SIZE: (usize, usize) = (2, 4);

/// Randomness used by the reveal animation
pub trait RevealRng {
    /// Uniform integer in `low..=high`.
    fn between(&mut self, low: u64, high: u64) -> u64;
}

impl<R: Rng + ?Sized> RevealRng for R {
    fn between(&mut self, low: u64, high: u64) -> u64 {
        self.gen_range(low..=high)
    }
}

/// Visual state of a revealed character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphStyle {
    Plain,
    Accent,
    Inverted,
    Solid,
    /// Just revealed; overrides the group style.
    Fresh,
}

impl GlyphStyle {
    const FLICKER: [GlyphStyle; 4] = [
        GlyphStyle::Plain,
        GlyphStyle::Accent,
        GlyphStyle::Inverted,
        GlyphStyle::Solid,
    ];

    fn roll<R: RevealRng + ?Sized>(rng: &mut R) -> Self {
        Self::FLICKER[rng.between(0, 3) as usize]
    }
}

/// Run of visible text sharing one style
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledSpan {
    pub text: String,
    pub style: GlyphStyle,
}

/// What should be on screen after a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealFrame {
    /// Characters (grapheme clusters) visible so far.
    pub visible: usize,
    pub total: usize,
    pub complete: bool,
    pub spans: Vec<StyledSpan>,
}

impl RevealFrame {
    /// Visible text without styling
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// One timed step: wait `delay`, then show `frame`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealStep {
    pub delay: Duration,
    pub frame: RevealFrame,
}

/// Split `count` characters into consecutive groups of 2..=4.
/// The final group takes whatever is left.
pub fn segment_groups<R: RevealRng + ?Sized>(count: usize, rng: &mut R) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut start = 0;
    while start < count {
        let size = rng.between(GROUP_SIZE.0 as u64, GROUP_SIZE.1 as u64) as usize;
        let end = (start + size).min(count);
        groups.push(start..end);
        start = end;
    }
    groups
}

/// Timed character-by-character reveal of one text.
///
/// Lazy and finite: yields one step per character (one step for empty text),
/// the last one complete, then `None` forever.
pub struct Reveal<R> {
    graphemes: Vec<String>,
    groups: Vec<Range<usize>>,
    group_styles: Vec<GlyphStyle>,
    visible: usize,
    elapsed_ms: u64,
    next_flicker_ms: u64,
    finished: bool,
    rng: R,
}

impl<R: RevealRng> Reveal<R> {
    pub fn new(text: &str, mut rng: R) -> Self {
        let graphemes: Vec<String> = text.graphemes(true).map(str::to_string).collect();
        let groups = segment_groups(graphemes.len(), &mut rng);
        let group_styles = groups.iter().map(|_| GlyphStyle::roll(&mut rng)).collect();

        Self {
            graphemes,
            groups,
            group_styles,
            visible: 0,
            elapsed_ms: 0,
            next_flicker_ms: FLICKER_INTERVAL_MS,
            finished: false,
            rng,
        }
    }

    /// Group boundaries, fixed for the lifetime of this reveal
    pub fn groups(&self) -> &[Range<usize>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.graphemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphemes.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.finished
    }

    /// Virtual time consumed by the steps taken so far
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    /// Current frame without advancing
    pub fn frame(&self) -> RevealFrame {
        let complete = self.finished;
        let fresh_from = self.visible.saturating_sub(FRESH_TAIL);
        let mut spans: Vec<StyledSpan> = Vec::new();

        for (group, style) in self.groups.iter().zip(&self.group_styles) {
            for i in group.clone() {
                if i >= self.visible {
                    break;
                }
                let style = if complete {
                    GlyphStyle::Plain
                } else if i >= fresh_from {
                    GlyphStyle::Fresh
                } else {
                    *style
                };
                match spans.last_mut() {
                    Some(span) if span.style == style => span.text.push_str(&self.graphemes[i]),
                    _ => spans.push(StyledSpan {
                        text: self.graphemes[i].clone(),
                        style,
                    }),
                }
            }
        }

        RevealFrame {
            visible: self.visible,
            total: self.graphemes.len(),
            complete,
            spans,
        }
    }

    fn reroll_styles(&mut self) {
        for style in self.group_styles.iter_mut() {
            *style = GlyphStyle::roll(&mut self.rng);
        }
    }
}

impl<R: RevealRng> Iterator for Reveal<R> {
    type Item = RevealStep;

    fn next(&mut self) -> Option<RevealStep> {
        if self.finished {
            return None;
        }

        if self.graphemes.is_empty() {
            self.finished = true;
            return Some(RevealStep {
                delay: Duration::ZERO,
                frame: self.frame(),
            });
        }

        let delay = self.rng.between(MIN_STEP_MS, MAX_STEP_MS);
        self.elapsed_ms += delay;
        while self.elapsed_ms >= self.next_flicker_ms {
            self.reroll_styles();
            self.next_flicker_ms += FLICKER_INTERVAL_MS;
        }

        self.visible += 1;
        if self.visible == self.graphemes.len() {
            self.finished = true;
        }

        Some(RevealStep {
            delay: Duration::from_millis(delay),
            frame: self.frame(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.finished {
            0
        } else {
            (self.graphemes.len() - self.visible).max(1)
        };
        (remaining, Some(remaining))
    }
}

impl<R: RevealRng> std::iter::FusedIterator for Reveal<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_groups_cover_text_without_gaps() {
        let mut rng = StdRng::seed_from_u64(11);
        for count in 0..60 {
            let groups = segment_groups(count, &mut rng);
            let mut expected_start = 0;
            for (i, group) in groups.iter().enumerate() {
                assert_eq!(group.start, expected_start);
                let len = group.len();
                if i + 1 < groups.len() {
                    assert!((2..=4).contains(&len), "inner group of {len}");
                } else {
                    assert!((1..=4).contains(&len), "last group of {len}");
                }
                expected_start = group.end;
            }
            assert_eq!(expected_start, count);
        }
    }

    #[test]
    fn test_one_step_per_grapheme() {
        let text = "Qu'est-ce que la justice ?";
        let steps: Vec<_> = Reveal::new(text, StdRng::seed_from_u64(1)).collect();
        assert_eq!(steps.len(), text.chars().count());
        assert!(steps.last().unwrap().frame.complete);
        assert!(steps[..steps.len() - 1].iter().all(|s| !s.frame.complete));
    }

    #[test]
    fn test_multibyte_graphemes_are_atomic() {
        let text = "正义是什么？👩‍👩‍👧 é";
        let reveal = Reveal::new(text, StdRng::seed_from_u64(2));
        assert_eq!(reveal.len(), text.graphemes(true).count());
        for step in reveal {
            // every prefix is valid text made of whole clusters
            let visible = step.frame.text();
            assert!(text.starts_with(&visible));
            assert_eq!(visible.graphemes(true).count(), step.frame.visible);
        }
    }

    #[test]
    fn test_delays_in_range_and_total_bounded() {
        let text = "What is justice, and who decides?";
        let mut reveal = Reveal::new(text, StdRng::seed_from_u64(3));
        let mut total = Duration::ZERO;
        for step in reveal.by_ref() {
            let ms = step.delay.as_millis() as u64;
            assert!((MIN_STEP_MS..=MAX_STEP_MS).contains(&ms));
            total += step.delay;
        }
        assert!(total <= Duration::from_millis(MAX_STEP_MS * text.chars().count() as u64));
        assert_eq!(reveal.elapsed(), total);
    }

    #[test]
    fn test_fresh_tail_and_plain_on_completion() {
        let mut reveal = Reveal::new("abcdefgh", StdRng::seed_from_u64(4));
        let step = reveal.nth(4).unwrap();
        // five visible: the last three are fresh
        let fresh: String = step
            .frame
            .spans
            .iter()
            .filter(|s| s.style == GlyphStyle::Fresh)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(fresh, "cde");
        assert!(step.frame.spans.iter().all(|s| s.style != GlyphStyle::Fresh || s.text == "cde"));

        let last = reveal.last().unwrap();
        assert!(last.frame.complete);
        assert_eq!(
            last.frame.spans,
            vec![StyledSpan {
                text: "abcdefgh".to_string(),
                style: GlyphStyle::Plain
            }]
        );
    }

    #[test]
    fn test_fused_after_completion() {
        let mut reveal = Reveal::new("ab", StdRng::seed_from_u64(5));
        assert!(reveal.next().is_some());
        assert!(reveal.next().is_some());
        assert!(reveal.next().is_none());
        assert!(reveal.next().is_none());
        assert!(reveal.is_complete());
    }

    #[test]
    fn test_empty_text_single_complete_step() {
        let steps: Vec<_> = Reveal::new("", StdRng::seed_from_u64(6)).collect();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].frame.complete);
        assert_eq!(steps[0].delay, Duration::ZERO);
    }

    #[test]
    fn test_group_boundaries_do_not_change_during_reveal() {
        let mut reveal = Reveal::new("the unexamined life", StdRng::seed_from_u64(7));
        let before = reveal.groups().to_vec();
        while reveal.next().is_some() {
            assert_eq!(reveal.groups(), before.as_slice());
        }
    }
}

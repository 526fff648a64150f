//! Which lines of a card's text are on screen.
//!
//! In segment mode (non-empty `animationSequence`) a segment is shown once the card-local time
//! reaches its `startTime`. The distinct start times of a card form a ladder of *reveal steps*:
//! step `k` shows every segment whose start time is at or below the `k`-th rung. Step `0` shows
//! nothing. Plain mode has a single step showing `text` split on `\n`.

use crate::model::project::ScriptCard;

/// Sorted distinct segment start times for a card in segment mode, empty otherwise.
pub fn reveal_thresholds(card: &ScriptCard) -> Vec<f64> {
    if !is_segment_mode(card) {
        return Vec::new();
    }
    let mut t: Vec<f64> = card
        .segments
        .iter()
        .map(|s| s.start_time)
        .filter(|v| v.is_finite())
        .collect();
    t.sort_by(f64::total_cmp);
    t.dedup();
    t
}

/// `true` when the card reveals its segments over time.
pub fn is_segment_mode(card: &ScriptCard) -> bool {
    !card.animation_sequence.is_empty()
}

/// Reveal step at card-local time `t` for the given thresholds.
pub fn reveal_step(thresholds: &[f64], t: f64) -> usize {
    thresholds.partition_point(|&th| th <= t)
}

/// Number of reveal steps a card can be in.
pub fn step_count(card: &ScriptCard) -> usize {
    if is_segment_mode(card) {
        reveal_thresholds(card).len() + 1
    } else {
        1
    }
}

/// Lines shown at `step`, in segment order. Empty text becomes a blank line.
pub fn lines_at_step(card: &ScriptCard, step: usize) -> Vec<String> {
    if !is_segment_mode(card) {
        return card.text.split('\n').map(blank_as_space).collect();
    }
    let thresholds = reveal_thresholds(card);
    let Some(limit) = step.checked_sub(1).and_then(|i| thresholds.get(i).copied()) else {
        return Vec::new();
    };
    card.segments
        .iter()
        .filter(|s| s.start_time <= limit)
        .map(|s| blank_as_space(&s.text))
        .collect()
}

fn blank_as_space(s: &str) -> String {
    let s = s.trim_end_matches('\r');
    if s.is_empty() {
        " ".to_owned()
    } else {
        s.to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/reveal.rs"]
mod tests;

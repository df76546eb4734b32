use crate::timeline::{DEFAULT_LAST_DURATION_SECS, MIN_DURATION_SECS};

/// One timed lyric block: one or more display lines sharing a start time.
#[derive(Clone, Debug, PartialEq)]
pub struct LyricEntry {
    start: f64,
    duration: f64,
    text: String,
    line_count: usize,
}

impl LyricEntry {
    /// Start time in seconds.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Time until the next entry starts (or the track ends).
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Exclusive end time.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Display lines joined with `'\n'`; this is the glyph cache key text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines of the entry's text.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.line_count
    }
}

/// Split raw text into trimmed, non-blank display lines.
pub(crate) fn display_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Turn raw `(seconds, text)` pairs into sorted entries with durations.
///
/// Bad timestamps and blank texts are dropped, same-timestamp texts are merged, and when
/// `render_bound` is set nothing extends past it.
pub(crate) fn build_entries(raw: &[(f64, String)], render_bound: Option<f64>) -> Vec<LyricEntry> {
    let mut staged: Vec<(f64, Vec<String>)> = Vec::with_capacity(raw.len());
    for (i, (t, text)) in raw.iter().enumerate() {
        if !t.is_finite() || *t < 0.0 {
            tracing::warn!(index = i, time = *t, "dropping lyric with invalid timestamp");
            continue;
        }
        let lines = display_lines(text);
        if lines.is_empty() {
            tracing::debug!(index = i, time = *t, "dropping blank lyric");
            continue;
        }
        staged.push((*t, lines));
    }

    staged.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f64, Vec<String>)> = Vec::with_capacity(staged.len());
    for (t, lines) in staged {
        match merged.last_mut() {
            Some((prev_t, prev_lines)) if *prev_t == t => prev_lines.extend(lines),
            _ => merged.push((t, lines)),
        }
    }

    if let Some(bound) = render_bound {
        let before = merged.len();
        merged.retain(|(t, _)| *t < bound);
        if merged.len() != before {
            tracing::debug!(
                dropped = before - merged.len(),
                bound,
                "dropping lyrics past render bound"
            );
        }
    }

    let mut out = Vec::with_capacity(merged.len());
    for i in 0..merged.len() {
        let start = merged[i].0;
        let end = match merged.get(i + 1) {
            Some((next, _)) => *next,
            None => render_bound.unwrap_or(start + DEFAULT_LAST_DURATION_SECS),
        };
        let end = render_bound.map_or(end, |b| end.min(b));
        let duration = end - start;
        if duration <= MIN_DURATION_SECS {
            tracing::debug!(index = i, start, duration, "dropping lyric with short duration");
            continue;
        }
        let lines = &merged[i].1;
        out.push(LyricEntry {
            start,
            duration,
            text: lines.join("\n"),
            line_count: lines.len(),
        });
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/entry.rs"]
mod tests;

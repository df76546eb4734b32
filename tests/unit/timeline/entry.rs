use super::*;

fn raw(items: &[(f64, &str)]) -> Vec<(f64, String)> {
    items.iter().map(|(t, s)| (*t, (*s).to_owned())).collect()
}

#[test]
fn durations_run_to_next_start_and_default_tail() {
    let entries = build_entries(&raw(&[(0.0, "A"), (2.5, "B"), (5.0, "C")]), None);
    let durs: Vec<f64> = entries.iter().map(LyricEntry::duration).collect();
    assert_eq!(durs, vec![2.5, 2.5, 3.0]);
    assert_eq!(entries[2].end(), 8.0);
}

#[test]
fn render_bound_drops_and_clips() {
    let entries = build_entries(&raw(&[(0.0, "A"), (2.5, "B"), (5.0, "C")]), Some(4.0));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].text(), "B");
    assert!((entries[1].duration() - 1.5).abs() < 1e-12);
}

#[test]
fn blank_and_invalid_entries_are_dropped() {
    let entries = build_entries(
        &raw(&[
            (0.0, "one"),
            (1.0, "   \n \t "),
            (f64::NAN, "nan"),
            (-1.0, "negative"),
            (2.0, "two"),
        ]),
        None,
    );
    let texts: Vec<&str> = entries.iter().map(LyricEntry::text).collect();
    assert_eq!(texts, vec!["one", "two"]);
    // The blank entry never existed, so "one" runs until "two".
    assert_eq!(entries[0].duration(), 2.0);
}

#[test]
fn same_timestamp_entries_merge_and_lines_are_trimmed() {
    let entries = build_entries(&raw(&[(1.0, " first "), (0.5, "zero"), (1.0, "second\n\n")]), None);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].text(), "first\nsecond");
    assert_eq!(entries[1].line_count(), 2);
    assert_eq!(entries[1].lines().collect::<Vec<_>>(), vec!["first", "second"]);
}

#[test]
fn tiny_durations_are_dropped() {
    let entries = build_entries(&raw(&[(1.0, "a"), (1.005, "b"), (2.0, "c")]), None);
    let texts: Vec<&str> = entries.iter().map(LyricEntry::text).collect();
    assert_eq!(texts, vec!["b", "c"]);
}

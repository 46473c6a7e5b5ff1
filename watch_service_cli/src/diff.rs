//! Word-granularity text diff.
//!
//! Produces only the changed spans between two snapshots, each tagged as an
//! addition or a removal, in document order. Unchanged spans are dropped.

use crate::clip_chars;

/// Upper bound on the rendered diff, in characters.
pub const MAX_DIFF_LENGTH: usize = 2000;

const ADDED_PREFIX: &str = "[ADDED]: ";
const REMOVED_PREFIX: &str = "[REMOVED]: ";

/// Diff `old_text` against `new_text` over whitespace-separated words.
///
/// Consecutive words with the same fate are grouped into one tagged span;
/// spans are joined with newlines and the result is truncated to
/// [`MAX_DIFF_LENGTH`]. Identical inputs produce an empty string. An empty
/// `old_text` produces a single span marking everything as added.
pub fn generate_diff(old_text: &str, new_text: &str) -> String {
    let old: Vec<&str> = old_text.split_whitespace().collect();
    let new: Vec<&str> = new_text.split_whitespace().collect();

    let table = lcs_table(&old, &new);

    let mut spans: Vec<(bool, Vec<&str>)> = Vec::new();
    // Fate of the currently open span; an unchanged word closes it so spans
    // separated by stable text stay separate.
    let mut open: Option<bool> = None;

    let mut i = 0;
    let mut j = 0;
    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            open = None;
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            push_word(&mut spans, &mut open, false, old[i]);
            i += 1;
        } else {
            push_word(&mut spans, &mut open, true, new[j]);
            j += 1;
        }
    }
    while i < old.len() {
        push_word(&mut spans, &mut open, false, old[i]);
        i += 1;
    }
    while j < new.len() {
        push_word(&mut spans, &mut open, true, new[j]);
        j += 1;
    }

    let rendered = spans
        .into_iter()
        .map(|(added, words)| {
            let prefix = if added { ADDED_PREFIX } else { REMOVED_PREFIX };
            format!("{prefix}{}", words.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n");

    clip_chars(&rendered, MAX_DIFF_LENGTH).to_string()
}

fn push_word<'a>(
    spans: &mut Vec<(bool, Vec<&'a str>)>,
    open: &mut Option<bool>,
    added: bool,
    word: &'a str,
) {
    if *open == Some(added) {
        if let Some((_, words)) = spans.last_mut() {
            words.push(word);
            return;
        }
    }
    spans.push((added, vec![word]));
    *open = Some(added);
}

/// `table[i][j]` is the LCS length of `old[i..]` and `new[j..]`.
fn lcs_table(old: &[&str], new: &[&str]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0usize; new.len() + 1]; old.len() + 1];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            table[i][j] = if old[i] == new[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }
    table
}

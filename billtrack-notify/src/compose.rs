//! Post text shaping: fit alert text into the platform character limit.
//!
//! A message longer than the limit becomes a thread of segments. Splitting
//! prefers line breaks, then word boundaries; only a single over-long token
//! is hard-cut. Segments carry a `(n/m)` suffix when there is more than one.

/// Platform per-post character limit.
pub const POST_LIMIT: usize = 280;

/// Break `text` into posts of at most `POST_LIMIT` characters.
///
/// Single-segment messages are returned untouched; multi-segment threads
/// get `(n/m)` counters appended to each post.
pub fn split_post(text: &str) -> Vec<String> {
    split_post_with_limit(text, POST_LIMIT)
}

pub fn split_post_with_limit(text: &str, limit: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    // Counter suffix like " (12/12)" eats into every segment's budget.
    let reserve = 8;
    let budget = limit.saturating_sub(reserve).max(1);
    let segments = pack_segments(text, budget);
    let total = segments.len();
    segments
        .into_iter()
        .enumerate()
        .map(|(i, seg)| format!("{seg} ({}/{total})", i + 1))
        .collect()
}

/// Greedily pack whitespace-separated tokens into segments of at most
/// `budget` characters, preferring to keep whole lines together.
fn pack_segments(text: &str, budget: usize) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    let mut flush = |current: &mut String, current_len: &mut usize| {
        if !current.is_empty() {
            segments.push(std::mem::take(current));
            *current_len = 0;
        }
    };

    for line in text.lines() {
        for word in line.split_whitespace() {
            for piece in hard_split(word, budget) {
                let piece_len = piece.chars().count();
                let sep = usize::from(!current.is_empty());
                if current_len + sep + piece_len > budget {
                    flush(&mut current, &mut current_len);
                }
                if !current.is_empty() {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(&piece);
                current_len += piece_len;
            }
        }
        // Preserve intentional line breaks inside a segment.
        if !current.is_empty() && current_len < budget {
            current.push('\n');
            current_len += 1;
        }
    }
    let trimmed = current.trim_end().to_string();
    if !trimmed.is_empty() {
        segments.push(trimmed);
    }
    segments
        .into_iter()
        .map(|s| s.trim_end().to_string())
        .collect()
}

fn hard_split(word: &str, budget: usize) -> Vec<String> {
    if word.chars().count() <= budget {
        return vec![word.to_string()];
    }
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(budget)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

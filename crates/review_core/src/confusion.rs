//! OCR confusion model: glyph classes an OCR engine commonly conflates and
//! the candidate/pattern builders derived from them.

use std::collections::HashSet;

/// Glyph classes that OCR output frequently swaps for one another.
pub const CONFUSION_CLASSES: &[&[char]] = &[&['0', 'O'], &['1', 'I', 'l'], &['5', 'S'], &['8', 'B']];

/// Upper bound on the number of candidates produced for one term.
pub const MAX_CANDIDATES: usize = 64;

/// Returns the confusion class containing `c`, if any.
pub fn confusion_class(c: char) -> Option<&'static [char]> {
    CONFUSION_CLASSES
        .iter()
        .copied()
        .find(|class| class.contains(&c))
}

/// Candidate spellings of `term` under OCR confusion.
///
/// The term itself comes first, followed by all single-substitution variants
/// in character order, then variants with two substitutions, and so on. The
/// list is deduplicated and capped at [`MAX_CANDIDATES`].
pub fn generate_candidates(term: &str) -> Vec<String> {
    let chars: Vec<char> = term.chars().collect();
    let slots: Vec<Slot> = chars
        .iter()
        .enumerate()
        .filter_map(|(position, &c)| {
            confusion_class(c).map(|class| Slot {
                position,
                alternatives: class.iter().copied().filter(|&alt| alt != c).collect(),
            })
        })
        .collect();

    let mut expansion = Expansion {
        slots: &slots,
        work: chars.clone(),
        out: vec![term.to_string()],
        seen: HashSet::from([term.to_string()]),
    };

    for edits in 1..=slots.len() {
        if !expansion.substitute(0, edits) {
            break;
        }
    }

    expansion.out
}

/// Builds one regex covering every confusion at once: confusable characters
/// become bracket classes (`0` -> `[0O]`), everything else is escaped.
pub fn build_fuzzy_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() * 2);
    for c in term.chars() {
        match confusion_class(c) {
            Some(class) => {
                pattern.push('[');
                pattern.extend(class.iter());
                pattern.push(']');
            }
            None => {
                let mut buf = [0u8; 4];
                pattern.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
        }
    }
    pattern
}

struct Slot {
    position: usize,
    alternatives: Vec<char>,
}

struct Expansion<'a> {
    slots: &'a [Slot],
    work: Vec<char>,
    out: Vec<String>,
    seen: HashSet<String>,
}

impl Expansion<'_> {
    /// Emits every variant with exactly `remaining` more substitutions taken
    /// from slots at or after `start`. Returns false once the cap is hit.
    fn substitute(&mut self, start: usize, remaining: usize) -> bool {
        if remaining == 0 {
            let candidate: String = self.work.iter().collect();
            if self.seen.insert(candidate.clone()) {
                self.out.push(candidate);
            }
            return self.out.len() < MAX_CANDIDATES;
        }

        let slots = self.slots;
        for index in start..slots.len() {
            if slots.len() - index < remaining {
                break;
            }
            let slot = &slots[index];
            let original = self.work[slot.position];
            for &alt in &slot.alternatives {
                self.work[slot.position] = alt;
                if !self.substitute(index + 1, remaining - 1) {
                    self.work[slot.position] = original;
                    return false;
                }
            }
            self.work[slot.position] = original;
        }
        true
    }
}

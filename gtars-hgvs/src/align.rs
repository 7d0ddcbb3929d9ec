//! Sequence aligner.
//!
//! Divide-and-conquer Myers bisection: forward and reverse searches over the
//! edit graph meet at a middle snake, and both halves are solved recursively.
//! Sub-problems strip common affixes first and take a few shortcuts
//! (containment, single byte, half match) before bisecting.
//!
//! The deadline is polled every 16 diagonals. Once it has passed, the
//! current sub-problem falls back to `[Delete(a), Insert(b)]`, so the result
//! is always a valid script even if it is no longer minimal.

use std::time::Instant;

use log::{debug, trace};

use crate::cleanup::cleanup_merge;
use crate::models::{
    Edit, EditKind, EditScript, common_prefix_len, common_suffix_len, find_from,
};

/// Raw aligner output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub edits: EditScript,
    /// The deadline passed before the alignment finished.
    pub timed_out: bool,
}

/// Align `a` against `b`, giving up on minimality once `deadline` passes.
pub fn align(a: &[u8], b: &[u8], deadline: Option<Instant>) -> Alignment {
    debug!("aligning {} bytes against {} bytes", a.len(), b.len());

    let aligner = Aligner { deadline };
    let edits = match (a.is_empty(), b.is_empty()) {
        (true, true) => Vec::new(),
        (true, false) => vec![Edit::Insert(b.to_vec())],
        (false, true) => vec![Edit::Delete(a.to_vec())],
        (false, false) => aligner.bisect(a, b),
    };
    let timed_out = aligner.expired();
    if timed_out {
        debug!("alignment deadline exceeded, result may not be minimal");
    }

    Alignment { edits, timed_out }
}

/// Byte ranges of a half match, expressed for `a` and `b`.
struct HalfMatch<'a> {
    a_head: &'a [u8],
    a_tail: &'a [u8],
    b_head: &'a [u8],
    b_tail: &'a [u8],
    common: &'a [u8],
}

struct Aligner {
    deadline: Option<Instant>,
}

impl Aligner {
    fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() > d)
    }

    /// Full diff of a sub-problem: strip affixes, solve the middle, merge.
    fn diff_main(&self, a: &[u8], b: &[u8]) -> EditScript {
        if a == b {
            return if a.is_empty() {
                Vec::new()
            } else {
                vec![Edit::Equal(a.to_vec())]
            };
        }

        let prefix = common_prefix_len(a, b);
        let (a_rest, b_rest) = (&a[prefix..], &b[prefix..]);
        let suffix = common_suffix_len(a_rest, b_rest);
        let a_mid = &a_rest[..a_rest.len() - suffix];
        let b_mid = &b_rest[..b_rest.len() - suffix];

        let mut edits = Vec::new();
        if prefix > 0 {
            edits.push(Edit::Equal(a[..prefix].to_vec()));
        }
        edits.extend(self.compute(a_mid, b_mid));
        if suffix > 0 {
            edits.push(Edit::Equal(a_rest[a_rest.len() - suffix..].to_vec()));
        }

        cleanup_merge(edits)
    }

    /// Diff two sequences that share no common prefix or suffix.
    fn compute(&self, a: &[u8], b: &[u8]) -> EditScript {
        if a.is_empty() {
            return vec![Edit::Insert(b.to_vec())];
        }
        if b.is_empty() {
            return vec![Edit::Delete(a.to_vec())];
        }

        let a_longer = a.len() > b.len();
        let (long, short) = if a_longer { (a, b) } else { (b, a) };

        if let Some(i) = find_from(long, short, 0) {
            let kind = if a_longer {
                EditKind::Delete
            } else {
                EditKind::Insert
            };
            return vec![
                Edit::new(kind, &long[..i]),
                Edit::Equal(short.to_vec()),
                Edit::new(kind, &long[i + short.len()..]),
            ];
        }

        // a single byte that is not contained in the other side can't be equal
        if short.len() == 1 {
            return vec![Edit::Delete(a.to_vec()), Edit::Insert(b.to_vec())];
        }

        if let Some(hm) = half_match(a, b) {
            let mut edits = self.diff_main(hm.a_head, hm.b_head);
            edits.push(Edit::Equal(hm.common.to_vec()));
            edits.extend(self.diff_main(hm.a_tail, hm.b_tail));
            return edits;
        }

        self.bisect(a, b)
    }

    /// Find the middle snake and split the problem there.
    fn bisect(&self, a: &[u8], b: &[u8]) -> EditScript {
        let n1 = a.len() as isize;
        let n2 = b.len() as isize;
        let max_d = (n1 + n2 + 1) / 2;
        let v_offset = max_d;
        let v_length = 2 * max_d + 2;

        let mut v1 = vec![-1isize; v_length as usize];
        let mut v2 = vec![-1isize; v_length as usize];
        v1[(v_offset + 1) as usize] = 0;
        v2[(v_offset + 1) as usize] = 0;

        let delta = n1 - n2;
        // with an odd delta the forward path is the one that collides
        let front = delta % 2 != 0;

        let mut k1start = 0;
        let mut k1end = 0;
        let mut k2start = 0;
        let mut k2end = 0;

        for d in 0..max_d {
            if d % 16 == 0 && self.expired() {
                trace!("deadline hit at d={} of {}", d, max_d);
                break;
            }

            // forward path
            let mut k1 = -d + k1start;
            while k1 <= d - k1end {
                let k1_offset = (v_offset + k1) as usize;
                let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                    v1[k1_offset + 1]
                } else {
                    v1[k1_offset - 1] + 1
                };
                let mut y1 = x1 - k1;
                while x1 < n1 && y1 < n2 && a[x1 as usize] == b[y1 as usize] {
                    x1 += 1;
                    y1 += 1;
                }
                v1[k1_offset] = x1;

                if x1 > n1 {
                    k1end += 2;
                } else if y1 > n2 {
                    k1start += 2;
                } else if front {
                    let k2_offset = v_offset + delta - k1;
                    if (0..v_length).contains(&k2_offset) && v2[k2_offset as usize] != -1 {
                        let x2 = n1 - v2[k2_offset as usize];
                        if x1 >= x2 {
                            return self.bisect_split(a, b, x1 as usize, y1 as usize);
                        }
                    }
                }
                k1 += 2;
            }

            // reverse path
            let mut k2 = -d + k2start;
            while k2 <= d - k2end {
                let k2_offset = (v_offset + k2) as usize;
                let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                    v2[k2_offset + 1]
                } else {
                    v2[k2_offset - 1] + 1
                };
                let mut y2 = x2 - k2;
                while x2 < n1
                    && y2 < n2
                    && a[(n1 - x2 - 1) as usize] == b[(n2 - y2 - 1) as usize]
                {
                    x2 += 1;
                    y2 += 1;
                }
                v2[k2_offset] = x2;

                if x2 > n1 {
                    k2end += 2;
                } else if y2 > n2 {
                    k2start += 2;
                } else if !front {
                    let k1_offset = v_offset + delta - k2;
                    if (0..v_length).contains(&k1_offset) && v1[k1_offset as usize] != -1 {
                        let x1 = v1[k1_offset as usize];
                        let y1 = v_offset + x1 - k1_offset;
                        // mirror x2 onto the top-left coordinate system
                        if x1 >= n1 - x2 {
                            return self.bisect_split(a, b, x1 as usize, y1 as usize);
                        }
                    }
                }
                k2 += 2;
            }
        }

        // out of time, or no commonality at all
        vec![Edit::Delete(a.to_vec()), Edit::Insert(b.to_vec())]
    }

    fn bisect_split(&self, a: &[u8], b: &[u8], x: usize, y: usize) -> EditScript {
        let mut edits = self.diff_main(&a[..x], &b[..y]);
        edits.extend(self.diff_main(&a[x..], &b[y..]));
        edits
    }
}

/// Look for a substring shared by `a` and `b` that is at least half as long
/// as the longer input. Splitting on it speeds things up at the cost of
/// minimality.
fn half_match<'a>(a: &'a [u8], b: &'a [u8]) -> Option<HalfMatch<'a>> {
    let a_longer = a.len() > b.len();
    let (long, short) = if a_longer { (a, b) } else { (b, a) };
    if long.len() < 4 || short.len() * 2 < long.len() {
        return None;
    }

    // seed from the second quarter, then from the third
    let second = half_match_at(long, short, long.len().div_ceil(4));
    let third = half_match_at(long, short, long.len().div_ceil(2));
    let best = match (second, third) {
        (None, None) => return None,
        (Some(hm), None) | (None, Some(hm)) => hm,
        (Some(hm1), Some(hm2)) => {
            if hm1.common.len() > hm2.common.len() {
                hm1
            } else {
                hm2
            }
        }
    };

    if a_longer {
        Some(best)
    } else {
        Some(HalfMatch {
            a_head: best.b_head,
            a_tail: best.b_tail,
            b_head: best.a_head,
            b_tail: best.a_tail,
            common: best.common,
        })
    }
}

/// Half match seeded by the quarter-length substring of `long` at `i`.
/// The returned ranges use `a` for `long` and `b` for `short`.
fn half_match_at<'a>(long: &'a [u8], short: &'a [u8], i: usize) -> Option<HalfMatch<'a>> {
    let seed = &long[i..i + long.len() / 4];

    let mut best = None;
    let mut best_len = 0;
    let mut found = find_from(short, seed, 0);
    while let Some(j) = found {
        let prefix = common_prefix_len(&long[i..], &short[j..]);
        let suffix = common_suffix_len(&long[..i], &short[..j]);
        if best_len < prefix + suffix {
            best_len = prefix + suffix;
            best = Some(HalfMatch {
                a_head: &long[..i - suffix],
                a_tail: &long[i + prefix..],
                b_head: &short[..j - suffix],
                b_tail: &short[j + prefix..],
                common: &short[j - suffix..j + prefix],
            });
        }
        found = find_from(short, seed, j + 1);
    }

    if best_len * 2 < long.len() {
        return None;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{source_text, target_text};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::*;
    use std::time::Duration;

    fn random_seq(rng: &mut StdRng, len: usize, alphabet: &[u8]) -> Vec<u8> {
        (0..len)
            .map(|_| alphabet[rng.random_range(0..alphabet.len())])
            .collect()
    }

    #[rstest]
    fn test_identical_sequences() {
        let result = align(b"ACGTACGT", b"ACGTACGT", None);
        assert_eq!(result.edits, vec![Edit::Equal(b"ACGTACGT".to_vec())]);
        assert!(!result.timed_out);
    }

    #[rstest]
    fn test_disjoint_sequences() {
        let result = align(b"AAAA", b"CCC", None);
        assert!(result.edits.iter().all(|e| !e.is_equal()));
        assert_eq!(source_text(&result.edits), b"AAAA".to_vec());
        assert_eq!(target_text(&result.edits), b"CCC".to_vec());
    }

    #[rstest]
    #[case(b"", b"", vec![])]
    #[case(b"", b"AC", vec![Edit::Insert(b"AC".to_vec())])]
    #[case(b"AC", b"", vec![Edit::Delete(b"AC".to_vec())])]
    #[case(b"A", b"C", vec![Edit::Delete(b"A".to_vec()), Edit::Insert(b"C".to_vec())])]
    fn test_degenerate_inputs(#[case] a: &[u8], #[case] b: &[u8], #[case] expected: EditScript) {
        assert_eq!(align(a, b, None).edits, expected);
    }

    #[rstest]
    fn test_single_insertion() {
        let result = align(b"ACGT", b"ACCGT", None);
        assert_eq!(source_text(&result.edits), b"ACGT".to_vec());
        assert_eq!(target_text(&result.edits), b"ACCGT".to_vec());
        let edited: usize = result
            .edits
            .iter()
            .filter(|e| !e.is_equal())
            .map(|e| e.len())
            .sum();
        assert_eq!(edited, 1);
    }

    #[rstest]
    fn test_half_match_split() {
        let hm = half_match(b"1234567890", b"a345678z").expect("should find a half match");
        assert_eq!(hm.a_head, b"12");
        assert_eq!(hm.a_tail, b"90");
        assert_eq!(hm.b_head, b"a");
        assert_eq!(hm.b_tail, b"z");
        assert_eq!(hm.common, b"345678");

        assert!(half_match(b"1234567890", b"abcdef").is_none());
        assert!(half_match(b"12345", b"23").is_none());
    }

    #[rstest]
    fn test_round_trip_random() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let la = rng.random_range(0..40);
            let lb = rng.random_range(0..40);
            let a = random_seq(&mut rng, la, b"ACGT");
            let b = random_seq(&mut rng, lb, b"ACGT");
            let result = align(&a, &b, None);
            assert_eq!(source_text(&result.edits), a);
            assert_eq!(target_text(&result.edits), b);
            assert!(!result.timed_out);
        }
    }

    #[rstest]
    fn test_expired_deadline_still_valid() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = random_seq(&mut rng, 400, b"ACGT");
        let b = random_seq(&mut rng, 400, b"ACGT");

        let deadline = Instant::now();
        std::thread::sleep(Duration::from_millis(5));
        let result = align(&a, &b, Some(deadline));

        assert!(result.timed_out);
        assert_eq!(source_text(&result.edits), a);
        assert_eq!(target_text(&result.edits), b);
    }
}

//! Canonical normalization of an edit script.
//!
//! A single pass walks the script once with a cursor and applies a fixed list
//! of local rewrites at every position, in order:
//!
//! 1. shift an edit left into a tandem repeat of the preceding equality
//! 2. move an equality behind a delete past an insert that ends with it
//! 3. swap an equality and an insert that commute
//! 4. re-split `Delete Equal Insert` so the equality moves to the front
//! 5. split a leading substitution out of a delete/insert pair
//! 6. split a trailing substitution out of a delete/insert pair
//! 7. slide an edit's shared suffix with the preceding equality to its right,
//!    optionally folding in a following edit of the same kind
//!
//! Empty runs are dropped at the end of a pass. One pass is not always
//! idempotent, so [`normalize`] repeats it until the script stops changing.
//! Every rule keeps both reconstructed sequences intact.

use log::trace;

use crate::cleanup::merge_adjacent;
use crate::models::{Edit, EditKind, EditScript, common_prefix_len, common_suffix_len, concat};

/// Rewrite `script` into its canonical, left-aligned form.
pub fn normalize(mut script: EditScript) -> EditScript {
    let mut passes = 0;
    loop {
        passes += 1;
        let next = normalize_pass(merge_adjacent(script.clone()));
        if next == script {
            trace!("normalization settled after {} passes", passes);
            return next;
        }
        script = next;
    }
}

/// A single rewrite pass over a script whose adjacent runs have distinct tags.
pub fn normalize_pass(mut input: EditScript) -> EditScript {
    let mut out: EditScript = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        let mut d = input[i].clone();

        shift_into_repeat(&mut d, &mut input, i);
        absorb_equal_suffix(&d, &mut input, i);
        swap_commuting(&d, &mut input, i);

        if resplit_around_equal(&d, &mut input, i, &mut out) {
            continue;
        }
        if split_leading_substitution(&d, &mut input, i, &mut out) {
            continue;
        }
        if split_trailing_substitution(&d, &input, i, &mut out) {
            i += 2;
            continue;
        }

        slide_shared_suffix(&mut d, &mut input, i);
        out.push(d);
        i += 1;
    }

    out.retain(|e| !e.is_empty());
    out
}

/// `Equal(e) X Equal(f)` where `e` ends in a repeat of `X`: move the edit to
/// the leftmost copy of the repeat.
fn shift_into_repeat(d: &mut Edit, edits: &mut [Edit], i: usize) {
    let Edit::Equal(e) = d else { return };
    if i + 2 >= edits.len() || edits[i + 1].is_equal() || !edits[i + 2].is_equal() {
        return;
    }
    let x = edits[i + 1].text().to_vec();
    let len = x.len();
    if len > e.len() || !e.ends_with(&x) {
        return;
    }

    // e[cut..] == e[cut + len..] ++ x
    let Some(cut) = (0..e.len() - len).find(|&cut| e[cut..e.len() - len] == e[cut + len..]) else {
        return;
    };
    let tail = concat(&[&e[cut + len..], &x, edits[i + 2].text()]);
    edits[i + 2].set_text(tail);
    edits[i + 1].set_text(e[cut..cut + len].to_vec());
    e.truncate(cut);
}

/// `Delete Equal(q) Insert(j)` with `j` ending in `q` becomes
/// `Delete Insert(q ++ j - q) Equal(q)`.
fn absorb_equal_suffix(d: &Edit, edits: &mut [Edit], i: usize) {
    if !matches!(d, Edit::Delete(_)) {
        return;
    }
    let Some([Edit::Equal(q), Edit::Insert(ins)]) = edits.get(i + 1..i + 3) else {
        return;
    };
    if !ins.ends_with(q) {
        return;
    }
    let rotated = concat(&[q, &ins[..ins.len() - q.len()]]);
    let q = q.clone();
    edits[i + 1] = Edit::Insert(rotated);
    edits[i + 2] = Edit::Equal(q);
}

/// `Delete Equal(q) Insert(j)` where `q ++ j == j ++ q`: swap the last two.
fn swap_commuting(d: &Edit, edits: &mut [Edit], i: usize) {
    if !matches!(d, Edit::Delete(_)) {
        return;
    }
    let commutes = match edits.get(i + 1..i + 3) {
        Some([Edit::Equal(q), Edit::Insert(ins)]) => concat(&[q, ins]) == concat(&[ins, q]),
        _ => false,
    };
    if commutes {
        edits.swap(i + 1, i + 2);
    }
}

/// `Delete(p) Equal(q) Insert(j)`: find the first split of `q` that lets the
/// equality move in front of the pair. The rewritten triple is re-examined at
/// the same cursor.
fn resplit_around_equal(d: &Edit, edits: &mut [Edit], i: usize, out: &mut EditScript) -> bool {
    let Edit::Delete(del) = d else { return false };
    let (q, ins) = match edits.get(i + 1..i + 3) {
        Some([Edit::Equal(q), Edit::Insert(ins)]) => (q.clone(), ins.clone()),
        _ => return false,
    };
    if q.len() < ins.len() {
        return false;
    }

    for x in del.len()..=q.len() - ins.len() {
        let lead = concat(&[del, &q[..x - del.len()]]);
        let trail = concat(&[&q[x + ins.len()..], &ins]);
        if lead[..] == q[..x] && q[x..] == trail[..] {
            out.push(Edit::Equal(lead));
            edits[i] = Edit::Delete(q[x - del.len()..x].to_vec());
            edits[i + 1] = Edit::Insert(q[x..x + ins.len()].to_vec());
            edits[i + 2] = Edit::Equal(trail);
            return true;
        }
    }
    false
}

/// `Delete(p) Insert(j)` agreeing at byte 1: emit the first-byte
/// substitution and the shared run, keep the remainder under the cursor.
fn split_leading_substitution(
    d: &Edit,
    edits: &mut [Edit],
    i: usize,
    out: &mut EditScript,
) -> bool {
    let Edit::Delete(del) = d else { return false };
    let ins = match edits.get(i + 1) {
        Some(Edit::Insert(ins)) => ins.clone(),
        _ => return false,
    };
    if del.len() < 2 || ins.len() < 2 || del[1] != ins[1] {
        return false;
    }

    let shared_end = 2 + common_prefix_len(&del[2..], &ins[2..]);
    out.push(Edit::Delete(del[..1].to_vec()));
    out.push(Edit::Insert(ins[..1].to_vec()));
    out.push(Edit::Equal(del[1..shared_end].to_vec()));
    edits[i] = Edit::Delete(del[shared_end..].to_vec());
    edits[i + 1] = Edit::Insert(ins[shared_end..].to_vec());
    true
}

/// `Delete(p) Insert(j)` agreeing at the second-to-last byte: emit the pair
/// as leading edits, the shared run, and a trailing substitution.
fn split_trailing_substitution(d: &Edit, edits: &[Edit], i: usize, out: &mut EditScript) -> bool {
    let Edit::Delete(del) = d else { return false };
    let Some(Edit::Insert(ins)) = edits.get(i + 1) else {
        return false;
    };
    let (dl, il) = (del.len(), ins.len());
    if dl < 2 || il < 2 || del[dl - 2] != ins[il - 2] {
        return false;
    }

    let mut shared = 2;
    while shared < dl && shared < il && del[dl - shared] == ins[il - shared] {
        shared += 1;
    }
    shared -= 1;

    out.extend([
        Edit::Delete(del[..dl - shared].to_vec()),
        Edit::Insert(ins[..il - shared].to_vec()),
        Edit::Equal(del[dl - shared..dl - 1].to_vec()),
        Edit::Delete(del[dl - 1..].to_vec()),
        Edit::Insert(ins[il - 1..].to_vec()),
    ]);
    true
}

/// `Equal(e) X Equal(f)`: move the suffix `X` shares with `e` to the right of
/// the edit. A following edit of the same kind that ends with `f` is folded
/// in first. A `Delete` followed by such an `Insert` is left for a later
/// position so the pair stays together.
fn slide_shared_suffix(d: &mut Edit, edits: &mut [Edit], i: usize) {
    let Edit::Equal(e) = d else { return };
    let n = edits.len();
    if i + 2 >= n
        || edits[i + 1].is_equal()
        || !edits[i + 2].is_equal()
        || e.is_empty()
        || edits[i + 1].is_empty()
    {
        return;
    }

    let kind = edits[i + 1].kind();
    let next_kind = edits.get(i + 3).map(Edit::kind);
    let next_ends_with_equal = i + 3 < n && edits[i + 3].text().ends_with(edits[i + 2].text());
    if next_ends_with_equal && kind == EditKind::Delete && next_kind == Some(EditKind::Insert) {
        return;
    }

    if next_ends_with_equal && next_kind == Some(kind) {
        let f = edits[i + 2].text();
        let next = edits[i + 3].text();
        let folded = concat(&[edits[i + 1].text(), f, &next[..next.len() - f.len()]]);
        edits[i + 1].set_text(folded);
        edits[i + 3] = Edit::Equal(Vec::new());
    }

    let x = edits[i + 1].text().to_vec();
    let shared = common_suffix_len(e, &x);
    let moved = e.split_off(e.len() - shared);
    edits[i + 1].set_text(concat(&[&moved, &x[..x.len() - shared]]));
    let f = concat(&[&x[x.len() - shared..], edits[i + 2].text()]);
    edits[i + 2].set_text(f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{source_text, target_text};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn eq(s: &str) -> Edit {
        Edit::Equal(s.as_bytes().to_vec())
    }
    fn ins(s: &str) -> Edit {
        Edit::Insert(s.as_bytes().to_vec())
    }
    fn del(s: &str) -> Edit {
        Edit::Delete(s.as_bytes().to_vec())
    }

    #[rstest]
    fn test_shift_into_repeat() {
        let out = normalize_pass(vec![eq("CAGAG"), ins("AG"), eq("T")]);
        assert_eq!(out, vec![eq("C"), ins("AG"), eq("AGAGT")]);
    }

    #[rstest]
    fn test_leading_substitution_split() {
        let out = normalize_pass(vec![eq("A"), del("CGT"), ins("TGA"), eq("A")]);
        assert_eq!(
            out,
            vec![eq("A"), del("C"), ins("T"), eq("G"), del("T"), ins("A"), eq("A")]
        );
    }

    #[rstest]
    fn test_trailing_substitution_split() {
        let out = normalize_pass(vec![eq("A"), del("CCGT"), ins("TGA"), eq("A")]);
        assert_eq!(
            out,
            vec![eq("A"), del("CC"), ins("T"), eq("G"), del("T"), ins("A"), eq("A")]
        );
    }

    #[rstest]
    fn test_empty_runs_dropped() {
        let out = normalize_pass(vec![eq("AC"), ins(""), del("G"), eq("")]);
        assert!(out.iter().all(|e| !e.is_empty()));
        assert_eq!(source_text(&out), b"ACG".to_vec());
        assert_eq!(target_text(&out), b"AC".to_vec());
    }

    #[rstest]
    #[case(vec![eq("TTTT"), ins("T"), eq("G")])]
    #[case(vec![eq("ACAC"), del("AC"), eq("G")])]
    #[case(vec![del("A"), eq("CA"), ins("CA"), eq("T")])]
    #[case(vec![eq("AAC"), del("CGTA"), ins("CGAT"), eq("AC")])]
    fn test_normalize_preserves_sequences(#[case] script: EditScript) {
        let a = source_text(&script);
        let b = target_text(&script);
        let out = normalize(script);
        assert_eq!(source_text(&out), a);
        assert_eq!(target_text(&out), b);
        assert_eq!(normalize(out.clone()), out);
    }
}

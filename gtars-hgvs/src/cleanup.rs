//! Compaction passes over raw aligner output.
//!
//! [`cleanup_merge`] folds runs of inserts and deletes together, factors out
//! shared affixes and slides single edits sideways to swallow neighbouring
//! equalities. [`cleanup_efficiency`] trades short equalities that sit between
//! edits for a smaller number of larger edits. [`factor_affixes`] puts every
//! run of edits in delete-then-insert order and hands the bytes its two sides
//! share to the surrounding equalities. [`merge_adjacent`] joins consecutive
//! runs with the same tag.

use std::mem;

use crate::models::{Edit, EditKind, EditScript, common_prefix_len, common_suffix_len, concat};

/// Cost of an extra edit, measured in equal bytes.
pub const EDIT_COST: usize = 4;

/// Compactor stage: efficiency cleanup, affix factoring, then a same-tag
/// merge.
pub fn compact(edits: EditScript) -> EditScript {
    merge_adjacent(factor_affixes(cleanup_efficiency(edits)))
}

/// Reorder and merge like edit sections, then shift single edits sideways
/// where that removes an equality. Empty inserts and deletes produced while
/// factoring affixes are kept; only a trailing empty run is dropped.
pub fn cleanup_merge(mut edits: EditScript) -> EditScript {
    // sentinel so the last run gets flushed
    edits.push(Edit::Equal(Vec::new()));

    let mut pointer = 0;
    let mut count_delete = 0;
    let mut count_insert = 0;
    let mut text_delete: Vec<u8> = Vec::new();
    let mut text_insert: Vec<u8> = Vec::new();

    while pointer < edits.len() {
        match edits[pointer].kind() {
            EditKind::Insert => {
                count_insert += 1;
                text_insert.extend_from_slice(edits[pointer].text());
                pointer += 1;
            }
            EditKind::Delete => {
                count_delete += 1;
                text_delete.extend_from_slice(edits[pointer].text());
                pointer += 1;
            }
            EditKind::Equal => {
                if count_delete + count_insert > 1 {
                    if count_delete != 0 && count_insert != 0 {
                        let common = common_prefix_len(&text_insert, &text_delete);
                        if common != 0 {
                            let x = pointer - count_delete - count_insert;
                            if x > 0 && edits[x - 1].is_equal() {
                                edits[x - 1]
                                    .text_mut()
                                    .extend_from_slice(&text_insert[..common]);
                            } else {
                                edits.insert(0, Edit::Equal(text_insert[..common].to_vec()));
                                pointer += 1;
                            }
                            text_insert.drain(..common);
                            text_delete.drain(..common);
                        }

                        let common = common_suffix_len(&text_insert, &text_delete);
                        if common != 0 {
                            let mut tail = text_insert.split_off(text_insert.len() - common);
                            text_delete.truncate(text_delete.len() - common);
                            tail.extend_from_slice(edits[pointer].text());
                            edits[pointer].set_text(tail);
                        }
                    }

                    let start = pointer - count_delete - count_insert;
                    let replacement = match (count_delete, count_insert) {
                        (0, _) => vec![Edit::Insert(mem::take(&mut text_insert))],
                        (_, 0) => vec![Edit::Delete(mem::take(&mut text_delete))],
                        _ => vec![
                            Edit::Delete(mem::take(&mut text_delete)),
                            Edit::Insert(mem::take(&mut text_insert)),
                        ],
                    };
                    let replaced = replacement.len();
                    edits.splice(start..pointer, replacement);
                    pointer = start + replaced + 1;
                } else if pointer != 0 && edits[pointer - 1].is_equal() {
                    let merged = edits.remove(pointer);
                    edits[pointer - 1].text_mut().extend_from_slice(merged.text());
                } else {
                    pointer += 1;
                }
                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
    }

    if edits.last().is_some_and(Edit::is_empty) {
        edits.pop();
    }

    // second pass: single edits surrounded by equalities, e.g. A<ins>BA</ins>C -> <ins>AB</ins>AC
    let mut changes = false;
    let mut pointer = 1;
    while pointer + 1 < edits.len() {
        if edits[pointer - 1].is_equal() && edits[pointer + 1].is_equal() {
            let prev = edits[pointer - 1].text().to_vec();
            let next = edits[pointer + 1].text().to_vec();
            let current = edits[pointer].text().to_vec();

            if current.ends_with(&prev) {
                let head = &current[..current.len() - prev.len()];
                edits[pointer].set_text(concat(&[&prev, head]));
                edits[pointer + 1].set_text(concat(&[&prev, &next]));
                edits.remove(pointer - 1);
                changes = true;
            } else if current.starts_with(&next) {
                let tail = &current[next.len()..];
                edits[pointer - 1].text_mut().extend_from_slice(&next);
                edits[pointer].set_text(concat(&[tail, &next]));
                edits.remove(pointer + 1);
                changes = true;
            }
        }
        pointer += 1;
    }

    if changes { cleanup_merge(edits) } else { edits }
}

/// Eliminate operationally trivial equalities: a short equality with edits
/// on all four sides, or a very short one with edits on three sides, is
/// turned into a delete plus an insert.
pub fn cleanup_efficiency(mut edits: EditScript) -> EditScript {
    let mut changes = false;
    // indices of candidate equalities
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Vec<u8> = Vec::new();
    let mut pointer: isize = 0;

    let mut pre_ins = false;
    let mut pre_del = false;
    let mut post_ins = false;
    let mut post_del = false;

    while pointer < edits.len() as isize {
        let p = pointer as usize;
        if edits[p].is_equal() {
            if edits[p].len() < EDIT_COST && (post_ins || post_del) {
                equalities.push(p);
                pre_ins = post_ins;
                pre_del = post_del;
                last_equality = edits[p].text().to_vec();
            } else {
                equalities.clear();
                last_equality.clear();
            }
            post_ins = false;
            post_del = false;
        } else {
            if edits[p].kind() == EditKind::Delete {
                post_del = true;
            } else {
                post_ins = true;
            }

            let sides = [pre_ins, pre_del, post_ins, post_del]
                .iter()
                .filter(|&&side| side)
                .count();
            let trivial = !last_equality.is_empty()
                && ((pre_ins && pre_del && post_ins && post_del)
                    || (last_equality.len() < EDIT_COST / 2 && sides == 3));

            if let Some(&at) = equalities.last().filter(|_| trivial) {
                edits.insert(at, Edit::Delete(last_equality.clone()));
                let text = mem::take(edits[at + 1].text_mut());
                edits[at + 1] = Edit::Insert(text);
                equalities.pop();
                last_equality.clear();

                if pre_ins && pre_del {
                    // no earlier equality can be affected
                    post_ins = true;
                    post_del = true;
                    equalities.clear();
                } else {
                    equalities.pop();
                    pointer = equalities.last().map_or(-1, |&e| e as isize);
                    post_ins = false;
                    post_del = false;
                }
                changes = true;
            }
        }
        pointer += 1;
    }

    if changes { cleanup_merge(edits) } else { edits }
}

/// Rewrite every maximal run of inserts and deletes as one delete followed by
/// one insert. A prefix shared by both sides joins the preceding equality and
/// a shared suffix joins the following one; sides left empty are dropped.
///
/// The two halves of a bisection are not merged by the aligner, so a junction
/// such as `[ins CC, del AC]` can reach this point.
pub fn factor_affixes(edits: EditScript) -> EditScript {
    let mut out: EditScript = Vec::with_capacity(edits.len());
    let mut deleted: Vec<u8> = Vec::new();
    let mut inserted: Vec<u8> = Vec::new();
    let mut in_run = false;

    for edit in edits {
        match edit {
            Edit::Delete(run) => {
                deleted.extend_from_slice(&run);
                in_run = true;
            }
            Edit::Insert(run) => {
                inserted.extend_from_slice(&run);
                in_run = true;
            }
            Edit::Equal(run) => {
                if in_run {
                    let tail = flush_run(&mut out, mem::take(&mut deleted), mem::take(&mut inserted));
                    out.push(Edit::Equal(concat(&[&tail, &run])));
                    in_run = false;
                } else {
                    out.push(Edit::Equal(run));
                }
            }
        }
    }

    if in_run {
        let tail = flush_run(&mut out, deleted, inserted);
        if !tail.is_empty() {
            out.push(Edit::Equal(tail));
        }
    }

    out
}

/// Emit one run without its shared affixes and return the shared suffix.
fn flush_run(out: &mut EditScript, deleted: Vec<u8>, inserted: Vec<u8>) -> Vec<u8> {
    let prefix = common_prefix_len(&deleted, &inserted);
    let suffix = common_suffix_len(&deleted[prefix..], &inserted[prefix..]);

    if prefix > 0 {
        match out.last_mut() {
            Some(Edit::Equal(last)) => last.extend_from_slice(&deleted[..prefix]),
            _ => out.push(Edit::Equal(deleted[..prefix].to_vec())),
        }
    }

    let deleted_end = deleted.len() - suffix;
    let inserted_end = inserted.len() - suffix;
    if prefix < deleted_end {
        out.push(Edit::Delete(deleted[prefix..deleted_end].to_vec()));
    }
    if prefix < inserted_end {
        out.push(Edit::Insert(inserted[prefix..inserted_end].to_vec()));
    }

    deleted[deleted_end..].to_vec()
}

/// Concatenate consecutive edits with the same tag. Empty runs are kept.
pub fn merge_adjacent(edits: EditScript) -> EditScript {
    let mut out: EditScript = Vec::with_capacity(edits.len());
    for edit in edits {
        match out.last_mut() {
            Some(last) if last.kind() == edit.kind() => {
                last.text_mut().extend_from_slice(edit.text())
            }
            _ => out.push(edit),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
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
    #[case(vec![], vec![])]
    #[case(vec![eq("a"), del("b"), ins("c")], vec![eq("a"), del("b"), ins("c")])]
    #[case(vec![eq("a"), eq("b"), eq("c")], vec![eq("abc")])]
    #[case(vec![del("a"), del("b"), del("c")], vec![del("abc")])]
    #[case(vec![ins("a"), ins("b"), ins("c")], vec![ins("abc")])]
    #[case(vec![del("a"), ins("b"), del("c"), ins("d"), eq("e"), eq("f")], vec![del("ac"), ins("bd"), eq("ef")])]
    #[case(vec![eq("x"), del("a"), ins("abc"), del("dc"), eq("y")], vec![eq("xa"), del("d"), ins("b"), eq("cy")])]
    #[case(vec![eq("a"), ins("ba"), eq("c")], vec![ins("ab"), eq("ac")])]
    #[case(vec![eq("c"), ins("ab"), eq("a")], vec![eq("ca"), ins("ba")])]
    #[case(vec![eq("a"), del("b"), eq("c"), del("ac"), eq("x")], vec![del("abc"), eq("acx")])]
    fn test_cleanup_merge(#[case] input: EditScript, #[case] expected: EditScript) {
        assert_eq!(cleanup_merge(input), expected);
    }

    #[rstest]
    fn test_cleanup_merge_keeps_empty_runs() {
        // factoring out the whole insert leaves an empty one behind
        let merged = cleanup_merge(vec![eq("x"), del("ab"), ins("a"), eq("y")]);
        assert_eq!(merged, vec![eq("xa"), del("b"), ins(""), eq("y")]);
    }

    #[rstest]
    #[case(vec![], vec![])]
    #[case(
        vec![del("ab"), ins("12"), eq("wxyz"), del("cd"), ins("34")],
        vec![del("ab"), ins("12"), eq("wxyz"), del("cd"), ins("34")]
    )]
    #[case(
        vec![del("ab"), ins("12"), eq("xyz"), del("cd"), ins("34")],
        vec![del("abxyzcd"), ins("12xyz34")]
    )]
    #[case(
        vec![ins("12"), eq("x"), del("cd"), ins("34")],
        vec![del("xcd"), ins("12x34")]
    )]
    #[case(
        vec![del("ab"), ins("12"), eq("xy"), ins("34"), eq("z"), del("cd"), ins("56")],
        vec![del("abxyzcd"), ins("12xy34z56")]
    )]
    fn test_cleanup_efficiency(#[case] input: EditScript, #[case] expected: EditScript) {
        assert_eq!(cleanup_efficiency(input), expected);
    }

    #[rstest]
    #[case(vec![], vec![])]
    #[case(vec![eq("a"), del("b"), ins("c")], vec![eq("a"), del("b"), ins("c")])]
    #[case(vec![ins("CC"), del("AC")], vec![del("A"), ins("C"), eq("C")])]
    #[case(vec![eq("x"), ins("CC"), del("AC"), eq("y")], vec![eq("x"), del("A"), ins("C"), eq("Cy")])]
    #[case(vec![eq("G"), del("AT"), ins("AC"), eq("T")], vec![eq("GA"), del("T"), ins("C"), eq("T")])]
    #[case(vec![del("A"), ins("A")], vec![eq("A")])]
    #[case(vec![ins("G"), del("T"), ins("C"), eq("A")], vec![del("T"), ins("GC"), eq("A")])]
    fn test_factor_affixes(#[case] input: EditScript, #[case] expected: EditScript) {
        assert_eq!(factor_affixes(input), expected);
    }

    #[rstest]
    fn test_compact_reorders_bisection_junction() {
        // a del/ins pair spanning the two halves of a bisection
        let compacted = compact(vec![
            del("ACC"),
            eq("CCA"),
            ins("CC"),
            del("AC"),
        ]);
        assert_eq!(compacted, vec![del("ACC"), eq("CCA"), del("A"), ins("C"), eq("C")]);
    }

    #[rstest]
    fn test_merge_adjacent() {
        let merged = merge_adjacent(vec![eq("A"), eq(""), del("C"), del("G"), ins(""), eq("T")]);
        assert_eq!(merged, vec![eq("A"), del("CG"), ins(""), eq("T")]);
    }
}

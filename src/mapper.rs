use crate::reconstruct::CharMapping;

/// Distinct fragment indices referenced by `char_map[start..end]`, in order of
/// first appearance. An empty or out-of-range span yields an empty list.
pub fn fragments_in_range(start: usize, end: usize, char_map: &[CharMapping]) -> Vec<usize> {
    debug_assert!(start <= end, "inverted char range {start}..{end}");
    let end = end.min(char_map.len());
    if start >= end {
        return Vec::new();
    }

    let mut indices: Vec<usize> = Vec::new();
    for mapping in &char_map[start..end] {
        // Indices are non-decreasing along the map, so only the tail can repeat.
        if indices.last() != Some(&mapping.fragment) {
            indices.push(mapping.fragment);
        }
    }
    indices
}

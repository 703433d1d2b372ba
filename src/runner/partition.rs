/// Split `items` into at most `parts` contiguous slices of `ceil(len / parts)`
/// items each; only the last slice may be shorter. Never yields empty slices.
pub(crate) fn partition<T: Clone>(items: &[T], parts: usize) -> Vec<Vec<T>> {
    if items.is_empty() || parts == 0 {
        return Vec::new();
    }
    let size = items.len().div_ceil(parts);
    items.chunks(size).map(<[T]>::to_vec).collect()
}

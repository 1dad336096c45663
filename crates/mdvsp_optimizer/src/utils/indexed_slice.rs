/// Iterates a slice together with the typed index of each element.
pub trait IndexedSlice<T> {
    fn iter_idx<'a, Idx: From<usize>>(&'a self) -> impl Iterator<Item = (Idx, &'a T)>
    where
        T: 'a;
}

impl<T> IndexedSlice<T> for [T] {
    fn iter_idx<'a, Idx: From<usize>>(&'a self) -> impl Iterator<Item = (Idx, &'a T)>
    where
        T: 'a,
    {
        self.iter()
            .enumerate()
            .map(|(index, item)| (Idx::from(index), item))
    }
}

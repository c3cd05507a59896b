/// Vector addressed by a typed id, where items are only ever appended.
#[derive(Debug, Clone)]
pub(crate) struct AppendOnlyVec<T, I> {
    vec: Vec<T>,
    id_type: std::marker::PhantomData<I>,
}

impl<T, I> AppendOnlyVec<T, I>
where
    I: From<usize> + Into<usize>,
{
    pub const fn len(&self) -> usize {
        self.vec.len()
    }
    fn next_id(&self) -> I {
        I::from(self.len())
    }
    pub fn push(&mut self, item: T) -> I {
        let id = self.next_id();
        self.vec.push(item);
        id
    }
    /// Append an item which needs to know its own id.
    pub fn push_with_id<F>(&mut self, build: F) -> I
    where
        F: FnOnce(I) -> T,
    {
        let item = build(self.next_id());
        self.push(item)
    }
    pub fn get(&self, id: I) -> Option<&T> {
        self.vec.get::<usize>(id.into())
    }
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.vec.iter()
    }
}

impl<T, K> Default for AppendOnlyVec<T, K> {
    fn default() -> Self {
        Self {
            vec: vec![],
            id_type: std::marker::PhantomData,
        }
    }
}

/// Declare a `usize` newtype usable as an [`AppendOnlyVec`] id.
macro_rules! append_only_vec_id {
    ($visibility:vis $id:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $visibility struct $id(usize);

        impl From<usize> for $id {
            fn from(id: usize) -> Self {
                Self(id)
            }
        }

        impl From<$id> for usize {
            fn from(id: $id) -> Self {
                id.0
            }
        }
    };
}

pub(crate) use append_only_vec_id;

#[cfg(test)]
mod tests {
    use super::*;

    append_only_vec_id!(TestId);

    #[test]
    fn ids_follow_insertion_order() {
        let mut vec = AppendOnlyVec::<String, TestId>::default();
        let a = vec.push(String::from("a"));
        let b = vec.push_with_id(|id| format!("b{}", usize::from(id)));
        assert_eq!(usize::from(a), 0);
        assert_eq!(usize::from(b), 1);
        assert_eq!(vec.get(b).map(String::as_str), Some("b1"));
        assert_eq!(vec.get(TestId::from(2)), None);
        assert_eq!(vec.iter().count(), vec.len());
    }
}

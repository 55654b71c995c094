pub(crate) trait Stack {
    /// Type of the values that are pushed onto the stack.
    type Item: Copy;

    /// Return the topmost value of the Stack, or `None` if it is empty
    fn peek(&self) -> Option<Self::Item>;

    /// Like `peek`, but the topmost value of the stack is removed if it exists.
    fn pop(&mut self) -> Option<Self::Item>;

    /// Number of values currently held
    fn depth(&self) -> usize;

    /// Push `item` onto the top of the stack.
    fn push(&mut self, item: Self::Item);

    /// Given a closure that returns `None` in the case of a valid value to push,
    /// and `Some(err)` if an error occured, pre-validate and push `item` onto the
    /// Stack.
    ///
    /// If `Err(_)` is returned, the mutably borrowed receiver is unmodified.
    fn push_validated<Error, F: Fn(Option<Self::Item>, Self::Item) -> Option<Error>>(
        &mut self,
        item: Self::Item,
        validate: F,
    ) -> Result<(), Error> {
        match validate(self.peek(), item) {
            None => {
                self.push(item);
                Ok(())
            }
            Some(err) => Err(err),
        }
    }
}

impl<T: Copy> Stack for Vec<T> {
    type Item = T;

    fn peek(&self) -> Option<Self::Item> {
        self.last().copied()
    }

    fn pop(&mut self) -> Option<Self::Item> {
        Vec::pop(self)
    }

    fn depth(&self) -> usize {
        self.len()
    }

    fn push(&mut self, item: Self::Item) {
        Vec::push(self, item)
    }
}

#[cfg(feature = "smallvec_framestack")]
impl<T: Copy, const N: usize> Stack for smallvec::SmallVec<[T; N]> {
    type Item = T;

    fn peek(&self) -> Option<Self::Item> {
        self.last().copied()
    }

    fn pop(&mut self) -> Option<Self::Item> {
        smallvec::SmallVec::pop(self)
    }

    fn depth(&self) -> usize {
        self.len()
    }

    fn push(&mut self, item: Self::Item) {
        smallvec::SmallVec::push(self, item)
    }
}

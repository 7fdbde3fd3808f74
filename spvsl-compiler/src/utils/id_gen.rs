use std::marker::PhantomData;

/// Hands out consecutive ids, starting at a given first id.
#[derive(Debug, Clone)]
pub struct IdGenerator<T: From<u32>> {
    next_id: u32,
    phantom: PhantomData<T>,
}

impl<T: From<u32>> IdGenerator<T> {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u32) -> Self {
        IdGenerator {
            next_id: first,
            phantom: PhantomData,
        }
    }

    pub fn gen(&mut self) -> T {
        let id = self.next_id;
        self.next_id += 1;
        T::from(id)
    }

    /// The id that the next call to [IdGenerator::gen] will return.
    pub fn peek(&self) -> u32 {
        self.next_id
    }
}

impl<T: From<u32>> Default for IdGenerator<T> {
    fn default() -> IdGenerator<T> {
        Self::new()
    }
}

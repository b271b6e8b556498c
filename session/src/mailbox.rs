/// Single-slot mailbox with take-once semantics. Writing replaces whatever
/// is pending; taking empties the slot.
#[derive(Debug, Clone)]
pub struct Mailbox<T> {
    slot: Option<T>,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self { slot: None }
    }

    pub fn put(&mut self, value: T) {
        self.slot = Some(value);
    }

    pub fn take_if_present(&mut self) -> Option<T> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

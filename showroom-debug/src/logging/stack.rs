use std::cell::RefCell;

struct StackItem {
    message_count: usize,
    size: usize,
}

thread_local! {
    static STACK: RefCell<Vec<StackItem>> = const { RefCell::new(Vec::new()) };
}

pub fn stack_size() -> usize {
    STACK.with_borrow(|stack| stack.len())
}

pub fn message_offset() -> usize {
    STACK.with_borrow(|stack| stack.iter().map(|item| item.size).sum())
}

pub fn increment_stack(size: usize) {
    STACK.with_borrow_mut(|stack| stack.push(StackItem { message_count: 0, size }));
}

pub fn decrement_stack() {
    STACK.with_borrow_mut(|stack| {
        stack.pop();
    });
}

pub fn increment_message_count() {
    STACK.with_borrow_mut(|stack| {
        if let Some(item) = stack.last_mut() {
            item.message_count += 1;
        }
    });
}

pub fn get_message_count() -> usize {
    STACK.with_borrow(|stack| stack.last().map_or(0, |item| item.message_count))
}

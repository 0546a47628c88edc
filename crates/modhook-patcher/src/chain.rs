//! Index-linked hook lists.

/// A doubly-linked list stored in a slot arena.
///
/// New hooks are inserted at the head, so iteration runs newest first.
/// Removal is O(1) by the index returned from [`push_front`](Self::push_front);
/// freed slots are reused.
pub(crate) struct HookChain<T> {
    nodes: Vec<Option<Node<T>>>,
    head: Option<usize>,
    free: Vec<usize>,
    len: usize,
}

struct Node<T> {
    hook: T,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<T> Default for HookChain<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            head: None,
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T: Clone> HookChain<T> {
    pub(crate) fn push_front(&mut self, hook: T) -> usize {
        let node = Node {
            hook,
            prev: None,
            next: self.head,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                index
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };

        if let Some(old_head) = self.head {
            if let Some(old) = self.nodes[old_head].as_mut() {
                old.prev = Some(index);
            }
        }
        self.head = Some(index);
        self.len += 1;
        index
    }

    /// Unlink the node at `index`. Returns `false` if it was already gone.
    pub(crate) fn remove(&mut self, index: usize) -> bool {
        let Some(node) = self.nodes.get_mut(index).and_then(Option::take) else {
            return false;
        };

        match node.prev {
            Some(prev) => {
                if let Some(prev) = self.nodes[prev].as_mut() {
                    prev.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        if let Some(next) = node.next {
            if let Some(next) = self.nodes[next].as_mut() {
                next.prev = node.prev;
            }
        }

        self.free.push(index);
        self.len -= 1;
        true
    }

    /// Hooks in call order (newest first).
    pub(crate) fn snapshot(&self) -> Vec<T> {
        let mut hooks = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let Some(node) = self.nodes[index].as_ref() else {
                break;
            };
            hooks.push(node.hook.clone());
            cursor = node.next;
        }
        hooks
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.len = 0;
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut chain = HookChain::default();
        chain.push_front('a');
        chain.push_front('b');
        chain.push_front('c');
        assert_eq!(chain.snapshot(), vec!['c', 'b', 'a']);
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let mut chain = HookChain::default();
        let a = chain.push_front('a');
        let b = chain.push_front('b');
        let c = chain.push_front('c');
        let d = chain.push_front('d');

        assert!(chain.remove(b));
        assert_eq!(chain.snapshot(), vec!['d', 'c', 'a']);
        assert!(chain.remove(d));
        assert_eq!(chain.snapshot(), vec!['c', 'a']);
        assert!(chain.remove(a));
        assert_eq!(chain.snapshot(), vec!['c']);
        assert!(chain.remove(c));
        assert!(chain.is_empty());
    }

    #[test]
    fn test_double_remove_is_noop() {
        let mut chain = HookChain::default();
        let a = chain.push_front('a');
        chain.push_front('b');
        assert!(chain.remove(a));
        assert!(!chain.remove(a));
        assert!(!chain.remove(99));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_slots_are_reused() {
        let mut chain = HookChain::default();
        let a = chain.push_front('a');
        chain.push_front('b');
        chain.remove(a);
        let c = chain.push_front('c');
        assert_eq!(a, c);
        assert_eq!(chain.snapshot(), vec!['c', 'b']);
    }
}
